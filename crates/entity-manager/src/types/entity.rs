//! Entity contract and per-capability accessor traits.
//!
//! The manager never inspects an entity's shape directly. An entity type opts
//! into a capability by implementing the small accessor trait for it and
//! returning `Some(self)` from the matching `as_*` probe on [`Entity`]. An
//! entity that does not override a probe simply does not take part in the
//! corresponding lifecycle stage.

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::query::SortValue;

/// A domain record managed by an [`EntityManager`](crate::EntityManager).
///
/// # Example
///
/// ```
/// use helios_entity_manager::types::{Coded, Entity};
///
/// #[derive(Debug, Clone)]
/// struct Warehouse {
///     id: String,
///     code: String,
/// }
///
/// impl Coded for Warehouse {
///     fn code(&self) -> &str {
///         &self.code
///     }
///
///     fn set_code(&mut self, code: String) {
///         self.code = code;
///     }
/// }
///
/// impl Entity for Warehouse {
///     type Id = String;
///     type Detail = ();
///
///     fn id(&self) -> &String {
///         &self.id
///     }
///
///     fn as_coded(&self) -> Option<&dyn Coded> {
///         Some(self)
///     }
///
///     fn as_coded_mut(&mut self) -> Option<&mut dyn Coded> {
///         Some(self)
///     }
/// }
///
/// let w = Warehouse { id: "w-1".into(), code: "north".into() };
/// assert_eq!(w.as_coded().map(|c| c.code()), Some("north"));
/// assert!(w.as_named().is_none());
/// ```
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// Primary key. Must round-trip through its string form.
    type Id: Clone + Eq + Hash + Debug + Display + FromStr + Send + Sync + 'static;

    /// Element type of the details collection. Use `()` for entities without details.
    type Detail: Debug + Send + Sync + 'static;

    /// Returns the primary key.
    fn id(&self) -> &Self::Id;

    /// Short type name used in logs and error messages.
    fn entity_type() -> &'static str {
        let full = std::any::type_name::<Self>();
        full.rsplit("::").next().unwrap_or(full)
    }

    /// Code accessor, if the entity carries a code.
    fn as_coded(&self) -> Option<&dyn Coded> {
        None
    }

    /// Mutable code accessor.
    fn as_coded_mut(&mut self) -> Option<&mut dyn Coded> {
        None
    }

    /// Name accessor, if the entity carries a name.
    fn as_named(&self) -> Option<&dyn Named> {
        None
    }

    /// Mutable name accessor.
    fn as_named_mut(&mut self) -> Option<&mut dyn Named> {
        None
    }

    /// Scope accessor, if the entity's name is unique only within a scope.
    fn as_scoped(&self) -> Option<&dyn Scoped> {
        None
    }

    /// Group accessor, if the entity belongs to a group.
    fn as_grouped(&self) -> Option<&dyn Grouped> {
        None
    }

    /// Timestamp accessor.
    fn as_time_tracked(&self) -> Option<&dyn TimeTracked> {
        None
    }

    /// Mutable timestamp accessor.
    fn as_time_tracked_mut(&mut self) -> Option<&mut dyn TimeTracked> {
        None
    }

    /// Concurrency stamp accessor.
    fn as_stamped(&self) -> Option<&dyn ConcurrencyStamped> {
        None
    }

    /// Mutable concurrency stamp accessor.
    fn as_stamped_mut(&mut self) -> Option<&mut dyn ConcurrencyStamped> {
        None
    }

    /// Detail records owned by this entity.
    fn details(&self) -> &[Self::Detail] {
        &[]
    }

    /// Mutable detail records, used by stores that load details lazily.
    fn details_mut(&mut self) -> Option<&mut Vec<Self::Detail>> {
        None
    }

    /// Property names accepted as sort expressions.
    fn sort_properties() -> &'static [&'static str] {
        &[]
    }

    /// Value of a sortable property, `None` when the property is unset.
    fn sort_value(&self, _property: &str) -> Option<SortValue> {
        None
    }
}

/// Entity with a unique human-facing code.
pub trait Coded: Send + Sync {
    /// Current code, possibly empty.
    fn code(&self) -> &str;

    /// Replaces the code.
    fn set_code(&mut self, code: String);
}

/// Entity with a display name and its normalized lookup form.
pub trait Named: Send + Sync {
    /// Display name as entered.
    fn name(&self) -> &str;

    /// Replaces the display name.
    fn set_name(&mut self, name: String);

    /// Normalized name used for lookups.
    fn normalized_name(&self) -> &str;

    /// Replaces the normalized name.
    fn set_normalized_name(&mut self, normalized: String);
}

/// Entity whose name is unique within a containing scope.
pub trait Scoped: Send + Sync {
    /// Key of the containing scope.
    fn scope_id(&self) -> &str;
}

/// Entity that belongs to a group.
pub trait Grouped: Send + Sync {
    /// Key of the owning group.
    fn group_id(&self) -> &str;
}

/// Entity carrying creation and modification timestamps.
pub trait TimeTracked: Send + Sync {
    /// When the entity was created.
    fn created_at(&self) -> Option<DateTime<Utc>>;

    /// Sets the creation timestamp.
    fn set_created_at(&mut self, at: DateTime<Utc>);

    /// When the entity was last modified.
    fn last_modified_at(&self) -> Option<DateTime<Utc>>;

    /// Sets the modification timestamp.
    fn set_last_modified_at(&mut self, at: DateTime<Utc>);
}

/// Entity protected by an optimistic concurrency stamp.
pub trait ConcurrencyStamped: Send + Sync {
    /// The stamp as last read from the store.
    fn concurrency_stamp(&self) -> &str;

    /// Replaces the stamp.
    fn set_concurrency_stamp(&mut self, stamp: String);
}
