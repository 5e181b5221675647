//! Runtime capability discovery.
//!
//! A store's optional contracts are probed once, when the registry is built,
//! and recorded in an immutable [`CapabilitySet`]. Typed accessors on
//! [`CapabilityRegistry`] are the single gate between the manager and those
//! contracts: they either hand back the contract or fail with
//! [`ManagerError::CapabilityNotSupported`].

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ManagerError, ManagerResult};
use crate::types::Entity;

use super::store::{
    CodeStore, EagerLoadingStore, EntityStore, GroupedStore, MasterDetailsStore, NameStore,
    QueryableStore, ScopedNameStore, TimeTrackedStore,
};

/// Optional contracts a store may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Lookup by code; enables code generation and code normalization.
    CodeBased,
    /// Lookup by globally unique name; enables name normalization.
    NameBased,
    /// Lookup by name within a scope; takes precedence over name-based.
    ScopedNameBased,
    /// Creation-time tracking; enables timestamps and `find_latest`.
    TimeTracked,
    /// Group partitions for search.
    Grouped,
    /// Detail collections loaded apart from their master.
    MasterDetails,
    /// Eager loading of search results.
    EagerLoading,
    /// Filtering, ordering, counting and paging.
    Queryable,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 8] = [
        Capability::CodeBased,
        Capability::NameBased,
        Capability::ScopedNameBased,
        Capability::TimeTracked,
        Capability::Grouped,
        Capability::MasterDetails,
        Capability::EagerLoading,
        Capability::Queryable,
    ];
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::CodeBased => "code-based",
            Capability::NameBased => "name-based",
            Capability::ScopedNameBased => "scoped-name-based",
            Capability::TimeTracked => "time-tracked",
            Capability::Grouped => "grouped",
            Capability::MasterDetails => "master-details",
            Capability::EagerLoading => "eager-loading",
            Capability::Queryable => "queryable",
        };
        write!(f, "{}", name)
    }
}

/// An immutable set of capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet(BTreeSet<Capability>);

impl CapabilitySet {
    /// The empty set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Every capability.
    pub fn all() -> Self {
        Capability::ALL.into_iter().collect()
    }

    /// Probes `store` for each optional contract.
    pub fn probe<E: Entity>(store: &dyn EntityStore<E>) -> Self {
        Capability::ALL
            .into_iter()
            .filter(|cap| match cap {
                Capability::CodeBased => store.as_code_store().is_some(),
                Capability::NameBased => store.as_name_store().is_some(),
                Capability::ScopedNameBased => store.as_scoped_name_store().is_some(),
                Capability::TimeTracked => store.as_time_tracked_store().is_some(),
                Capability::Grouped => store.as_grouped_store().is_some(),
                Capability::MasterDetails => store.as_master_details_store().is_some(),
                Capability::EagerLoading => store.as_eager_loading_store().is_some(),
                Capability::Queryable => store.as_queryable().is_some(),
            })
            .collect()
    }

    /// Returns `true` if the set contains `capability`.
    pub fn contains(&self, capability: Capability) -> bool {
        self.0.contains(&capability)
    }

    /// Returns a copy with `capability` added.
    pub fn with(mut self, capability: Capability) -> Self {
        self.0.insert(capability);
        self
    }

    /// Returns a copy with `capability` removed.
    pub fn without(mut self, capability: Capability) -> Self {
        self.0.remove(&capability);
        self
    }

    /// Iterates in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        self.0.iter().copied()
    }

    /// Number of capabilities in the set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.iter().map(|c| c.to_string()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Owns a store handle and gates access to its optional contracts.
///
/// The registry also owns the store's lifetime: [`dispose`](Self::dispose)
/// closes the store exactly once, and every accessor afterwards fails with
/// [`ManagerError::Disposed`].
pub struct CapabilityRegistry<E: Entity> {
    store: Arc<dyn EntityStore<E>>,
    supported: CapabilitySet,
    disposed: AtomicBool,
}

impl<E: Entity> CapabilityRegistry<E> {
    /// Probes `store` and builds the registry.
    pub fn new(store: Arc<dyn EntityStore<E>>) -> Self {
        let supported = CapabilitySet::probe(store.as_ref());
        debug!(
            backend = store.backend_name(),
            entity = E::entity_type(),
            capabilities = %supported,
            "Resolved store capabilities"
        );
        Self {
            store,
            supported,
            disposed: AtomicBool::new(false),
        }
    }

    /// The resolved capability set.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.supported
    }

    /// Returns `true` if the store implements `capability`.
    pub fn supports(&self, capability: Capability) -> bool {
        self.supported.contains(capability)
    }

    /// Name of the underlying store.
    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Fails if the registry has been disposed.
    pub fn throw_if_disposed(&self) -> ManagerResult<()> {
        if self.disposed.load(Ordering::Acquire) {
            return Err(ManagerError::Disposed {
                backend_name: self.backend_name().to_string(),
            });
        }
        Ok(())
    }

    /// Returns `true` once [`dispose`](Self::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Closes the store. Returns `false` if it was already closed.
    pub fn dispose(&self) -> bool {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return false;
        }
        debug!(backend = self.backend_name(), "Closing store");
        self.store.close();
        true
    }

    /// The mandatory store contract.
    pub fn store(&self) -> ManagerResult<&dyn EntityStore<E>> {
        self.throw_if_disposed()?;
        Ok(self.store.as_ref())
    }

    fn require(&self, capability: Capability) -> ManagerResult<()> {
        self.throw_if_disposed()?;
        if self.supports(capability) {
            Ok(())
        } else {
            Err(self.unsupported(capability))
        }
    }

    fn unsupported(&self, capability: Capability) -> ManagerError {
        ManagerError::CapabilityNotSupported {
            backend_name: self.backend_name().to_string(),
            capability,
        }
    }

    /// The queryable contract.
    pub fn queryable(&self) -> ManagerResult<&dyn QueryableStore<E>> {
        self.require(Capability::Queryable)?;
        self.store
            .as_queryable()
            .ok_or_else(|| self.unsupported(Capability::Queryable))
    }

    /// The code-based contract.
    pub fn code_based(&self) -> ManagerResult<&dyn CodeStore<E>> {
        self.require(Capability::CodeBased)?;
        self.store
            .as_code_store()
            .ok_or_else(|| self.unsupported(Capability::CodeBased))
    }

    /// The name-based contract.
    pub fn name_based(&self) -> ManagerResult<&dyn NameStore<E>> {
        self.require(Capability::NameBased)?;
        self.store
            .as_name_store()
            .ok_or_else(|| self.unsupported(Capability::NameBased))
    }

    /// The scoped-name-based contract.
    pub fn scoped_name_based(&self) -> ManagerResult<&dyn ScopedNameStore<E>> {
        self.require(Capability::ScopedNameBased)?;
        self.store
            .as_scoped_name_store()
            .ok_or_else(|| self.unsupported(Capability::ScopedNameBased))
    }

    /// The time-tracked contract.
    pub fn time_tracked(&self) -> ManagerResult<&dyn TimeTrackedStore<E>> {
        self.require(Capability::TimeTracked)?;
        self.store
            .as_time_tracked_store()
            .ok_or_else(|| self.unsupported(Capability::TimeTracked))
    }

    /// The grouped contract.
    pub fn grouped(&self) -> ManagerResult<&dyn GroupedStore<E>> {
        self.require(Capability::Grouped)?;
        self.store
            .as_grouped_store()
            .ok_or_else(|| self.unsupported(Capability::Grouped))
    }

    /// The master-details contract.
    pub fn master_details(&self) -> ManagerResult<&dyn MasterDetailsStore<E>> {
        self.require(Capability::MasterDetails)?;
        self.store
            .as_master_details_store()
            .ok_or_else(|| self.unsupported(Capability::MasterDetails))
    }

    /// The eager-loading contract.
    pub fn eager_loading(&self) -> ManagerResult<&dyn EagerLoadingStore<E>> {
        self.require(Capability::EagerLoading)?;
        self.store
            .as_eager_loading_store()
            .ok_or_else(|| self.unsupported(Capability::EagerLoading))
    }
}

impl<E: Entity> Drop for CapabilityRegistry<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<E: Entity> fmt::Debug for CapabilityRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("backend", &self.backend_name())
            .field("supported", &self.supported)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
