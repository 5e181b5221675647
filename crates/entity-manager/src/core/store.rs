//! Storage backend contracts.
//!
//! [`EntityStore`] is the only mandatory contract. Every other trait in this
//! module is an optional capability; a store advertises one by returning
//! `Some(self)` from the matching `as_*` probe. The
//! [`CapabilityRegistry`](super::CapabilityRegistry) probes once and the
//! manager never calls into a contract the store did not advertise.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{Entity, EntityQuery, EntityResult, Partition};

/// Result of a conditional write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write ran; the result says whether it was accepted.
    Completed(EntityResult),
    /// The stored concurrency stamp did not match the expected one.
    Conflict,
}

impl WriteOutcome {
    /// A completed, successful write.
    pub fn success() -> Self {
        WriteOutcome::Completed(EntityResult::Success)
    }
}

/// Core storage contract.
///
/// # Concurrency stamps
///
/// `update` and `delete` receive the stamp the caller read. When it is
/// `Some`, the store must apply the write only if the persisted stamp still
/// equals it, atomically, and report [`WriteOutcome::Conflict`] otherwise.
/// The entity passed in already carries the new stamp to persist.
#[async_trait]
pub trait EntityStore<E: Entity>: Send + Sync {
    /// Returns a human-readable name for this store.
    fn backend_name(&self) -> &'static str;

    /// Inserts a new entity.
    async fn create(&self, entity: &E) -> StoreResult<EntityResult>;

    /// Replaces an existing entity, conditioned on `expected_stamp`.
    async fn update(&self, entity: &E, expected_stamp: Option<&str>) -> StoreResult<WriteOutcome>;

    /// Removes an entity, conditioned on `expected_stamp`.
    async fn delete(&self, entity: &E, expected_stamp: Option<&str>) -> StoreResult<WriteOutcome>;

    /// Reads an entity by primary key.
    async fn find_by_id(&self, id: &E::Id) -> StoreResult<Option<E>>;

    /// Releases the store's resources. Called exactly once by the owning manager.
    fn close(&self) {}

    /// Filtering, ordering, counting and paging.
    fn as_queryable(&self) -> Option<&dyn QueryableStore<E>> {
        None
    }

    /// Lookup by code.
    fn as_code_store(&self) -> Option<&dyn CodeStore<E>> {
        None
    }

    /// Lookup by globally unique name.
    fn as_name_store(&self) -> Option<&dyn NameStore<E>> {
        None
    }

    /// Lookup by name within a scope.
    fn as_scoped_name_store(&self) -> Option<&dyn ScopedNameStore<E>> {
        None
    }

    /// Creation-time tracking.
    fn as_time_tracked_store(&self) -> Option<&dyn TimeTrackedStore<E>> {
        None
    }

    /// Group partitions.
    fn as_grouped_store(&self) -> Option<&dyn GroupedStore<E>> {
        None
    }

    /// Detail collection loading.
    fn as_master_details_store(&self) -> Option<&dyn MasterDetailsStore<E>> {
        None
    }

    /// Eager loading of related data.
    fn as_eager_loading_store(&self) -> Option<&dyn EagerLoadingStore<E>> {
        None
    }
}

/// Query support used by the search pipeline.
#[async_trait]
pub trait QueryableStore<E: Entity>: Send + Sync {
    /// Narrows the query by already-normalized search text.
    fn filter(&self, query: EntityQuery, normalized_text: &str) -> EntityQuery {
        query.with_filter(normalized_text)
    }

    /// Applies the deterministic tiebreaker ordering.
    fn pre_sort(&self, query: EntityQuery) -> EntityQuery;

    /// Applies the ordering used when the caller gives none.
    fn default_sort(&self, query: EntityQuery) -> EntityQuery;

    /// Counts matches, ignoring the page window.
    async fn count(&self, query: &EntityQuery) -> StoreResult<u64>;

    /// Materializes the ordered page.
    async fn fetch(&self, query: &EntityQuery) -> StoreResult<Vec<E>>;
}

/// Lookup by normalized code.
#[async_trait]
pub trait CodeStore<E: Entity>: Send + Sync {
    /// Finds the entity owning `normalized_code`.
    async fn find_by_code(&self, normalized_code: &str) -> StoreResult<Option<E>>;
}

/// Lookup by normalized, globally unique name.
#[async_trait]
pub trait NameStore<E: Entity>: Send + Sync {
    /// Finds the entity owning `normalized_name`.
    async fn find_by_name(&self, normalized_name: &str) -> StoreResult<Option<E>>;
}

/// Lookup by normalized name within a scope.
#[async_trait]
pub trait ScopedNameStore<E: Entity>: Send + Sync {
    /// Finds the entity owning `normalized_name` inside `scope_id`.
    async fn find_by_name_in_scope(
        &self,
        scope_id: &str,
        normalized_name: &str,
    ) -> StoreResult<Option<E>>;

    /// Restricts a query to one scope.
    fn scope_partition(&self, query: EntityQuery, scope_id: &str) -> EntityQuery {
        EntityQuery {
            partition: Partition::Scope(scope_id.to_string()),
            ..query
        }
    }
}

/// Creation-time tracking.
#[async_trait]
pub trait TimeTrackedStore<E: Entity>: Send + Sync {
    /// The most recently created entity.
    async fn find_latest(&self) -> StoreResult<Option<E>>;
}

/// Group partitions.
pub trait GroupedStore<E: Entity>: Send + Sync {
    /// Restricts a query to one group.
    fn group_partition(&self, query: EntityQuery, group_id: &str) -> EntityQuery {
        EntityQuery {
            partition: Partition::Group(group_id.to_string()),
            ..query
        }
    }
}

/// Detail collections stored apart from their master.
#[async_trait]
pub trait MasterDetailsStore<E: Entity>: Send + Sync {
    /// Populates the entity's detail collection.
    async fn load_details(&self, entity: &mut E) -> StoreResult<()>;
}

/// Eager loading of related data for search results.
///
/// Implementations may share a unit of work between calls; the search
/// pipeline never runs two `eager_load` calls at once.
#[async_trait]
pub trait EagerLoadingStore<E: Entity>: Send + Sync {
    /// Loads related data into `entity`.
    async fn eager_load(&self, entity: &mut E) -> StoreResult<()>;
}
