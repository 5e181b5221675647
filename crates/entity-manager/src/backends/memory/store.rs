//! [`MemoryStore`] and its contract implementations.

use std::cmp::Ordering as CmpOrdering;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::core::{
    Capability, CapabilitySet, CodeStore, EagerLoadingStore, EntityStore, GroupedStore,
    MasterDetailsStore, NameStore, QueryableStore, ScopedNameStore, TimeTrackedStore,
    WriteOutcome,
};
use crate::error::{BackendError, StoreResult};
use crate::types::{
    Entity, EntityError, EntityQuery, EntityResult, Partition, SortDirective, SortValue,
};

/// Pseudo-property resolving to the entity's primary key in string form.
///
/// Used as the default tiebreaker so that orderings are total even for
/// entities that declare no sortable properties.
pub const ID_PROPERTY: &str = "id";

type Matcher<E> = Arc<dyn Fn(&E, &str) -> bool + Send + Sync>;
type Loader<E> = Arc<dyn Fn(&mut E) + Send + Sync>;
type DetailsLoader<E> = Arc<dyn Fn(&E) -> Vec<<E as Entity>::Detail> + Send + Sync>;

/// Process-local store.
///
/// Clones share the same rows and counters, so a test can keep a handle to
/// the store after moving a clone into an
/// [`EntityManager`](crate::EntityManager).
pub struct MemoryStore<E: Entity> {
    rows: Arc<RwLock<Vec<E>>>,
    capabilities: CapabilitySet,
    matcher: Option<Matcher<E>>,
    default_sort: Vec<SortDirective>,
    tiebreaker: String,
    details_loader: Option<DetailsLoader<E>>,
    eager_loader: Option<Loader<E>>,
    eager_loads: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    closed: Arc<AtomicBool>,
}

impl<E: Entity> Clone for MemoryStore<E> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            capabilities: self.capabilities.clone(),
            matcher: self.matcher.clone(),
            default_sort: self.default_sort.clone(),
            tiebreaker: self.tiebreaker.clone(),
            details_loader: self.details_loader.clone(),
            eager_loader: self.eager_loader.clone(),
            eager_loads: Arc::clone(&self.eager_loads),
            closes: Arc::clone(&self.closes),
            closed: Arc::clone(&self.closed),
        }
    }
}

impl<E: Entity> Default for MemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MemoryStore<E> {
    /// Creates an empty store that is queryable and nothing else.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(Vec::new())),
            capabilities: CapabilitySet::empty().with(Capability::Queryable),
            matcher: None,
            default_sort: Vec::new(),
            tiebreaker: ID_PROPERTY.to_string(),
            details_loader: None,
            eager_loader: None,
            eager_loads: Arc::new(AtomicUsize::new(0)),
            closes: Arc::new(AtomicUsize::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Advertises `capability`.
    ///
    /// Master-details and eager loading are usually enabled through
    /// [`with_details_loader`](Self::with_details_loader) and
    /// [`with_eager_loader`](Self::with_eager_loader); enabled here they
    /// load nothing.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities = self.capabilities.with(capability);
        self
    }

    /// Stops advertising `capability`.
    pub fn without_capability(mut self, capability: Capability) -> Self {
        self.capabilities = self.capabilities.without(capability);
        self
    }

    /// Replaces the advertised capability set.
    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Replaces the search-text predicate.
    ///
    /// The predicate receives already-normalized text. Without one, an entity
    /// matches when its normalized name or its code contains the text.
    pub fn with_matcher(mut self, matcher: impl Fn(&E, &str) -> bool + Send + Sync + 'static) -> Self {
        self.matcher = Some(Arc::new(matcher));
        self
    }

    /// Sets the ordering used when a search request has none.
    pub fn with_default_sort(mut self, sort: Vec<SortDirective>) -> Self {
        self.default_sort = sort;
        self
    }

    /// Sets the tiebreaker property. Defaults to [`ID_PROPERTY`].
    pub fn with_tiebreaker(mut self, property: impl Into<String>) -> Self {
        self.tiebreaker = property.into();
        self
    }

    /// Loads details with `loader` and advertises master-details.
    ///
    /// The loaded records replace the entity's
    /// [`details_mut`](Entity::details_mut) collection.
    pub fn with_details_loader(
        mut self,
        loader: impl Fn(&E) -> Vec<E::Detail> + Send + Sync + 'static,
    ) -> Self {
        self.details_loader = Some(Arc::new(loader));
        self.with_capability(Capability::MasterDetails)
    }

    /// Eager-loads search results with `loader` and advertises eager loading.
    pub fn with_eager_loader(mut self, loader: impl Fn(&mut E) + Send + Sync + 'static) -> Self {
        self.eager_loader = Some(Arc::new(loader));
        self.with_capability(Capability::EagerLoading)
    }

    /// The advertised capabilities.
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    /// Inserts entities directly, bypassing validation and normalization.
    pub fn seed(&self, entities: impl IntoIterator<Item = E>) {
        self.rows.write().extend(entities);
    }

    /// Returns a copy of every stored entity, in insertion order.
    pub fn snapshot(&self) -> Vec<E> {
        self.rows.read().clone()
    }

    /// Returns a copy of the stored entity with `id`.
    pub fn get(&self, id: &E::Id) -> Option<E> {
        self.rows.read().iter().find(|e| e.id() == id).cloned()
    }

    /// Number of stored entities.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns `true` if the store holds no entities.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// How many times [`close`](EntityStore::close) has been called.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::Acquire)
    }

    /// How many entities have been eager-loaded.
    pub fn eager_load_count(&self) -> usize {
        self.eager_loads.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(BackendError::Closed {
                backend_name: self.backend_name().to_string(),
            });
        }
        Ok(())
    }

    fn advertises(&self, capability: Capability) -> bool {
        self.capabilities.contains(capability)
    }

    fn not_found(entity: &E) -> BackendError {
        BackendError::NotFound {
            entity_type: E::entity_type().to_string(),
            id: entity.id().to_string(),
        }
    }

    fn find_first(&self, predicate: impl Fn(&E) -> bool) -> StoreResult<Option<E>> {
        self.ensure_open()?;
        Ok(self.rows.read().iter().find(|e| predicate(e)).cloned())
    }

    fn matches(&self, entity: &E, query: &EntityQuery) -> bool {
        let in_partition = match &query.partition {
            Partition::All => true,
            Partition::Group(group_id) => entity
                .as_grouped()
                .is_some_and(|g| g.group_id() == group_id),
            Partition::Scope(scope_id) => entity
                .as_scoped()
                .is_some_and(|s| s.scope_id() == scope_id),
        };
        if !in_partition {
            return false;
        }

        match &query.filter {
            None => true,
            Some(text) => match &self.matcher {
                Some(matcher) => matcher(entity, text),
                None => default_match(entity, text),
            },
        }
    }

    fn sort_value(&self, entity: &E, property: &str) -> Option<SortValue> {
        entity
            .sort_value(property)
            .or_else(|| (property == ID_PROPERTY).then(|| SortValue::Text(entity.id().to_string())))
    }

    fn compare(&self, a: &E, b: &E, ordering: &[SortDirective]) -> CmpOrdering {
        for directive in ordering {
            let left = self.sort_value(a, &directive.property);
            let right = self.sort_value(b, &directive.property);
            let result = directive.direction.apply(left.cmp(&right));
            if result != CmpOrdering::Equal {
                return result;
            }
        }
        CmpOrdering::Equal
    }
}

fn default_match<E: Entity>(entity: &E, text: &str) -> bool {
    let by_name = entity
        .as_named()
        .map(|n| n.normalized_name().contains(text));
    let by_code = entity.as_coded().map(|c| c.code().contains(text));
    match (by_name, by_code) {
        (None, None) => true,
        (name, code) => name.unwrap_or(false) || code.unwrap_or(false),
    }
}

impl<E: Entity> fmt::Debug for MemoryStore<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entity", &E::entity_type())
            .field("rows", &self.rows.read().len())
            .field("capabilities", &self.capabilities)
            .field("tiebreaker", &self.tiebreaker)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

// ============================================================================
// EntityStore
// ============================================================================

#[async_trait]
impl<E: Entity> EntityStore<E> for MemoryStore<E> {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn create(&self, entity: &E) -> StoreResult<EntityResult> {
        self.ensure_open()?;
        let mut rows = self.rows.write();
        if rows.iter().any(|e| e.id() == entity.id()) {
            debug!(entity = E::entity_type(), id = %entity.id(), "Duplicate key on create");
            return Ok(EntityResult::failed(vec![EntityError::duplicate_key(
                &entity.id().to_string(),
            )]));
        }
        rows.push(entity.clone());
        trace!(entity = E::entity_type(), id = %entity.id(), "Inserted");
        Ok(EntityResult::Success)
    }

    async fn update(&self, entity: &E, expected_stamp: Option<&str>) -> StoreResult<WriteOutcome> {
        self.ensure_open()?;
        let mut rows = self.rows.write();
        let slot = rows
            .iter_mut()
            .find(|e| e.id() == entity.id())
            .ok_or_else(|| Self::not_found(entity))?;

        if let Some(expected) = expected_stamp
            && slot.as_stamped().map(|s| s.concurrency_stamp()) != Some(expected)
        {
            return Ok(WriteOutcome::Conflict);
        }

        *slot = entity.clone();
        trace!(entity = E::entity_type(), id = %entity.id(), "Updated");
        Ok(WriteOutcome::success())
    }

    async fn delete(&self, entity: &E, expected_stamp: Option<&str>) -> StoreResult<WriteOutcome> {
        self.ensure_open()?;
        let mut rows = self.rows.write();
        let index = rows
            .iter()
            .position(|e| e.id() == entity.id())
            .ok_or_else(|| Self::not_found(entity))?;

        if let Some(expected) = expected_stamp
            && rows[index].as_stamped().map(|s| s.concurrency_stamp()) != Some(expected)
        {
            return Ok(WriteOutcome::Conflict);
        }

        rows.remove(index);
        trace!(entity = E::entity_type(), id = %entity.id(), "Deleted");
        Ok(WriteOutcome::success())
    }

    async fn find_by_id(&self, id: &E::Id) -> StoreResult<Option<E>> {
        self.find_first(|e| e.id() == id)
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.closes.fetch_add(1, Ordering::AcqRel);
    }

    fn as_queryable(&self) -> Option<&dyn QueryableStore<E>> {
        self.advertises(Capability::Queryable)
            .then_some(self as &dyn QueryableStore<E>)
    }

    fn as_code_store(&self) -> Option<&dyn CodeStore<E>> {
        self.advertises(Capability::CodeBased)
            .then_some(self as &dyn CodeStore<E>)
    }

    fn as_name_store(&self) -> Option<&dyn NameStore<E>> {
        self.advertises(Capability::NameBased)
            .then_some(self as &dyn NameStore<E>)
    }

    fn as_scoped_name_store(&self) -> Option<&dyn ScopedNameStore<E>> {
        self.advertises(Capability::ScopedNameBased)
            .then_some(self as &dyn ScopedNameStore<E>)
    }

    fn as_time_tracked_store(&self) -> Option<&dyn TimeTrackedStore<E>> {
        self.advertises(Capability::TimeTracked)
            .then_some(self as &dyn TimeTrackedStore<E>)
    }

    fn as_grouped_store(&self) -> Option<&dyn GroupedStore<E>> {
        self.advertises(Capability::Grouped)
            .then_some(self as &dyn GroupedStore<E>)
    }

    fn as_master_details_store(&self) -> Option<&dyn MasterDetailsStore<E>> {
        self.advertises(Capability::MasterDetails)
            .then_some(self as &dyn MasterDetailsStore<E>)
    }

    fn as_eager_loading_store(&self) -> Option<&dyn EagerLoadingStore<E>> {
        self.advertises(Capability::EagerLoading)
            .then_some(self as &dyn EagerLoadingStore<E>)
    }
}

// ============================================================================
// Optional contracts
// ============================================================================

#[async_trait]
impl<E: Entity> QueryableStore<E> for MemoryStore<E> {
    fn pre_sort(&self, query: EntityQuery) -> EntityQuery {
        query.with_tiebreaker(self.tiebreaker.clone())
    }

    fn default_sort(&self, query: EntityQuery) -> EntityQuery {
        query.with_sort(self.default_sort.clone())
    }

    async fn count(&self, query: &EntityQuery) -> StoreResult<u64> {
        self.ensure_open()?;
        let rows = self.rows.read();
        Ok(rows.iter().filter(|e| self.matches(e, query)).count() as u64)
    }

    async fn fetch(&self, query: &EntityQuery) -> StoreResult<Vec<E>> {
        self.ensure_open()?;
        let mut matched: Vec<E> = {
            let rows = self.rows.read();
            rows.iter()
                .filter(|e| self.matches(e, query))
                .cloned()
                .collect()
        };

        let ordering = query.ordering();
        if !ordering.is_empty() {
            matched.sort_by(|a, b| self.compare(a, b, &ordering));
        }

        let page = matched.into_iter().skip(query.offset);
        Ok(match query.limit {
            Some(limit) => page.take(limit).collect(),
            None => page.collect(),
        })
    }
}

#[async_trait]
impl<E: Entity> CodeStore<E> for MemoryStore<E> {
    async fn find_by_code(&self, normalized_code: &str) -> StoreResult<Option<E>> {
        self.find_first(|e| e.as_coded().is_some_and(|c| c.code() == normalized_code))
    }
}

#[async_trait]
impl<E: Entity> NameStore<E> for MemoryStore<E> {
    async fn find_by_name(&self, normalized_name: &str) -> StoreResult<Option<E>> {
        self.find_first(|e| {
            e.as_named()
                .is_some_and(|n| n.normalized_name() == normalized_name)
        })
    }
}

#[async_trait]
impl<E: Entity> ScopedNameStore<E> for MemoryStore<E> {
    async fn find_by_name_in_scope(
        &self,
        scope_id: &str,
        normalized_name: &str,
    ) -> StoreResult<Option<E>> {
        self.find_first(|e| {
            e.as_scoped().is_some_and(|s| s.scope_id() == scope_id)
                && e.as_named()
                    .is_some_and(|n| n.normalized_name() == normalized_name)
        })
    }
}

#[async_trait]
impl<E: Entity> TimeTrackedStore<E> for MemoryStore<E> {
    async fn find_latest(&self) -> StoreResult<Option<E>> {
        self.ensure_open()?;
        let rows = self.rows.read();
        // Later insertions win ties.
        let latest = rows
            .iter()
            .filter_map(|e| e.as_time_tracked()?.created_at().map(|at| (at, e)))
            .fold(None, |best: Option<(_, &E)>, (at, e)| match best {
                Some((best_at, _)) if best_at > at => best,
                _ => Some((at, e)),
            });
        Ok(latest.map(|(_, e)| e.clone()))
    }
}

impl<E: Entity> GroupedStore<E> for MemoryStore<E> {}

#[async_trait]
impl<E: Entity> MasterDetailsStore<E> for MemoryStore<E> {
    async fn load_details(&self, entity: &mut E) -> StoreResult<()> {
        self.ensure_open()?;
        let Some(loader) = &self.details_loader else {
            return Ok(());
        };
        let details = loader(entity);
        if let Some(slot) = entity.details_mut() {
            trace!(entity = E::entity_type(), count = details.len(), "Loaded details");
            *slot = details;
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> EagerLoadingStore<E> for MemoryStore<E> {
    async fn eager_load(&self, entity: &mut E) -> StoreResult<()> {
        self.ensure_open()?;
        if let Some(loader) = &self.eager_loader {
            loader(entity);
        }
        self.eager_loads.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }
}
