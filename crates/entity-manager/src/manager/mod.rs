//! The entity manager.
//!
//! [`EntityManager`] composes the capability registry, normalizer, code
//! generator, validator chain, concurrency controller and search engine into
//! the create / update / delete / find / search lifecycle.
//!
//! # Create
//!
//! ```text
//! Received
//!   → PreparedForValidation   code generated when code-based and empty
//!   → Validated               validator chain; failure returns here
//!   → PreparedForPersistence  code and name normalized, timestamps set
//!   → Persisted               store.create
//! ```
//!
//! # Update
//!
//! Validate, normalize, stamp the modification time, then write through the
//! [`ConcurrencyController`]. Delete goes straight to the controller.

mod builder;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use crate::codegen::CodeGenerator;
use crate::config::ManagerOptions;
use crate::core::{
    Capability, CapabilityRegistry, Clock, ConcurrencyController, LookupNormalizer, Mutation,
    new_concurrency_stamp,
};
use crate::error::{ManagerError, ManagerResult};
use crate::search::SearchEngine;
use crate::types::{Entity, EntityQuery, EntityQueryResult, EntityResult, SearchDescriptor};
use crate::validation::ValidatorChain;

pub use builder::EntityManagerBuilder;

/// Orchestrates persistence of one entity type against one store.
///
/// The manager owns its store: [`dispose`](Self::dispose) (or dropping the
/// manager) closes the store exactly once, and every call afterwards fails
/// with [`ManagerError::Disposed`].
///
/// Every entry point takes a [`CancellationToken`]. Cancellation is checked
/// on entry and before each store call; a cancelled call returns
/// [`ManagerError::Cancelled`] without writing anything.
pub struct EntityManager<E: Entity> {
    registry: CapabilityRegistry<E>,
    options: ManagerOptions,
    normalizer: Arc<dyn LookupNormalizer>,
    code_generator: Option<Arc<dyn CodeGenerator<E>>>,
    validators: ValidatorChain<E>,
    concurrency: ConcurrencyController,
    search: SearchEngine,
    clock: Arc<dyn Clock>,
}

impl<E: Entity> EntityManager<E> {
    /// Starts building a manager over `store`.
    pub fn builder(store: impl crate::core::EntityStore<E> + 'static) -> EntityManagerBuilder<E> {
        EntityManagerBuilder::new(store)
    }

    /// The capability registry.
    pub fn capabilities(&self) -> ManagerResult<&CapabilityRegistry<E>> {
        self.registry.throw_if_disposed()?;
        Ok(&self.registry)
    }

    /// Returns whether the store implements `capability`.
    pub fn supports(&self, capability: Capability) -> ManagerResult<bool> {
        Ok(self.capabilities()?.supports(capability))
    }

    /// The options this manager was built with.
    pub fn options(&self) -> &ManagerOptions {
        &self.options
    }

    /// The lookup normalizer.
    pub fn normalizer(&self) -> &dyn LookupNormalizer {
        self.normalizer.as_ref()
    }

    /// The validator chain.
    pub fn validators(&self) -> &ValidatorChain<E> {
        &self.validators
    }

    /// Returns `true` if a code generator is configured.
    pub fn has_code_generator(&self) -> bool {
        self.code_generator.is_some()
    }

    /// Closes the store. Returns `false` if the manager was already disposed.
    pub fn dispose(&self) -> bool {
        self.registry.dispose()
    }

    /// Returns `true` once the manager has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.registry.is_disposed()
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Validates and persists a new entity.
    ///
    /// The entity is updated in place with its generated code, normalized
    /// keys and timestamps, whether or not the store accepts it.
    #[instrument(skip_all, fields(entity = E::entity_type(), id = %entity.id()))]
    pub async fn create(
        &self,
        entity: &mut E,
        cancel: &CancellationToken,
    ) -> ManagerResult<EntityResult> {
        self.enter("create", cancel)?;

        self.prepare_for_create_validation(entity, cancel).await?;

        let validation = self.validate(entity, cancel).await?;
        if !validation.succeeded() {
            return Ok(validation);
        }

        self.prepare_for_creating(entity)?;

        self.check_cancelled("create", cancel)?;
        let result = self.registry.store()?.create(entity).await?;
        debug!(%result, "Create finished");
        Ok(result)
    }

    /// Validates and persists changes to an existing entity.
    ///
    /// Entities with a concurrency stamp are written only if nobody else
    /// changed them since they were read; otherwise the result is
    /// `Failed(ConcurrencyFailure)`.
    #[instrument(skip_all, fields(entity = E::entity_type(), id = %entity.id()))]
    pub async fn update(
        &self,
        entity: &mut E,
        cancel: &CancellationToken,
    ) -> ManagerResult<EntityResult> {
        self.enter("update", cancel)?;

        let validation = self.validate(entity, cancel).await?;
        if !validation.succeeded() {
            return Ok(validation);
        }

        self.prepare_for_updating(entity)?;

        self.check_cancelled("update", cancel)?;
        let store = self.registry.store()?;
        let result = self
            .concurrency
            .apply(store, entity, Mutation::Update)
            .await?;
        debug!(%result, "Update finished");
        Ok(result)
    }

    /// Deletes an entity. No validation or normalization runs.
    #[instrument(skip_all, fields(entity = E::entity_type(), id = %entity.id()))]
    pub async fn delete(
        &self,
        entity: &mut E,
        cancel: &CancellationToken,
    ) -> ManagerResult<EntityResult> {
        self.enter("delete", cancel)?;

        let store = self.registry.store()?;
        let result = self
            .concurrency
            .apply(store, entity, Mutation::Delete)
            .await?;
        debug!(%result, "Delete finished");
        Ok(result)
    }

    /// Runs the validator chain without persisting anything.
    pub async fn validate(
        &self,
        entity: &E,
        cancel: &CancellationToken,
    ) -> ManagerResult<EntityResult> {
        self.enter("validate", cancel)?;
        self.validators.validate(self, entity, cancel).await
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Reads an entity by primary key.
    pub async fn find_by_id(
        &self,
        id: &E::Id,
        cancel: &CancellationToken,
    ) -> ManagerResult<Option<E>> {
        self.enter("find_by_id", cancel)?;
        Ok(self.registry.store()?.find_by_id(id).await?)
    }

    /// Reads an entity by the string form of its primary key.
    ///
    /// A key that does not parse as `E::Id` finds nothing.
    pub async fn find_by_key(
        &self,
        key: &str,
        cancel: &CancellationToken,
    ) -> ManagerResult<Option<E>> {
        self.enter("find_by_key", cancel)?;
        match E::Id::from_str(key.trim()) {
            Ok(id) => self.find_by_id(&id, cancel).await,
            Err(_) => {
                debug!(entity = E::entity_type(), key, "Key does not parse");
                Ok(None)
            }
        }
    }

    /// Finds the entity owning `code`, compared in normalized form.
    pub async fn find_by_code(
        &self,
        code: &str,
        cancel: &CancellationToken,
    ) -> ManagerResult<Option<E>> {
        self.enter("find_by_code", cancel)?;
        let store = self.registry.code_based()?;
        let normalized = require_non_blank("code", self.normalizer.normalize_code(code))?;
        Ok(store.find_by_code(&normalized).await?)
    }

    /// Finds the entity owning `name`, compared in normalized form.
    pub async fn find_by_name(
        &self,
        name: &str,
        cancel: &CancellationToken,
    ) -> ManagerResult<Option<E>> {
        self.enter("find_by_name", cancel)?;
        let store = self.registry.name_based()?;
        let normalized = require_non_blank("name", self.normalizer.normalize_name(name))?;
        Ok(store.find_by_name(&normalized).await?)
    }

    /// Finds the entity owning `name` inside `scope_id`.
    pub async fn find_by_name_in_scope(
        &self,
        scope_id: &str,
        name: &str,
        cancel: &CancellationToken,
    ) -> ManagerResult<Option<E>> {
        self.enter("find_by_name_in_scope", cancel)?;
        let store = self.registry.scoped_name_based()?;
        let scope_id = require_non_blank("scope_id", scope_id.to_string())?;
        let normalized = require_non_blank("name", self.normalizer.normalize_name(name))?;
        Ok(store.find_by_name_in_scope(&scope_id, &normalized).await?)
    }

    /// The most recently created entity.
    pub async fn find_latest(&self, cancel: &CancellationToken) -> ManagerResult<Option<E>> {
        self.enter("find_latest", cancel)?;
        let store = self.registry.time_tracked()?;
        Ok(store.find_latest().await?)
    }

    /// Populates the entity's detail collection from the store.
    ///
    /// The entity must expose a mutable detail collection through
    /// [`Entity::details_mut`].
    pub async fn load_details(
        &self,
        entity: &mut E,
        cancel: &CancellationToken,
    ) -> ManagerResult<()> {
        self.enter("load_details", cancel)?;
        let store = self.registry.master_details()?;
        if entity.details_mut().is_none() {
            return Err(ManagerError::entity_capability_missing::<E>("details"));
        }
        Ok(store.load_details(entity).await?)
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Searches every entity.
    pub async fn search(
        &self,
        request: &SearchDescriptor,
        cancel: &CancellationToken,
    ) -> ManagerResult<EntityQueryResult<E>> {
        self.enter("search", cancel)?;
        self.search
            .search(
                &self.registry,
                self.normalizer.as_ref(),
                EntityQuery::all(),
                request,
                cancel,
            )
            .await
    }

    /// Searches the entities of one group. Counts cover the group only.
    pub async fn search_in_group(
        &self,
        group_id: &str,
        request: &SearchDescriptor,
        cancel: &CancellationToken,
    ) -> ManagerResult<EntityQueryResult<E>> {
        self.enter("search_in_group", cancel)?;
        let group_id = require_non_blank("group_id", group_id.to_string())?;
        let base = self
            .registry
            .grouped()?
            .group_partition(EntityQuery::all(), &group_id);
        self.search
            .search(&self.registry, self.normalizer.as_ref(), base, request, cancel)
            .await
    }

    /// Searches the entities of one naming scope. Counts cover the scope only.
    pub async fn search_in_scope(
        &self,
        scope_id: &str,
        request: &SearchDescriptor,
        cancel: &CancellationToken,
    ) -> ManagerResult<EntityQueryResult<E>> {
        self.enter("search_in_scope", cancel)?;
        let scope_id = require_non_blank("scope_id", scope_id.to_string())?;
        let base = self
            .registry
            .scoped_name_based()?
            .scope_partition(EntityQuery::all(), &scope_id);
        self.search
            .search(&self.registry, self.normalizer.as_ref(), base, request, cancel)
            .await
    }

    // ------------------------------------------------------------------
    // Lifecycle stages
    // ------------------------------------------------------------------

    async fn prepare_for_create_validation(
        &self,
        entity: &mut E,
        cancel: &CancellationToken,
    ) -> ManagerResult<()> {
        let Some(generator) = &self.code_generator else {
            return Ok(());
        };
        if !self.registry.supports(Capability::CodeBased) {
            return Ok(());
        }

        let needs_code = entity
            .as_coded()
            .ok_or_else(|| ManagerError::entity_capability_missing::<E>("coded"))?
            .code()
            .trim()
            .is_empty();
        if !needs_code {
            return Ok(());
        }

        let code = generator.generate(self, entity, cancel).await?;
        if let Some(coded) = entity.as_coded_mut() {
            coded.set_code(code);
        }
        Ok(())
    }

    fn prepare_for_creating(&self, entity: &mut E) -> ManagerResult<()> {
        self.normalize_keys(entity)?;

        if self.registry.supports(Capability::TimeTracked) {
            let now = self.clock.now();
            let tracked = entity
                .as_time_tracked_mut()
                .ok_or_else(|| ManagerError::entity_capability_missing::<E>("time-tracked"))?;
            tracked.set_created_at(now);
            tracked.set_last_modified_at(now);
        }

        if let Some(stamped) = entity.as_stamped_mut()
            && stamped.concurrency_stamp().is_empty()
        {
            stamped.set_concurrency_stamp(new_concurrency_stamp());
        }
        Ok(())
    }

    fn prepare_for_updating(&self, entity: &mut E) -> ManagerResult<()> {
        self.normalize_keys(entity)?;

        if self.registry.supports(Capability::TimeTracked) {
            let now = self.clock.now();
            entity
                .as_time_tracked_mut()
                .ok_or_else(|| ManagerError::entity_capability_missing::<E>("time-tracked"))?
                .set_last_modified_at(now);
        }
        Ok(())
    }

    fn normalize_keys(&self, entity: &mut E) -> ManagerResult<()> {
        if self.registry.supports(Capability::CodeBased) {
            let coded = entity
                .as_coded_mut()
                .ok_or_else(|| ManagerError::entity_capability_missing::<E>("coded"))?;
            let normalized = self.normalizer.normalize_code(coded.code());
            coded.set_code(normalized);
        }

        let scoped = self.registry.supports(Capability::ScopedNameBased);
        if scoped && entity.as_scoped().is_none() {
            return Err(ManagerError::entity_capability_missing::<E>("scoped"));
        }
        if scoped || self.registry.supports(Capability::NameBased) {
            let named = entity
                .as_named_mut()
                .ok_or_else(|| ManagerError::entity_capability_missing::<E>("named"))?;
            let normalized = self.normalizer.normalize_name(named.name());
            named.set_normalized_name(normalized);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Guards
    // ------------------------------------------------------------------

    fn enter(&self, operation: &'static str, cancel: &CancellationToken) -> ManagerResult<()> {
        self.registry.throw_if_disposed()?;
        self.check_cancelled(operation, cancel)
    }

    fn check_cancelled(
        &self,
        operation: &'static str,
        cancel: &CancellationToken,
    ) -> ManagerResult<()> {
        if cancel.is_cancelled() {
            debug!(entity = E::entity_type(), operation, "Cancelled");
            return Err(ManagerError::Cancelled { operation });
        }
        Ok(())
    }
}

fn require_non_blank(argument: &'static str, value: String) -> ManagerResult<String> {
    if value.trim().is_empty() {
        return Err(ManagerError::MissingArgument { argument });
    }
    Ok(value)
}

impl<E: Entity> fmt::Debug for EntityManager<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityManager")
            .field("entity", &E::entity_type())
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("normalizer", &self.normalizer)
            .field("code_generator", &self.code_generator.is_some())
            .field("validators", &self.validators.len())
            .field("detail_validators", &self.validators.detail_len())
            .field("clock", &self.clock)
            .finish()
    }
}
