//! Validator chain.
//!
//! Validators are independent: the chain runs every one of them, in
//! registration order, and concatenates their errors so a single submission
//! reports every problem at once. Detail validators run once per element of
//! the entity's detail collection and their errors join the same result.

mod builtin;

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{ManagerError, ManagerResult};
use crate::manager::EntityManager;
use crate::types::{Entity, EntityError, EntityResult};

pub use builtin::{
    CodeFormatValidator, DuplicateCodeValidator, DuplicateNameValidator, RequiredNameValidator,
};

/// Checks an entity against a business rule.
#[async_trait]
pub trait EntityValidator<E: Entity>: Send + Sync {
    /// Returns every violation found; empty when the entity is valid.
    async fn validate(
        &self,
        manager: &EntityManager<E>,
        entity: &E,
        cancel: &CancellationToken,
    ) -> ManagerResult<Vec<EntityError>>;
}

/// Checks one detail record of a master-details entity.
#[async_trait]
pub trait DetailValidator<E: Entity>: Send + Sync {
    /// Returns every violation found in `detail`.
    async fn validate_detail(
        &self,
        manager: &EntityManager<E>,
        master: &E,
        detail: &E::Detail,
        cancel: &CancellationToken,
    ) -> ManagerResult<Vec<EntityError>>;
}

/// Ordered list of validators.
pub struct ValidatorChain<E: Entity> {
    validators: Vec<Arc<dyn EntityValidator<E>>>,
    detail_validators: Vec<Arc<dyn DetailValidator<E>>>,
}

impl<E: Entity> Default for ValidatorChain<E> {
    fn default() -> Self {
        Self {
            validators: Vec::new(),
            detail_validators: Vec::new(),
        }
    }
}

impl<E: Entity> ValidatorChain<E> {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entity validator.
    pub fn push(&mut self, validator: Arc<dyn EntityValidator<E>>) {
        self.validators.push(validator);
    }

    /// Appends a detail validator.
    pub fn push_detail(&mut self, validator: Arc<dyn DetailValidator<E>>) {
        self.detail_validators.push(validator);
    }

    /// Number of entity validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Number of detail validators.
    pub fn detail_len(&self) -> usize {
        self.detail_validators.len()
    }

    /// Returns `true` if no validator of either kind is registered.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty() && self.detail_validators.is_empty()
    }

    /// Runs every validator against `entity` and its details.
    pub async fn validate(
        &self,
        manager: &EntityManager<E>,
        entity: &E,
        cancel: &CancellationToken,
    ) -> ManagerResult<EntityResult> {
        let mut errors = Vec::new();

        for validator in &self.validators {
            check_cancelled(cancel)?;
            errors.extend(validator.validate(manager, entity, cancel).await?);
        }

        if !self.detail_validators.is_empty() {
            for detail in entity.details() {
                for validator in &self.detail_validators {
                    check_cancelled(cancel)?;
                    errors.extend(
                        validator
                            .validate_detail(manager, entity, detail, cancel)
                            .await?,
                    );
                }
            }
        }

        if !errors.is_empty() {
            debug!(
                entity = E::entity_type(),
                id = %entity.id(),
                error_count = errors.len(),
                "Validation failed"
            );
        }
        Ok(EntityResult::from_errors(errors))
    }
}

fn check_cancelled(cancel: &CancellationToken) -> ManagerResult<()> {
    if cancel.is_cancelled() {
        return Err(ManagerError::Cancelled {
            operation: "validate",
        });
    }
    Ok(())
}
