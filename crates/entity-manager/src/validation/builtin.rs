//! Validators for the code and name capabilities.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::core::Capability;
use crate::error::{ManagerError, ManagerResult};
use crate::manager::EntityManager;
use crate::types::{Entity, EntityError};

use super::EntityValidator;

/// Rejects entities whose name is blank.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequiredNameValidator;

#[async_trait]
impl<E: Entity> EntityValidator<E> for RequiredNameValidator {
    async fn validate(
        &self,
        _manager: &EntityManager<E>,
        entity: &E,
        _cancel: &CancellationToken,
    ) -> ManagerResult<Vec<EntityError>> {
        let named = entity
            .as_named()
            .ok_or_else(|| ManagerError::entity_capability_missing::<E>("named"))?;
        if named.name().trim().is_empty() {
            return Ok(vec![EntityError::invalid_name(named.name())]);
        }
        Ok(Vec::new())
    }
}

/// Rejects entities whose code is blank or contains whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeFormatValidator;

#[async_trait]
impl<E: Entity> EntityValidator<E> for CodeFormatValidator {
    async fn validate(
        &self,
        _manager: &EntityManager<E>,
        entity: &E,
        _cancel: &CancellationToken,
    ) -> ManagerResult<Vec<EntityError>> {
        let coded = entity
            .as_coded()
            .ok_or_else(|| ManagerError::entity_capability_missing::<E>("coded"))?;
        let code = coded.code().trim();
        if code.is_empty() || code.chars().any(char::is_whitespace) {
            return Ok(vec![EntityError::invalid_code(coded.code())]);
        }
        Ok(Vec::new())
    }
}

/// Rejects entities whose normalized code belongs to another entity.
///
/// Blank codes are left to [`CodeFormatValidator`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateCodeValidator;

#[async_trait]
impl<E: Entity> EntityValidator<E> for DuplicateCodeValidator {
    async fn validate(
        &self,
        manager: &EntityManager<E>,
        entity: &E,
        cancel: &CancellationToken,
    ) -> ManagerResult<Vec<EntityError>> {
        let code = entity
            .as_coded()
            .ok_or_else(|| ManagerError::entity_capability_missing::<E>("coded"))?
            .code();
        if code.trim().is_empty() {
            return Ok(Vec::new());
        }

        match manager.find_by_code(code, cancel).await? {
            Some(owner) if owner.id() != entity.id() => {
                Ok(vec![EntityError::duplicate_code(code)])
            }
            _ => Ok(Vec::new()),
        }
    }
}

/// Rejects entities whose normalized name belongs to another entity.
///
/// Uses the scoped lookup when the store is scoped-name-based and the
/// entity exposes a scope, the global lookup otherwise. A blank scope is
/// reported as [`codes::INVALID_SCOPE`](crate::types::codes::INVALID_SCOPE).
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateNameValidator;

#[async_trait]
impl<E: Entity> EntityValidator<E> for DuplicateNameValidator {
    async fn validate(
        &self,
        manager: &EntityManager<E>,
        entity: &E,
        cancel: &CancellationToken,
    ) -> ManagerResult<Vec<EntityError>> {
        let name = entity
            .as_named()
            .ok_or_else(|| ManagerError::entity_capability_missing::<E>("named"))?
            .name();
        if name.trim().is_empty() {
            return Ok(Vec::new());
        }

        let scoped = manager
            .capabilities()?
            .supports(Capability::ScopedNameBased);
        let owner = match entity.as_scoped() {
            Some(scope) if scoped => {
                if scope.scope_id().trim().is_empty() {
                    return Ok(vec![EntityError::invalid_scope(scope.scope_id())]);
                }
                manager
                    .find_by_name_in_scope(scope.scope_id(), name, cancel)
                    .await?
            }
            _ => manager.find_by_name(name, cancel).await?,
        };

        match owner {
            Some(owner) if owner.id() != entity.id() => {
                Ok(vec![EntityError::duplicate_name(name)])
            }
            _ => Ok(Vec::new()),
        }
    }
}
