//! Code generation strategies.
//!
//! A [`CodeGenerator`] assigns a code to an entity whose code is empty, before
//! validation runs, so duplicate-code validators see the final value.
//!
//! - [`IncrementalCodeGenerator`] - `prefix + n`, continuing from the most
//!   recently created entity
//! - [`UrlFriendlyCodeGenerator`] - slug derived from the entity's name

mod incremental;
mod url_friendly;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::ManagerResult;
use crate::manager::EntityManager;
use crate::types::Entity;

pub use incremental::IncrementalCodeGenerator;
pub use url_friendly::UrlFriendlyCodeGenerator;

/// Produces a code for an entity about to be created.
#[async_trait]
pub trait CodeGenerator<E: Entity>: Send + Sync {
    /// Generates a code for `entity`.
    ///
    /// Uniqueness is not required here; the validator chain enforces it.
    async fn generate(
        &self,
        manager: &EntityManager<E>,
        entity: &E,
        cancel: &CancellationToken,
    ) -> ManagerResult<String>;
}
