use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::LookupNormalizer;
use crate::error::{ManagerError, ManagerResult};
use crate::manager::EntityManager;
use crate::types::Entity;

use super::CodeGenerator;

/// Continues a numeric sequence from the most recently created entity.
///
/// With prefix `ORD-`, an empty store yields `ORD-1` and a latest entity
/// coded `ORD-41` yields `ORD-42`. Requires the time-tracked capability.
#[derive(Debug, Clone, Default)]
pub struct IncrementalCodeGenerator {
    prefix: String,
}

impl IncrementalCodeGenerator {
    /// Creates a generator for codes starting with `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The configured prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Computes the code following `latest`, or the first code when `None`.
    ///
    /// Stored codes have been through `normalizer`, so the prefix is
    /// normalized the same way and stripped exactly before the numeric tail
    /// is parsed.
    pub fn next_code(
        &self,
        normalizer: &dyn LookupNormalizer,
        latest: Option<&str>,
    ) -> ManagerResult<String> {
        let Some(latest) = latest else {
            return Ok(format!("{}1", self.prefix));
        };

        let expected = normalizer.normalize_code(&self.prefix);
        let suffix = latest
            .strip_prefix(expected.as_str())
            .ok_or_else(|| ManagerError::InvalidCodeSequence {
                code: latest.to_string(),
                reason: format!("missing prefix '{}'", expected),
            })?;

        let current: u64 = suffix
            .parse()
            .map_err(|e: std::num::ParseIntError| ManagerError::InvalidCodeSequence {
                code: latest.to_string(),
                reason: e.to_string(),
            })?;

        let next = current
            .checked_add(1)
            .ok_or_else(|| ManagerError::InvalidCodeSequence {
                code: latest.to_string(),
                reason: "sequence overflow".to_string(),
            })?;

        Ok(format!("{}{}", self.prefix, next))
    }
}

#[async_trait]
impl<E: Entity> CodeGenerator<E> for IncrementalCodeGenerator {
    async fn generate(
        &self,
        manager: &EntityManager<E>,
        _entity: &E,
        cancel: &CancellationToken,
    ) -> ManagerResult<String> {
        let latest = manager.find_latest(cancel).await?;
        let latest_code = match &latest {
            Some(entity) => Some(
                entity
                    .as_coded()
                    .ok_or_else(|| ManagerError::entity_capability_missing::<E>("coded"))?
                    .code()
                    .to_string(),
            ),
            None => None,
        };

        let code = self.next_code(manager.normalizer(), latest_code.as_deref())?;
        debug!(entity = E::entity_type(), previous = ?latest_code, %code, "Generated incremental code");
        Ok(code)
    }
}
