use async_trait::async_trait;
use regex::{NoExpand, Regex};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::Capability;
use crate::error::{ManagerError, ManagerResult};
use crate::manager::EntityManager;
use crate::types::Entity;

use super::CodeGenerator;

const NON_ALPHANUMERIC_RUN: &str = r"[^\p{L}\p{N}]+";

/// Derives a code by slugifying the entity's name.
///
/// Requires the name-based or scoped-name-based capability.
#[derive(Debug, Clone)]
pub struct UrlFriendlyCodeGenerator {
    separator: String,
    pattern: Regex,
}

impl UrlFriendlyCodeGenerator {
    /// Creates a generator joining words with `separator`.
    pub fn new(separator: impl Into<String>) -> ManagerResult<Self> {
        Ok(Self {
            separator: separator.into(),
            pattern: Regex::new(NON_ALPHANUMERIC_RUN)?,
        })
    }

    /// The configured separator.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Slugifies `name`: non-alphanumeric runs become one separator, the
    /// result is trimmed and lowercased.
    ///
    /// ```
    /// use helios_entity_manager::codegen::UrlFriendlyCodeGenerator;
    ///
    /// let generator = UrlFriendlyCodeGenerator::new("-").unwrap();
    /// assert_eq!(generator.slug("  Blue Widget (Large)! "), "blue-widget-large");
    /// assert_eq!(generator.slug("Crème brûlée"), "crème-brûlée");
    /// ```
    pub fn slug(&self, name: &str) -> String {
        let collapsed = self
            .pattern
            .replace_all(name, NoExpand(self.separator.as_str()));
        collapsed
            .trim_matches(|c: char| self.separator.contains(c))
            .to_lowercase()
    }
}

#[async_trait]
impl<E: Entity> CodeGenerator<E> for UrlFriendlyCodeGenerator {
    async fn generate(
        &self,
        manager: &EntityManager<E>,
        entity: &E,
        _cancel: &CancellationToken,
    ) -> ManagerResult<String> {
        let registry = manager.capabilities()?;
        if !registry.supports(Capability::NameBased)
            && !registry.supports(Capability::ScopedNameBased)
        {
            return Err(ManagerError::CapabilityNotSupported {
                backend_name: registry.backend_name().to_string(),
                capability: Capability::NameBased,
            });
        }

        let named = entity
            .as_named()
            .ok_or_else(|| ManagerError::entity_capability_missing::<E>("named"))?;
        let code = self.slug(named.name());
        debug!(entity = E::entity_type(), %code, "Generated URL-friendly code");
        Ok(code)
    }
}
