//! Error types for the entity manager.
//!
//! Expected business failures (validation violations, duplicate keys,
//! concurrency conflicts) are never errors: they travel as
//! [`EntityResult::Failed`](crate::types::EntityResult) values. The types in
//! this module are reserved for contract violations by the caller or the
//! configuration, plus failures raised by the storage backend itself.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::core::Capability;
use crate::types::Entity;

/// Fatal error raised by the entity manager.
///
/// None of these are retried or recovered inside the crate. They indicate
/// that the caller used the manager outside its contract, that the manager
/// was misconfigured, or that the backend failed in a way the manager does
/// not translate.
#[derive(Error, Debug)]
pub enum ManagerError {
    /// The backend does not implement the requested capability.
    #[error("capability '{capability}' not supported by {backend_name}")]
    CapabilityNotSupported {
        backend_name: String,
        capability: Capability,
    },

    /// The backend declares a capability but the entity does not expose the
    /// matching accessor.
    #[error("entity type {entity_type} does not expose the '{capability}' accessor")]
    EntityCapabilityMissing {
        entity_type: &'static str,
        capability: &'static str,
    },

    /// The manager was used after it was disposed.
    #[error("entity manager for {backend_name} has been disposed")]
    Disposed { backend_name: String },

    /// The operation observed a cancellation request.
    #[error("operation '{operation}' was cancelled")]
    Cancelled { operation: &'static str },

    /// The sort expression names a property the entity does not expose.
    #[error("unknown sort property '{property}' for {entity_type}")]
    UnknownSortProperty {
        entity_type: &'static str,
        property: String,
    },

    /// The stored code sequence cannot be continued.
    #[error("cannot continue code sequence from '{code}': {reason}")]
    InvalidCodeSequence { code: String, reason: String },

    /// The backend reported a write conflict for an entity without a
    /// concurrency stamp.
    #[error("unexpected write conflict on {entity_type} {id}")]
    UnexpectedConflict { entity_type: &'static str, id: String },

    /// A required argument was empty.
    #[error("missing required argument: {argument}")]
    MissingArgument { argument: &'static str },

    /// The manager configuration is inconsistent.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// Backend failure, propagated unchanged.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Errors originating from a storage backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The entity to mutate does not exist.
    #[error("entity not found: {entity_type}/{id}")]
    NotFound { entity_type: String, id: String },

    /// The backend has been closed.
    #[error("backend {backend_name} is closed")]
    Closed { backend_name: String },
}

/// Result type alias for manager operations.
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Result type alias for backend operations.
pub type StoreResult<T> = Result<T, BackendError>;

impl ManagerError {
    /// Builds a [`ManagerError::EntityCapabilityMissing`] for entity type `E`.
    pub fn entity_capability_missing<E: Entity>(capability: &'static str) -> Self {
        ManagerError::EntityCapabilityMissing {
            entity_type: E::entity_type(),
            capability,
        }
    }

    /// Returns `true` if this error was caused by cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ManagerError::Cancelled { .. })
    }
}

impl From<regex::Error> for ManagerError {
    fn from(err: regex::Error) -> Self {
        ManagerError::InvalidConfiguration {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_not_supported_display() {
        let err = ManagerError::CapabilityNotSupported {
            backend_name: "memory".to_string(),
            capability: Capability::CodeBased,
        };
        assert_eq!(
            err.to_string(),
            "capability 'code-based' not supported by memory"
        );
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let err: ManagerError = BackendError::NotFound {
            entity_type: "Product".to_string(),
            id: "p-1".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "entity not found: Product/p-1");
        assert!(matches!(err, ManagerError::Backend(_)));
    }

    #[test]
    fn test_is_cancelled() {
        let err = ManagerError::Cancelled { operation: "create" };
        assert!(err.is_cancelled());
        assert!(!ManagerError::MissingArgument { argument: "id" }.is_cancelled());
    }

    #[derive(Debug, Clone)]
    struct Widget {
        id: u32,
    }

    impl Entity for Widget {
        type Id = u32;
        type Detail = ();

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    #[test]
    fn test_entity_capability_missing_names_type() {
        let err = ManagerError::entity_capability_missing::<Widget>("coded");
        assert!(matches!(
            err,
            ManagerError::EntityCapabilityMissing {
                entity_type: "Widget",
                capability: "coded",
            }
        ));
        assert_eq!(
            err.to_string(),
            "entity type Widget does not expose the 'coded' accessor"
        );
    }

    #[test]
    fn test_regex_error_is_configuration_error() {
        let err: ManagerError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, ManagerError::InvalidConfiguration { .. }));
    }
}
