//! Outcome types for mutating operations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Machine-matchable error codes produced by the manager and its validators.
pub mod codes {
    /// Fallback for unspecified failures.
    pub const DEFAULT_ERROR: &str = "DefaultError";
    /// The entity was modified by someone else since it was read.
    pub const CONCURRENCY_FAILURE: &str = "ConcurrencyFailure";
    /// Another entity already owns the code.
    pub const DUPLICATE_CODE: &str = "DuplicateCode";
    /// Another entity already owns the name.
    pub const DUPLICATE_NAME: &str = "DuplicateName";
    /// Another entity already owns the primary key.
    pub const DUPLICATE_KEY: &str = "DuplicateKey";
    /// The code is blank or malformed.
    pub const INVALID_CODE: &str = "InvalidCode";
    /// The name is blank or malformed.
    pub const INVALID_NAME: &str = "InvalidName";
    /// The scope a scoped name belongs to is blank.
    pub const INVALID_SCOPE: &str = "InvalidScope";
}

/// A structured, machine-matchable failure reason.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityError {
    /// Stable error code, see [`codes`].
    pub code: String,
    /// Human-readable description.
    pub description: String,
}

impl EntityError {
    /// Creates an error with an arbitrary code.
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }

    /// An unspecified failure.
    pub fn default_error() -> Self {
        Self::new(codes::DEFAULT_ERROR, "An unknown failure has occurred.")
    }

    /// Optimistic concurrency failure.
    pub fn concurrency_failure() -> Self {
        Self::new(
            codes::CONCURRENCY_FAILURE,
            "Optimistic concurrency failure, object has been modified.",
        )
    }

    /// The code is already taken.
    pub fn duplicate_code(code: &str) -> Self {
        Self::new(
            codes::DUPLICATE_CODE,
            format!("Code '{}' is already taken.", code),
        )
    }

    /// The name is already taken.
    pub fn duplicate_name(name: &str) -> Self {
        Self::new(
            codes::DUPLICATE_NAME,
            format!("Name '{}' is already taken.", name),
        )
    }

    /// The primary key is already taken.
    pub fn duplicate_key(id: &str) -> Self {
        Self::new(
            codes::DUPLICATE_KEY,
            format!("An entity with key '{}' already exists.", id),
        )
    }

    /// The code is invalid.
    pub fn invalid_code(code: &str) -> Self {
        Self::new(codes::INVALID_CODE, format!("Code '{}' is invalid.", code))
    }

    /// The name is invalid.
    pub fn invalid_name(name: &str) -> Self {
        Self::new(codes::INVALID_NAME, format!("Name '{}' is invalid.", name))
    }

    /// The scope is blank.
    pub fn invalid_scope(scope_id: &str) -> Self {
        Self::new(codes::INVALID_SCOPE, format!("Scope '{}' is invalid.", scope_id))
    }
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.description)
    }
}

/// Outcome of a create, update or delete.
///
/// Every mutating manager call yields exactly one `EntityResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityResult {
    /// The operation was applied.
    Success,
    /// The operation was rejected; nothing was persisted.
    Failed(Vec<EntityError>),
}

impl EntityResult {
    /// A successful result.
    pub fn success() -> Self {
        EntityResult::Success
    }

    /// A failed result. An empty error list is replaced by
    /// [`EntityError::default_error`] so a failure always explains itself.
    pub fn failed(errors: impl IntoIterator<Item = EntityError>) -> Self {
        let errors: Vec<EntityError> = errors.into_iter().collect();
        if errors.is_empty() {
            EntityResult::Failed(vec![EntityError::default_error()])
        } else {
            EntityResult::Failed(errors)
        }
    }

    /// Success when `errors` is empty, otherwise a failure carrying them.
    pub fn from_errors(errors: Vec<EntityError>) -> Self {
        if errors.is_empty() {
            EntityResult::Success
        } else {
            EntityResult::Failed(errors)
        }
    }

    /// Returns `true` on success.
    pub fn succeeded(&self) -> bool {
        matches!(self, EntityResult::Success)
    }

    /// Errors carried by a failure; empty on success.
    pub fn errors(&self) -> &[EntityError] {
        match self {
            EntityResult::Success => &[],
            EntityResult::Failed(errors) => errors,
        }
    }

    /// Returns `true` if the failure carries the given error code.
    pub fn has_error(&self, code: &str) -> bool {
        self.errors().iter().any(|e| e.code == code)
    }
}

impl fmt::Display for EntityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityResult::Success => write!(f, "Succeeded"),
            EntityResult::Failed(errors) => {
                let codes: Vec<&str> = errors.iter().map(|e| e.code.as_str()).collect();
                write!(f, "Failed : {}", codes.join(","))
            }
        }
    }
}
