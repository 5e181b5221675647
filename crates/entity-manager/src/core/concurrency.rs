//! Optimistic concurrency control for update and delete.
//!
//! Entities that expose a [`ConcurrencyStamped`](crate::types::ConcurrencyStamped)
//! accessor take part in stamp-based compare-and-swap: the controller
//! captures the stamp the caller read, writes a fresh one, and asks the store
//! to apply the write only if the persisted stamp still equals the captured
//! value. The store owns that comparison; the controller owns the stamp
//! lifecycle and the translation of a conflict into a business failure.
//!
//! Entities without a stamp pass straight through. A conflict reported for
//! such an entity is a contract violation and surfaces as
//! [`ManagerError::UnexpectedConflict`].

use std::fmt;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ManagerError, ManagerResult};
use crate::types::{Entity, EntityError, EntityResult};

use super::store::{EntityStore, WriteOutcome};

/// The write being protected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// Replace the stored entity.
    Update,
    /// Remove the stored entity.
    Delete,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Update => write!(f, "update"),
            Mutation::Delete => write!(f, "delete"),
        }
    }
}

/// Generates a new random concurrency stamp.
pub fn new_concurrency_stamp() -> String {
    Uuid::new_v4().to_string()
}

/// Applies updates and deletes with stamp-based conflict detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcurrencyController;

impl ConcurrencyController {
    /// Creates a controller.
    pub fn new() -> Self {
        Self
    }

    /// Runs `mutation` against `store`.
    ///
    /// On success a stamped entity carries its new stamp. On any other
    /// outcome, including backend errors, the entity gets back the stamp it
    /// had on entry.
    pub async fn apply<E: Entity>(
        &self,
        store: &dyn EntityStore<E>,
        entity: &mut E,
        mutation: Mutation,
    ) -> ManagerResult<EntityResult> {
        let previous = match entity.as_stamped_mut() {
            Some(stamped) => {
                let previous = stamped.concurrency_stamp().to_string();
                stamped.set_concurrency_stamp(new_concurrency_stamp());
                previous
            }
            None => return self.pass_through(store, entity, mutation).await,
        };

        let outcome = match mutation {
            Mutation::Update => store.update(entity, Some(&previous)).await,
            Mutation::Delete => store.delete(entity, Some(&previous)).await,
        };

        match outcome {
            Ok(WriteOutcome::Completed(EntityResult::Success)) => {
                debug!(entity = E::entity_type(), id = %entity.id(), %mutation, "Stamped write applied");
                Ok(EntityResult::Success)
            }
            Ok(WriteOutcome::Completed(failed)) => {
                restore_stamp(entity, previous);
                Ok(failed)
            }
            Ok(WriteOutcome::Conflict) => {
                restore_stamp(entity, previous);
                warn!(
                    entity = E::entity_type(),
                    id = %entity.id(),
                    %mutation,
                    "Concurrency stamp mismatch"
                );
                Ok(EntityResult::failed(vec![EntityError::concurrency_failure()]))
            }
            Err(e) => {
                restore_stamp(entity, previous);
                Err(e.into())
            }
        }
    }

    async fn pass_through<E: Entity>(
        &self,
        store: &dyn EntityStore<E>,
        entity: &E,
        mutation: Mutation,
    ) -> ManagerResult<EntityResult> {
        let outcome = match mutation {
            Mutation::Update => store.update(entity, None).await?,
            Mutation::Delete => store.delete(entity, None).await?,
        };

        match outcome {
            WriteOutcome::Completed(result) => Ok(result),
            WriteOutcome::Conflict => Err(ManagerError::UnexpectedConflict {
                entity_type: E::entity_type(),
                id: entity.id().to_string(),
            }),
        }
    }
}

fn restore_stamp<E: Entity>(entity: &mut E, previous: String) {
    if let Some(stamped) = entity.as_stamped_mut() {
        stamped.set_concurrency_stamp(previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_stamps_are_unique() {
        let a = new_concurrency_stamp();
        let b = new_concurrency_stamp();
        assert_ne!(a, b);
        assert_eq!(a.len(), 36);
    }

    #[test]
    fn test_mutation_display() {
        assert_eq!(Mutation::Update.to_string(), "update");
        assert_eq!(Mutation::Delete.to_string(), "delete");
    }
}
