//! Core contracts and building blocks.
//!
//! - [`EntityStore`] and the optional store contracts - what a backend implements
//! - [`CapabilityRegistry`] - runtime capability discovery and gating
//! - [`LookupNormalizer`] - canonical lookup forms for names and codes
//! - [`ConcurrencyController`] - stamp-based optimistic concurrency
//! - [`Clock`] - time source for entity timestamps
//!
//! # Capability Model
//!
//! ```text
//! EntityStore (mandatory: create, update, delete, find_by_id)
//!     ├── QueryableStore      (queryable)
//!     ├── CodeStore           (code-based)
//!     ├── NameStore           (name-based)
//!     ├── ScopedNameStore     (scoped-name-based)
//!     ├── TimeTrackedStore    (time-tracked)
//!     ├── GroupedStore        (grouped)
//!     ├── MasterDetailsStore  (master-details)
//!     └── EagerLoadingStore   (eager-loading)
//! ```
//!
//! # Example: Implementing a Store
//!
//! ```ignore
//! use async_trait::async_trait;
//! use helios_entity_manager::core::{EntityStore, CodeStore, WriteOutcome};
//!
//! #[async_trait]
//! impl EntityStore<Invoice> for PgInvoices {
//!     fn backend_name(&self) -> &'static str {
//!         "postgres"
//!     }
//!
//!     fn as_code_store(&self) -> Option<&dyn CodeStore<Invoice>> {
//!         Some(self)
//!     }
//!
//!     // ... create, update, delete, find_by_id
//! }
//! ```

pub mod capabilities;
pub mod clock;
pub mod concurrency;
pub mod normalizer;
pub mod store;

pub use capabilities::{Capability, CapabilityRegistry, CapabilitySet};
pub use clock::{Clock, SystemClock};
pub use concurrency::{ConcurrencyController, Mutation, new_concurrency_stamp};
pub use normalizer::{CaseFoldNormalizer, LookupNormalizer};
pub use store::{
    CodeStore, EagerLoadingStore, EntityStore, GroupedStore, MasterDetailsStore, NameStore,
    QueryableStore, ScopedNameStore, TimeTrackedStore, WriteOutcome,
};
