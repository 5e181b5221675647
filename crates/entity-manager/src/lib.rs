//! Helios Entity Manager
//!
//! A capability-driven entity manager. It sits between application code and
//! a pluggable storage backend and orchestrates the lifecycle of domain
//! entities: code generation, validation, key normalization, timestamps,
//! optimistic concurrency and search.
//!
//! # Features
//!
//! - **Capability discovery**: stores advertise optional contracts (code lookup,
//!   name lookup, scoped names, time tracking, groups, details, eager loading,
//!   querying); the manager probes once and gates every call
//! - **Validation**: a chain of independent validators whose errors are
//!   aggregated into one result
//! - **Code generation**: incremental (`ORD-41` → `ORD-42`) or URL-friendly slugs
//! - **Optimistic concurrency**: stamp-based compare-and-swap on update and delete
//! - **Search**: filtering, sorting, paging and eager loading over any
//!   queryable store
//!
//! Backend features:
//! - `memory` (default) - in-process store for tests and prototyping
//!
//! # Architecture
//!
//! - [`types`] - entity contract, results, search types
//! - [`error`] - fatal error types
//! - [`core`] - store contracts, capability registry, normalizer, concurrency
//! - [`validation`] - validator chain and built-in validators
//! - [`codegen`] - code generation strategies
//! - [`search`] - the search pipeline
//! - [`manager`] - the [`EntityManager`] and its builder
//! - [`backends`] - store implementations
//!
//! # Outcomes
//!
//! Expected business failures are values, not errors. `create`, `update` and
//! `delete` return [`EntityResult`](types::EntityResult): either `Success` or
//! `Failed` with every violation found. [`ManagerError`] is reserved for
//! contract violations (an unsupported capability, a disposed manager, a
//! cancelled call) and backend failures.
//!
//! # Quick Start
//!
//! ```
//! # #[cfg(feature = "memory")]
//! # {
//! use helios_entity_manager::backends::memory::MemoryStore;
//! use helios_entity_manager::core::Capability;
//! use helios_entity_manager::types::{Entity, Named};
//! use helios_entity_manager::EntityManager;
//! use tokio_util::sync::CancellationToken;
//!
//! #[derive(Debug, Clone)]
//! struct Team {
//!     id: u32,
//!     name: String,
//!     normalized_name: String,
//! }
//!
//! impl Named for Team {
//!     fn name(&self) -> &str { &self.name }
//!     fn set_name(&mut self, name: String) { self.name = name; }
//!     fn normalized_name(&self) -> &str { &self.normalized_name }
//!     fn set_normalized_name(&mut self, n: String) { self.normalized_name = n; }
//! }
//!
//! impl Entity for Team {
//!     type Id = u32;
//!     type Detail = ();
//!     fn id(&self) -> &u32 { &self.id }
//!     fn as_named(&self) -> Option<&dyn Named> { Some(self) }
//!     fn as_named_mut(&mut self) -> Option<&mut dyn Named> { Some(self) }
//! }
//!
//! # tokio_test::block_on(async {
//! let store = MemoryStore::new().with_capability(Capability::NameBased);
//! let manager = EntityManager::builder(store)
//!     .with_default_validators()
//!     .build()?;
//!
//! let cancel = CancellationToken::new();
//! let mut team = Team { id: 1, name: " Platform ".into(), normalized_name: String::new() };
//! assert!(manager.create(&mut team, &cancel).await?.succeeded());
//! assert_eq!(team.normalized_name, "platform");
//!
//! let mut twin = Team { id: 2, name: "PLATFORM".into(), normalized_name: String::new() };
//! let result = manager.create(&mut twin, &cancel).await?;
//! assert!(!result.succeeded());
//! # Ok::<(), helios_entity_manager::ManagerError>(())
//! # }).unwrap();
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod codegen;
pub mod config;
pub mod core;
pub mod error;
pub mod manager;
pub mod search;
pub mod types;
pub mod validation;

// Re-export commonly used types at crate root
pub use config::ManagerOptions;
pub use error::{BackendError, ManagerError, ManagerResult, StoreResult};
pub use manager::{EntityManager, EntityManagerBuilder};
pub use types::{
    Entity, EntityError, EntityQueryResult, EntityResult, SearchDescriptor, codes,
};

// Re-export core traits
pub use core::{
    Capability, CapabilityRegistry, CapabilitySet, Clock, EntityStore, LookupNormalizer,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
