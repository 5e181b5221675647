//! Store implementations.
//!
//! Each backend is gated behind a feature flag.
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | Memory | `memory` | Process-local store for tests and prototyping |
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "memory")]
//! # {
//! use helios_entity_manager::backends::memory::MemoryStore;
//! use helios_entity_manager::core::Capability;
//! # use helios_entity_manager::types::Entity;
//! # #[derive(Debug, Clone)]
//! # struct Note { id: String }
//! # impl Entity for Note {
//! #     type Id = String;
//! #     type Detail = ();
//! #     fn id(&self) -> &String { &self.id }
//! # }
//!
//! let store: MemoryStore<Note> = MemoryStore::new().with_capability(Capability::TimeTracked);
//! assert!(store.capabilities().contains(Capability::Queryable));
//! # }
//! ```

#[cfg(feature = "memory")]
pub mod memory;
