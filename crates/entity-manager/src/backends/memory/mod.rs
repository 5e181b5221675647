//! In-memory store.
//!
//! Entities live in a `Vec` behind a [`parking_lot::RwLock`], in insertion
//! order. Every write takes the write lock for its whole duration, so the
//! stamp comparison and the write it guards are atomic.
//!
//! The store advertises only the capabilities it is configured with, which
//! makes it the natural fixture for exercising capability gating:
//!
//! ```
//! # #[cfg(feature = "memory")]
//! # {
//! use helios_entity_manager::backends::memory::MemoryStore;
//! use helios_entity_manager::core::{Capability, EntityStore};
//! # use helios_entity_manager::types::Entity;
//! # #[derive(Debug, Clone)]
//! # struct Note { id: String }
//! # impl Entity for Note {
//! #     type Id = String;
//! #     type Detail = ();
//! #     fn id(&self) -> &String { &self.id }
//! # }
//!
//! let store: MemoryStore<Note> = MemoryStore::new();
//! assert!(store.as_queryable().is_some());
//! assert!(store.as_code_store().is_none());
//! # }
//! ```

mod store;

pub use store::{ID_PROPERTY, MemoryStore};
