//! Core types for the entity manager.
//!
//! - [`Entity`] and the per-capability accessor traits
//! - [`EntityResult`], [`EntityError`] - outcomes of mutating operations
//! - [`SearchDescriptor`], [`EntityQuery`], [`EntityQueryResult`] - search types
//!
//! # Examples
//!
//! ```
//! use helios_entity_manager::types::{EntityError, EntityResult, SearchDescriptor, codes};
//!
//! let result = EntityResult::failed(vec![EntityError::duplicate_name("Widget")]);
//! assert!(result.has_error(codes::DUPLICATE_NAME));
//!
//! let request = SearchDescriptor::new()
//!     .with_text("widget")
//!     .with_sort("-name")
//!     .with_page(2, 25);
//! assert_eq!(request.page_size, Some(25));
//! ```

mod entity;
mod query;
mod result;

pub use entity::{Coded, ConcurrencyStamped, Entity, Grouped, Named, Scoped, TimeTracked};
pub use query::{
    EntityQuery, EntityQueryResult, Partition, SearchDescriptor, SortDirection, SortDirective,
    SortValue,
};
pub use result::{EntityError, EntityResult, codes};
