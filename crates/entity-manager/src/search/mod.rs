//! Search: filtering, ordering, paging and eager loading.
//!
//! The [`SearchEngine`] drives a [`QueryableStore`](crate::core::QueryableStore)
//! through a fixed pipeline. Request planning that needs no store (sort
//! resolution, page windows) lives in [`plan`] so it can be tested on its own.

mod engine;
pub mod plan;

pub use engine::SearchEngine;
pub use plan::{PageWindow, resolve_sort};
