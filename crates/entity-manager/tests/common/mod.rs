//! Test infrastructure for the entity manager.
//!
//! Fixture entities covering each accessor combination, plus harness helpers
//! for building stores and managers.

#![allow(dead_code)]

pub mod fixtures;
pub mod harness;

// Re-export commonly used items
pub use fixtures::*;
pub use harness::*;
