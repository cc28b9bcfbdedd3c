//! End-to-end tests for the export surface.
//!
//! Loads both units the way a host would: resolve each unit's export table,
//! instantiate it, build structured arguments in the instance's memory and
//! call exports by name.

pub mod fixtures;

#[cfg(test)]
mod integration;

pub use fixtures::{ada, load_add_numbers, load_hello_world, Host};
