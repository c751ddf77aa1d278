//! CLI command implementations.

pub mod build;
pub mod drivers;
pub mod keyboards;
pub mod setup;
