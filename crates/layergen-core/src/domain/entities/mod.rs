// ============================================================================
// entities/mod.rs
// ============================================================================

pub mod common;
pub mod generation;
pub mod manifest;
pub mod project;
pub mod provider;
pub mod registry;
