//! Search backend implementations.
//!
//! The engine only depends on the [`crate::services::SearchBackend`] trait;
//! this module provides the in-memory implementation used by the CLI and by
//! deterministic tests.

pub mod memory;

pub use memory::MemoryBackend;
