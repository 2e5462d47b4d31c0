//! Storage implementations for evaluating composed queries

#[cfg(feature = "in-memory")]
pub mod in_memory;
pub mod sql;

#[cfg(feature = "in-memory")]
pub use in_memory::InMemoryStore;
pub use sql::{SqlCompiler, SqlStatement};
