//! Naive wrappers to create commonly used ast types, and source location lookups.
pub(crate) mod ast_builder;
pub(crate) mod lookup_range;
pub(crate) mod naming;
pub(crate) mod node;
