//! IDL Declaration Types
//!
//! This crate contains the declaration model produced by the IDL parser.
//! It provides pure data structures without any file I/O, parsing, or
//! code generation logic.

pub mod decl;

// Re-export commonly used types at the crate root
pub use decl::*;
