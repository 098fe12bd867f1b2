//! IDL File Loading and Parsing
//!
//! This crate reads IDL documents from disk, applies the grammar exception
//! profile that brings upstream text into the supported grammar, and parses
//! the result into an ordered declaration list.

pub mod document;
pub mod grammar;
pub mod parser;

// Re-export commonly used types at the crate root
pub use document::{
    load_and_fixup, load_declarations, load_documents, parse_documents, LoadError, LoadedDocument,
};
pub use grammar::{
    DocumentSpec, FixupTally, GrammarError, GrammarException, GrammarProfile, Matcher,
    SUPPORTED_GRAMMAR_VERSION, WEBGPU_GRAMMAR,
};
pub use parser::{IdlParser, ParseError, ParseErrorKind};

// Re-export idl_types for convenience
pub use idl_types;
