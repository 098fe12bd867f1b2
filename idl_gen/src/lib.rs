//! WebGPU IDL String-Table Generator
//!
//! Derives a C header of enum constants and the matching string table
//! embedded in the JavaScript companion module from parsed IDL
//! declarations, and writes both together or not at all.

pub mod bind;
pub mod codegen;
pub mod config;
pub mod error;
pub mod extract;
pub mod mangle;
pub mod pipeline;
pub mod stage;
pub mod strings;

pub use bind::{bind_enum, bind_enums, ConstantDefinition, EnumBinding};
pub use config::GenerateConfig;
pub use error::{GenerateError, GenerateResult};
pub use extract::extract_enums;
pub use mangle::{mangle, IdentifierRegistry};
pub use pipeline::{generate, Generation, GenerationReport};
pub use stage::{Artifact, StagedOutputs};
pub use strings::StringTable;
