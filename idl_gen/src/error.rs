use crate::codegen::companion::PatchError;
use std::path::PathBuf;
use thiserror::Error;

/// Result alias used across the generator.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Errors produced while deriving, validating, or committing the artifacts.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Two distinct sources mangled to the same constant name.
    #[error("identifier '{identifier}' produced by both {first} and {second}")]
    IdentifierCollision {
        identifier: String,
        first: String,
        second: String,
    },

    /// The companion module no longer matches the expected marker layout.
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// A staged artifact broke one of the generator's invariants.
    #[error("staged {artifact} failed validation: {reason}")]
    Validation {
        artifact: &'static str,
        reason: String,
    },

    /// Reading or writing an artifact failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenerateError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn validation(artifact: &'static str, reason: impl Into<String>) -> Self {
        GenerateError::Validation {
            artifact,
            reason: reason.into(),
        }
    }
}
