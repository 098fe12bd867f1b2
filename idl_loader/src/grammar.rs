/* Grammar exception profiles
 *
 * The declaration parser only understands a subset of WebIDL. Upstream IDL
 * text is brought into that subset by a versioned list of textual exceptions
 * shipped alongside the parser, so drift in the upstream text shows up as a
 * stale exception instead of a silent mis-parse.
 */

use regex::Regex;
use serde_derive::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/* Profile version understood by this parser */
pub const SUPPORTED_GRAMMAR_VERSION: u32 = 1;

/* Bundled profile for the WebGPU IDL sources */
pub const WEBGPU_GRAMMAR: &str = include_str!("../grammar/webgpu.yaml");

/// Errors raised while loading or applying a grammar profile.
#[derive(Debug, Error)]
pub enum GrammarError {
    /// The profile file could not be read.
    #[error("failed to read grammar profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The profile is not valid YAML for this schema.
    #[error("malformed grammar profile: {0}")]
    Yaml(#[from] serde_yml::Error),

    /// The profile was written for a newer generator.
    #[error("grammar profile version {found} is not supported (expected {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// An exception does not carry exactly one usable matcher.
    #[error("grammar exception '{name}' is invalid: {reason}")]
    InvalidException { name: String, reason: String },

    /// An exception's regex does not compile.
    #[error("grammar exception '{name}' has an invalid regex: {source}")]
    InvalidRegex {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// A required exception matched nowhere in its documents.
    #[error("grammar exception '{name}' matched nothing; the upstream IDL changed and the profile needs updating")]
    StaleException { name: String },
}

/* One IDL document of a run, in parse order */
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct DocumentSpec {
    /* File name relative to the IDL directory */
    pub path: String,
    /* Declarations injected ahead of the document so cross-references resolve */
    #[serde(default)]
    pub prelude: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct ExceptionSpec {
    name: String,
    #[serde(default)]
    literal: Option<String>,
    #[serde(default)]
    regex: Option<String>,
    #[serde(default = "default_required")]
    required: bool,
}

fn default_required() -> bool {
    true
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "kebab-case")]
struct ProfileFile {
    version: u32,
    #[serde(default)]
    documents: Vec<DocumentSpec>,
    #[serde(default)]
    exceptions: Vec<ExceptionSpec>,
}

#[derive(Debug, Clone)]
pub enum Matcher {
    Literal(String),
    Regex(Regex),
}

/* A construct removed from the source before parsing */
#[derive(Debug, Clone)]
pub struct GrammarException {
    pub name: String,
    pub matcher: Matcher,
    pub required: bool,
}

impl GrammarException {
    /* Remove every occurrence, returning the new text and the number of removals */
    pub fn apply(&self, src: &str) -> (String, usize) {
        match &self.matcher {
            Matcher::Literal(lit) => {
                let count = src.matches(lit.as_str()).count();
                if count == 0 {
                    (src.to_string(), 0)
                } else {
                    (src.replace(lit.as_str(), ""), count)
                }
            }
            Matcher::Regex(re) => {
                let count = re.find_iter(src).count();
                if count == 0 {
                    (src.to_string(), 0)
                } else {
                    (re.replace_all(src, "").into_owned(), count)
                }
            }
        }
    }
}

/* Per-exception match counts accumulated over all documents of a run */
#[derive(Debug, Clone, Default)]
pub struct FixupTally {
    hits: Vec<usize>,
}

impl FixupTally {
    pub fn hits(&self, index: usize) -> usize {
        self.hits.get(index).copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct GrammarProfile {
    pub version: u32,
    pub documents: Vec<DocumentSpec>,
    pub exceptions: Vec<GrammarException>,
}

impl GrammarProfile {
    /* The bundled WebGPU profile */
    pub fn webgpu() -> Result<Self, GrammarError> {
        Self::from_yaml(WEBGPU_GRAMMAR)
    }

    pub fn from_file(path: &Path) -> Result<Self, GrammarError> {
        let text = std::fs::read_to_string(path).map_err(|source| GrammarError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<Self, GrammarError> {
        let file: ProfileFile = serde_yml::from_str(text)?;

        if file.version != SUPPORTED_GRAMMAR_VERSION {
            return Err(GrammarError::UnsupportedVersion {
                found: file.version,
                supported: SUPPORTED_GRAMMAR_VERSION,
            });
        }

        let mut exceptions = Vec::with_capacity(file.exceptions.len());
        for spec in file.exceptions {
            let matcher = match (spec.literal, spec.regex) {
                (Some(lit), None) if !lit.is_empty() => Matcher::Literal(lit),
                (None, Some(pattern)) => {
                    let re = Regex::new(&pattern).map_err(|source| GrammarError::InvalidRegex {
                        name: spec.name.clone(),
                        source,
                    })?;
                    Matcher::Regex(re)
                }
                (Some(_), Some(_)) => {
                    return Err(GrammarError::InvalidException {
                        name: spec.name,
                        reason: "exactly one of 'literal' or 'regex' must be given".to_string(),
                    });
                }
                _ => {
                    return Err(GrammarError::InvalidException {
                        name: spec.name,
                        reason: "a non-empty 'literal' or a 'regex' is required".to_string(),
                    });
                }
            };
            exceptions.push(GrammarException {
                name: spec.name,
                matcher,
                required: spec.required,
            });
        }

        Ok(Self {
            version: file.version,
            documents: file.documents,
            exceptions,
        })
    }

    /* Apply every exception in order, recording hits in `tally` */
    pub fn apply(&self, src: &str, tally: &mut FixupTally) -> String {
        if tally.hits.len() < self.exceptions.len() {
            tally.hits.resize(self.exceptions.len(), 0);
        }

        let mut text = src.to_string();
        for (index, exception) in self.exceptions.iter().enumerate() {
            let (next, count) = exception.apply(&text);
            debug!(exception = %exception.name, count, "applied grammar exception");
            tally.hits[index] += count;
            text = next;
        }
        text
    }

    /* Fail on the first required exception that never matched */
    pub fn check_tally(&self, tally: &FixupTally) -> Result<(), GrammarError> {
        for (index, exception) in self.exceptions.iter().enumerate() {
            if exception.required && tally.hits(index) == 0 {
                return Err(GrammarError::StaleException {
                    name: exception.name.clone(),
                });
            }
        }
        Ok(())
    }
}
