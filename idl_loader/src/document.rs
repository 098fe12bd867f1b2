/* Loading IDL documents from disk and bringing them into the parser's grammar */

use crate::grammar::{FixupTally, GrammarError, GrammarProfile};
use crate::parser::{IdlParser, ParseError};
use idl_types::Declaration;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace};

/// Errors raised while reading, fixing up, or parsing the IDL documents.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A listed document could not be read.
    #[error("failed to read IDL file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The grammar profile is invalid or one of its required exceptions went stale.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// A fixed-up document is outside the supported grammar.
    #[error("IDL parse error: {0}")]
    Parse(#[from] ParseError),
}

/* A fixed-up document, ready to parse */
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /* Name reported in parse errors */
    pub filename: String,
    pub path: PathBuf,
    /* Stub declarations parsed ahead of the document */
    pub prelude: Option<String>,
    /* Document text with the grammar exceptions applied */
    pub text: String,
}

/* Read one IDL file and apply the profile's exceptions to it */
pub fn load_and_fixup(
    path: &Path,
    profile: &GrammarProfile,
    tally: &mut FixupTally,
) -> Result<String, LoadError> {
    let src = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let src = normalize_newlines(src);
    let fixed = profile.apply(&src, tally);
    debug!(path = %path.display(), before = src.len(), after = fixed.len(), "fixed up IDL");
    trace!(path = %path.display(), "fixed-up IDL:\n{}", fixed);
    Ok(fixed)
}

/* Grammar exceptions are written against LF text; CRLF and lone CR checkouts are folded to LF */
fn normalize_newlines(src: String) -> String {
    if !src.contains('\r') {
        return src;
    }
    src.replace("\r\n", "\n").replace('\r', "\n")
}

/* Load every document the profile lists, relative to `idl_dir` */
pub fn load_documents(
    idl_dir: &Path,
    profile: &GrammarProfile,
) -> Result<Vec<LoadedDocument>, LoadError> {
    let mut tally = FixupTally::default();
    let mut documents = Vec::with_capacity(profile.documents.len());

    for spec in &profile.documents {
        let path = idl_dir.join(&spec.path);
        let text = load_and_fixup(&path, profile, &mut tally)?;
        documents.push(LoadedDocument {
            filename: spec.path.clone(),
            path,
            prelude: spec.prelude.clone(),
            text,
        });
    }

    profile.check_tally(&tally)?;
    Ok(documents)
}

/* Parse all documents, in order, into one shared declaration list */
pub fn parse_documents(documents: &[LoadedDocument]) -> Result<Vec<Declaration>, ParseError> {
    let mut parser = IdlParser::new();
    for doc in documents {
        if let Some(prelude) = &doc.prelude {
            parser.parse(prelude, &format!("<prelude of {}>", doc.filename))?;
        }
        parser.parse(&doc.text, &doc.filename)?;
    }
    Ok(parser.finish())
}

/* Load, fix up and parse in one step */
pub fn load_declarations(
    idl_dir: &Path,
    profile: &GrammarProfile,
) -> Result<Vec<Declaration>, LoadError> {
    let documents = load_documents(idl_dir, profile)?;
    Ok(parse_documents(&documents)?)
}
