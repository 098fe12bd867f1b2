/* Resolved input and output locations for one run */

use idl_loader::{GrammarError, GrammarProfile};
use std::path::{Path, PathBuf};

pub const DEFAULT_IDL_DIR: &str = "idl";
pub const DEFAULT_HEADER: &str = "lib/lib_webgpu_strings.h";
pub const DEFAULT_COMPANION: &str = "lib/lib_webgpu.js";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    /* Directory holding the documents the grammar profile lists */
    pub idl_dir: PathBuf,
    pub header_path: PathBuf,
    pub companion_path: PathBuf,
    /* Grammar profile override; the bundled WebGPU profile when None */
    pub grammar_path: Option<PathBuf>,
}

impl GenerateConfig {
    /* The fixed layout, relative to a repository root */
    pub fn from_root(root: &Path) -> Self {
        Self {
            idl_dir: root.join(DEFAULT_IDL_DIR),
            header_path: root.join(DEFAULT_HEADER),
            companion_path: root.join(DEFAULT_COMPANION),
            grammar_path: None,
        }
    }

    pub fn load_grammar(&self) -> Result<GrammarProfile, GrammarError> {
        match &self.grammar_path {
            Some(path) => GrammarProfile::from_file(path),
            None => GrammarProfile::webgpu(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_is_relative_to_root() {
        let config = GenerateConfig::from_root(Path::new("/repo"));
        assert_eq!(config.idl_dir, PathBuf::from("/repo/idl"));
        assert_eq!(config.header_path, PathBuf::from("/repo/lib/lib_webgpu_strings.h"));
        assert_eq!(config.companion_path, PathBuf::from("/repo/lib/lib_webgpu.js"));
        assert!(config.load_grammar().is_ok());
    }
}
