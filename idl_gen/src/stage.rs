/* Staged, all-or-nothing output
 *
 * Both artifacts are derived fully in memory and validated together. Only
 * then are they written: each to a temp file beside its target, and once
 * both temp files are complete, renamed over the targets.
 */

use crate::codegen::{parse_header_defines, verify_patched, CompanionModule};
use crate::error::{GenerateError, GenerateResult};
use crate::mangle::invalid_identifier;
use crate::pipeline::Generation;
use crate::strings::SENTINEL_INDEX;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/* One output file and its full new contents */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub contents: String,
}

impl Artifact {
    /* Whether the file on disk already holds exactly these contents */
    pub fn is_current(&self) -> GenerateResult<bool> {
        match std::fs::read_to_string(&self.path) {
            Ok(existing) => Ok(existing == self.contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(GenerateError::io(&self.path, e)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StagedOutputs {
    pub header: Artifact,
    pub companion: Artifact,
}

impl StagedOutputs {
    /* Derive both artifacts, reading the companion module's current text from disk */
    pub fn stage(
        generation: &Generation,
        header_path: &Path,
        companion_path: &Path,
    ) -> GenerateResult<Self> {
        let companion_text = std::fs::read_to_string(companion_path)
            .map_err(|e| GenerateError::io(companion_path, e))?;
        Self::stage_with_companion(generation, header_path, companion_path, &companion_text)
    }

    pub fn stage_with_companion(
        generation: &Generation,
        header_path: &Path,
        companion_path: &Path,
        companion_text: &str,
    ) -> GenerateResult<Self> {
        let module = CompanionModule::locate(companion_text)?;
        debug!(
            path = %companion_path.display(),
            line = module.region_line(),
            previous_entries = module.current_table().map(|t| t.len()).unwrap_or(0),
            "staging companion module"
        );
        let patched = module.patch(&generation.rendered_table())?;

        Ok(Self {
            header: Artifact {
                path: header_path.to_path_buf(),
                contents: generation.header(),
            },
            companion: Artifact {
                path: companion_path.to_path_buf(),
                contents: patched,
            },
        })
    }

    /* Re-check every invariant against both prospective outputs */
    pub fn validate(&self, generation: &Generation) -> GenerateResult<()> {
        let table = &generation.table;
        if table.get(SENTINEL_INDEX) != Some("") {
            return Err(GenerateError::validation(
                "string table",
                "index 0 is not the empty sentinel",
            ));
        }

        if generation.bindings.len() != generation.enums.len() {
            return Err(GenerateError::validation(
                "header",
                format!(
                    "{} enums extracted but {} bound",
                    generation.enums.len(),
                    generation.bindings.len()
                ),
            ));
        }

        for (decl, binding) in generation.enums.iter().zip(&generation.bindings) {
            match binding.invalid() {
                Some(c) if c.code == SENTINEL_INDEX && c.identifier == invalid_identifier(&decl.name) => {}
                _ => {
                    return Err(GenerateError::validation(
                        "header",
                        format!("{} does not lead with its invalid constant bound to 0", decl.name),
                    ));
                }
            }
            if binding.values().len() != decl.values.len() {
                return Err(GenerateError::validation(
                    "header",
                    format!("{} lost or gained constants", decl.name),
                ));
            }
            for (value, constant) in decl.values.iter().zip(binding.values()) {
                if constant.code == SENTINEL_INDEX || table.get(constant.code) != Some(value.as_str()) {
                    return Err(GenerateError::validation(
                        "header",
                        format!(
                            "{} maps to {} but table entry {} is {:?}",
                            constant.identifier,
                            value,
                            constant.code,
                            table.get(constant.code)
                        ),
                    ));
                }
            }
        }

        let expected: Vec<(String, usize)> = generation
            .bindings
            .iter()
            .flat_map(|b| b.constants.iter())
            .map(|c| (c.identifier.clone(), c.code))
            .collect();
        if parse_header_defines(&self.header.contents) != expected {
            return Err(GenerateError::validation(
                "header",
                "#define lines do not match the bound constants in order",
            ));
        }

        verify_patched(&self.companion.contents, &generation.rendered_table())?;
        Ok(())
    }

    /* Artifacts whose on-disk contents differ from the staged ones */
    pub fn stale_artifacts(&self) -> GenerateResult<Vec<&Artifact>> {
        let mut stale = Vec::new();
        for artifact in [&self.header, &self.companion] {
            if !artifact.is_current()? {
                stale.push(artifact);
            }
        }
        Ok(stale)
    }

    /* Write both artifacts, or neither if any write fails before the final renames */
    pub fn commit(&self) -> GenerateResult<()> {
        let mut pending = Vec::with_capacity(2);
        for artifact in [&self.header, &self.companion] {
            pending.push((write_temp(artifact)?, artifact));
        }

        for (temp, artifact) in pending {
            temp.persist(&artifact.path)
                .map_err(|e| GenerateError::io(&artifact.path, e.error))?;
            info!(path = %artifact.path.display(), bytes = artifact.contents.len(), "wrote artifact");
        }
        Ok(())
    }
}

fn write_temp(artifact: &Artifact) -> GenerateResult<NamedTempFile> {
    let dir = match artifact.path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| GenerateError::io(dir, e))?;

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| GenerateError::io(dir, e))?;
    temp.write_all(artifact.contents.as_bytes())
        .map_err(|e| GenerateError::io(temp.path(), e))?;
    temp.as_file()
        .sync_all()
        .map_err(|e| GenerateError::io(temp.path(), e))?;

    /* Keep the target's mode; temp files are created owner-only */
    if let Ok(metadata) = std::fs::metadata(&artifact.path) {
        std::fs::set_permissions(temp.path(), metadata.permissions())
            .map_err(|e| GenerateError::io(temp.path(), e))?;
    }
    Ok(temp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::generate;
    use idl_types::{Declaration, EnumDecl};

    const MODULE: &str = "// Global constant string table for all WebGPU strings. Contains 1 entries, using 0 bytes.\nwgpuStrings: [],\n";

    fn generation() -> Generation {
        generate(&[
            Declaration::Enum(EnumDecl::new("GPUAutoLayoutMode", vec!["auto".into()])),
            Declaration::Enum(EnumDecl::new(
                "GPUCanvasAlphaMode",
                vec!["opaque".into(), "auto".into()],
            )),
        ])
        .unwrap()
    }

    #[test]
    fn staged_outputs_pass_validation() {
        let generation = generation();
        let staged = StagedOutputs::stage_with_companion(
            &generation,
            Path::new("out/strings.h"),
            Path::new("out/lib.js"),
            MODULE,
        )
        .unwrap();
        staged.validate(&generation).unwrap();
        assert!(staged.companion.contents.contains("wgpuStrings: [,'auto','opaque']"));
        assert!(staged.companion.contents.contains("Contains 3 entries, using 16 bytes."));
    }

    #[test]
    fn tampered_header_fails_validation() {
        let generation = generation();
        let mut staged = StagedOutputs::stage_with_companion(
            &generation,
            Path::new("h"),
            Path::new("js"),
            MODULE,
        )
        .unwrap();
        staged.header.contents = staged.header.contents.replace(
            "#define WGPU_CANVAS_ALPHA_MODE_AUTO 1",
            "#define WGPU_CANVAS_ALPHA_MODE_AUTO 2",
        );
        assert!(matches!(
            staged.validate(&generation),
            Err(GenerateError::Validation { artifact: "header", .. })
        ));
    }

    #[test]
    fn tampered_companion_fails_validation() {
        let generation = generation();
        let mut staged = StagedOutputs::stage_with_companion(
            &generation,
            Path::new("h"),
            Path::new("js"),
            MODULE,
        )
        .unwrap();
        staged.companion.contents = staged.companion.contents.replace("'opaque'", "'opaqu'");
        assert!(matches!(
            staged.validate(&generation),
            Err(GenerateError::Patch(_))
        ));
    }

    #[test]
    fn missing_marker_fails_before_staging() {
        let generation = generation();
        let err = StagedOutputs::stage_with_companion(
            &generation,
            Path::new("h"),
            Path::new("js"),
            "var LibraryWebGPU = {};\n",
        )
        .unwrap_err();
        assert!(matches!(err, GenerateError::Patch(_)));
    }
}
