/* Common steps shared by the generate, check and analyze commands */

use anyhow::Context;
use idl_gen::{generate, GenerateConfig, Generation, StagedOutputs};
use idl_loader::{load_documents, parse_documents};

/* Load, fix up and parse the IDL, then bind every enum */
pub fn load_generation(
    config: &GenerateConfig,
    echo_idl: bool,
    verbose: bool,
) -> anyhow::Result<Generation> {
    let profile = config.load_grammar().with_context(|| match &config.grammar_path {
        Some(path) => format!("loading grammar profile {}", path.display()),
        None => "loading bundled grammar profile".to_string(),
    })?;

    if verbose {
        println!("[~] Grammar profile v{} with {} exception(s)", profile.version, profile.exceptions.len());
        println!("[~] Loading IDL documents from {}...", config.idl_dir.display());
    }

    let documents = load_documents(&config.idl_dir, &profile)?;
    for doc in &documents {
        if verbose {
            println!("    - {} ({} bytes after fixup)", doc.path.display(), doc.text.len());
        }
        if echo_idl {
            println!("{}", doc.text);
        }
    }

    let declarations = parse_documents(&documents)?;
    if verbose {
        println!("[✓] Parsed {} declaration(s)", declarations.len());
    }

    let generation = generate(&declarations)?;
    if verbose {
        println!(
            "[✓] Bound {} enum(s) to {} string table entries",
            generation.bindings.len(),
            generation.table.len()
        );
    }
    Ok(generation)
}

/* Derive both artifacts in memory and validate them together */
pub fn stage_outputs(
    config: &GenerateConfig,
    generation: &Generation,
    verbose: bool,
) -> anyhow::Result<StagedOutputs> {
    let staged = StagedOutputs::stage(generation, &config.header_path, &config.companion_path)
        .with_context(|| format!("staging {}", config.companion_path.display()))?;
    staged.validate(generation)?;

    if verbose {
        println!("[✓] Staged outputs validated:");
        println!("    - {} ({} bytes)", staged.header.path.display(), staged.header.contents.len());
        println!(
            "    - {} ({} bytes)",
            staged.companion.path.display(),
            staged.companion.contents.len()
        );
    }
    Ok(staged)
}
