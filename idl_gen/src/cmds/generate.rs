/* Generate command - write the header and patch the companion module */

use super::common::{load_generation, stage_outputs};
use idl_gen::GenerateConfig;

pub fn run(config: GenerateConfig, echo_idl: bool, verbose: bool, dry_run: bool) -> anyhow::Result<()> {
    if verbose {
        println!("IDL Generator - String Table Generation");
        println!("=======================================\n");
        println!("[~] Configuration:");
        println!("  IDL directory: {}", config.idl_dir.display());
        println!("  Header: {}", config.header_path.display());
        println!("  Companion module: {}", config.companion_path.display());
        if let Some(grammar) = &config.grammar_path {
            println!("  Grammar profile: {}", grammar.display());
        }
        println!();
    }

    let generation = load_generation(&config, echo_idl, verbose)?;
    let staged = stage_outputs(&config, &generation, verbose)?;

    if dry_run {
        println!("[~] Dry run: nothing written");
        return Ok(());
    }

    staged.commit()?;
    println!("[✓] Code generation complete!");
    Ok(())
}
