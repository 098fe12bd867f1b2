/* Check command - fail when the artifacts on disk are out of date */

use super::common::{load_generation, stage_outputs};
use idl_gen::GenerateConfig;

pub fn run(config: GenerateConfig, verbose: bool) -> anyhow::Result<()> {
    let generation = load_generation(&config, false, verbose)?;
    let staged = stage_outputs(&config, &generation, verbose)?;

    let stale = staged.stale_artifacts()?;
    if stale.is_empty() {
        println!("[✓] Generated artifacts are up to date");
        return Ok(());
    }

    println!("[✗] {} artifact(s) out of date:", stale.len());
    for artifact in &stale {
        println!("  [!] {}", artifact.path.display());
    }
    anyhow::bail!("stale artifacts, rerun `idl-gen generate`");
}
