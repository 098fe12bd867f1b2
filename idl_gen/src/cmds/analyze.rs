/* Analyze command - print the extracted enums, constants and string table */

use super::common::load_generation;
use clap::ValueEnum;
use idl_gen::GenerateConfig;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
    Json,
    Yaml,
}

pub fn run(config: GenerateConfig, format: ReportFormat) -> anyhow::Result<()> {
    let generation = load_generation(&config, false, false)?;
    let report = generation.report();

    let text = match format {
        ReportFormat::Json => serde_json::to_string_pretty(&report)?,
        ReportFormat::Yaml => serde_yml::to_string(&report)?,
    };
    println!("{}", text);
    Ok(())
}
