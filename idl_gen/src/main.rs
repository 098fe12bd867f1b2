use clap::{Args, Parser, Subcommand};
use cmds::analyze::ReportFormat;
use idl_gen::GenerateConfig;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cmds;

#[derive(Parser)]
#[command(name = "idl-gen")]
#[command(about = "WebGPU string table generator: IDL enums to C constants and a JS lookup table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input and output locations. Defaults follow the repository layout.
#[derive(Args, Clone, Debug)]
struct PathArgs {
    /// Repository root the default locations are resolved against
    #[arg(long = "root", value_name = "DIR", default_value = ".")]
    root: PathBuf,

    /// Directory containing common.idl and webgpu.idl
    #[arg(long = "idl-dir", value_name = "DIR")]
    idl_dir: Option<PathBuf>,

    /// Generated C header
    #[arg(long = "header", value_name = "FILE")]
    header: Option<PathBuf>,

    /// JavaScript companion module holding the string table
    #[arg(long = "companion", value_name = "FILE")]
    companion: Option<PathBuf>,

    /// Grammar exception profile (YAML) replacing the bundled one
    #[arg(long = "grammar", value_name = "FILE")]
    grammar: Option<PathBuf>,
}

impl From<PathArgs> for GenerateConfig {
    fn from(args: PathArgs) -> Self {
        let mut config = GenerateConfig::from_root(&args.root);
        if let Some(dir) = args.idl_dir {
            config.idl_dir = dir;
        }
        if let Some(header) = args.header {
            config.header_path = header;
        }
        if let Some(companion) = args.companion {
            config.companion_path = companion;
        }
        config.grammar_path = args.grammar;
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the header and patch the companion module's string table
    Generate {
        #[command(flatten)]
        paths: PathArgs,

        /// Print the fixed-up IDL text before parsing
        #[arg(long = "echo-idl")]
        echo_idl: bool,

        /// Stage and validate both artifacts without writing them
        #[arg(long = "dry-run")]
        dry_run: bool,

        /// Enable verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /// Fail if the header or companion table on disk are out of date
    Check {
        #[command(flatten)]
        paths: PathArgs,

        /// Enable verbose output
        #[arg(short = 'v', long = "verbose")]
        verbose: bool,
    },

    /// Print extracted enums, their constants and the string table
    Analyze {
        #[command(flatten)]
        paths: PathArgs,

        /// Output format
        #[arg(long = "format", value_enum, default_value = "json")]
        format: ReportFormat,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            paths,
            echo_idl,
            dry_run,
            verbose,
        } => {
            cmds::generate::run(paths.into(), echo_idl, verbose, dry_run)?;
        }

        Commands::Check { paths, verbose } => {
            cmds::check::run(paths.into(), verbose)?;
        }

        Commands::Analyze { paths, format } => {
            cmds::analyze::run(paths.into(), format)?;
        }
    }

    Ok(())
}
