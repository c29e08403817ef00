//! PDL to palaestrAI Command Line Interface
//!
//! # Usage
//!
//! ```bash
//! # Check a scenario file
//! pdl2palaestrai validate scenarios/minimal.pdl.yaml
//!
//! # Convert one file (default: output/minimal.arl.dummy.yaml)
//! pdl2palaestrai convert scenarios/minimal.pdl.yaml --profile ppo
//!
//! # Convert a directory
//! pdl2palaestrai batch-convert scenarios --output-dir configs
//! ```
//!
//! Exit codes: 0 success, 1 invalid PDL (or missing input directory),
//! 2 any other failure.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pdl2palaestrai::{
    convert_directory, convert_file, load_pdl_file, validate_pdl_document, ConvertError,
    ConvertOptions, Profile,
};

#[derive(Parser)]
#[command(name = "pdl2palaestrai")]
#[command(version)]
#[command(about = "Convert PROVIDER PDL YAML to palaestrai experiment inputs")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a PDL YAML file
    Validate {
        /// Path to pdl.yaml
        input: PathBuf,
    },

    /// Convert one PDL YAML file
    Convert {
        /// Path to pdl.yaml
        input: PathBuf,

        /// Output YAML path
        #[arg(long, short)]
        output: Option<PathBuf>,

        #[command(flatten)]
        shared: SharedArgs,
    },

    /// Convert all YAML files in a directory
    BatchConvert {
        /// Directory with PDL YAML files
        input_dir: PathBuf,

        /// Directory for generated configs
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,

        #[command(flatten)]
        shared: SharedArgs,
    },
}

/// Options shared by `convert` and `batch-convert`. Unset flags fall back to
/// the options file, then to the built-in defaults.
#[derive(Args)]
struct SharedArgs {
    /// YAML file with conversion options
    #[arg(long)]
    options_file: Option<PathBuf>,

    /// max_ticks for ProviderEnvironment [default: 365]
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Training episodes [default: 1]
    #[arg(long)]
    episodes: Option<u64>,

    /// Random seed [default: 42]
    #[arg(long)]
    seed: Option<u64>,

    /// Environment UID prefix [default: provider_env]
    #[arg(long)]
    environment_uid: Option<String>,

    /// Prefix for experiment uid [default: provider]
    #[arg(long)]
    experiment_uid_prefix: Option<String>,

    /// Agent profile for generated config [default: dummy]
    #[arg(long, value_enum)]
    profile: Option<Profile>,

    /// Attacker muscle budget for the ppo profile [default: 0.8]
    #[arg(long)]
    attacker_budget: Option<f64>,

    /// Defender muscle budget for the ppo profile [default: 0.4]
    #[arg(long)]
    defender_budget: Option<f64>,

    /// Directory holding attacker.pt / defender.pt [default: checkpoints]
    #[arg(long)]
    checkpoint_dir: Option<PathBuf>,
}

impl SharedArgs {
    fn to_options(&self) -> Result<ConvertOptions> {
        let mut options = match &self.options_file {
            Some(path) => ConvertOptions::from_file(path)
                .with_context(|| format!("Failed to load options from {}", path.display()))?,
            None => ConvertOptions::default(),
        };

        if let Some(max_ticks) = self.max_ticks {
            options.max_ticks = max_ticks;
        }
        if let Some(episodes) = self.episodes {
            options.episodes = episodes;
        }
        if let Some(seed) = self.seed {
            options.seed = seed;
        }
        if let Some(environment_uid) = &self.environment_uid {
            options.environment_uid = environment_uid.clone();
        }
        if let Some(prefix) = &self.experiment_uid_prefix {
            options.experiment_uid_prefix = prefix.clone();
        }
        if let Some(profile) = self.profile {
            options.profile = profile;
        }
        if let Some(budget) = self.attacker_budget {
            options.attacker_budget = budget;
        }
        if let Some(budget) = self.defender_budget {
            options.defender_budget = budget;
        }
        if let Some(dir) = &self.checkpoint_dir {
            options.checkpoint_dir = dir.clone();
        }

        Ok(options)
    }
}

// =============================================================================
// MAIN
// =============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Convert {
            input,
            output,
            shared,
        } => cmd_convert(&input, output.as_deref(), &shared),
        Commands::BatchConvert {
            input_dir,
            output_dir,
            shared,
        } => cmd_batch_convert(&input_dir, &output_dir, &shared),
    };

    ExitCode::from(code)
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

// =============================================================================
// COMMAND IMPLEMENTATIONS
// =============================================================================

fn cmd_validate(input: &Path) -> u8 {
    let document = match load_pdl_file(input) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Validation failed: {}", e);
            return 2;
        }
    };

    let defects = validate_pdl_document(&document);
    if !defects.is_empty() {
        eprintln!("PDL is invalid:");
        for defect in &defects {
            eprintln!("- {}", defect);
        }
        return 1;
    }

    println!("PDL is valid.");
    0
}

fn cmd_convert(input: &Path, output: Option<&Path>, shared: &SharedArgs) -> u8 {
    let options = match shared.to_options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Conversion failed: {:#}", e);
            return 2;
        }
    };

    match convert_file(input, output, &options) {
        Ok(target) => {
            println!("Written: {}", target.display());
            0
        }
        Err(e) => report_failure("Conversion failed", &e),
    }
}

fn cmd_batch_convert(input_dir: &Path, output_dir: &Path, shared: &SharedArgs) -> u8 {
    if !input_dir.is_dir() {
        eprintln!("Input directory does not exist: {}", input_dir.display());
        return 1;
    }

    let options = match shared.to_options() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Batch conversion failed: {:#}", e);
            return 2;
        }
    };

    let results = match convert_directory(input_dir, output_dir, &options) {
        Ok(results) => results,
        Err(e) => return report_failure("Batch conversion failed", &e),
    };

    if results.is_empty() {
        println!("No YAML files found.");
        return 0;
    }

    println!("Converted {} files:", results.len());
    for result in &results {
        println!("- {}", result.display());
    }
    0
}

/// Validation failures print as-is with exit 1; anything else is prefixed and exits 2.
fn report_failure(context: &str, err: &ConvertError) -> u8 {
    if err.is_validation() {
        eprintln!("{}", err);
        1
    } else {
        eprintln!("{}: {}", context, err);
        2
    }
}
