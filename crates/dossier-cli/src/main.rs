mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

#[derive(Parser)]
#[command(
    name = "dossier",
    version,
    about = "Extract people, places, dates and other entities from scanned documents"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run OCR or PDF text extraction and print the raw text and word boxes
    Ocr {
        /// Path to an image or PDF
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the raw result to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Extract entities with their positions from an image or PDF
    Extract {
        /// Path to an image or PDF
        input_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Mark entities placed on the estimated fallback box
        #[arg(long)]
        show_estimated: bool,
    },
    /// Print the normalized form of a plain text file
    Normalize {
        /// Path to a UTF-8 text file
        input_file: PathBuf,

        /// Custom JSON rule file (default: the en-ocr preset)
        #[arg(short, long = "rules", value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Predefined rule set: en-ocr or en-printed
        #[arg(short, long = "preset", value_name = "NAME", conflicts_with = "rules")]
        preset: Option<String>,
    },
    /// Extract entities from a plain text file through the configured language model
    TextEntities {
        /// Path to a UTF-8 text file
        input_file: PathBuf,
    },
    /// Manage and inspect normalization rule sets
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },
}

#[derive(Subcommand)]
enum RulesAction {
    /// List predefined rule sets
    List,
    /// Print every rule of a predefined rule set
    Show {
        /// Preset name (e.g., "en-ocr")
        preset: String,
    },
    /// Validate a custom rule file
    Validate {
        /// Path to JSON rule file
        file: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Ocr {
            input_file,
            output,
            out,
        } => commands::ocr::run(input_file, &output, out),
        Commands::Extract {
            input_file,
            output,
            show_estimated,
        } => commands::extract::run(input_file, &output, show_estimated),
        Commands::Normalize {
            input_file,
            rules,
            preset,
        } => commands::normalize::run(input_file, rules, preset),
        Commands::TextEntities { input_file } => commands::text_entities::run(input_file),
        Commands::Rules { action } => match action {
            RulesAction::List => commands::rules::list(),
            RulesAction::Show { preset } => commands::rules::show(&preset),
            RulesAction::Validate { file } => commands::rules::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
