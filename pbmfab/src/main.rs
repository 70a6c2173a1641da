use libfab::{Encoding, HeadConfig};
use pbmfab::{encode, exit_code, inspect, EXIT_USAGE};
use std::{path::PathBuf, process::ExitCode};
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

#[cfg(not(debug_assertions))]
const DEFAULT_DEBUG_LEVEL: u8 = 1;
#[cfg(debug_assertions)]
const DEFAULT_DEBUG_LEVEL: u8 = 3;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Turn debugging information on
    #[arg(short, long, default_value_t = DEFAULT_DEBUG_LEVEL, action = clap::ArgAction::Count)]
    verbosity: u8,

    #[command(subcommand)]
    command: Commands,
}

/// The print head being driven
#[derive(Args, Debug)]
struct Head {
    /// Number of jets on the print head (1 to 16)
    #[arg(short, long)]
    jets: u8,

    /// Distance in mm the head advances between two bands
    #[arg(short, long)]
    mm_per_row: f64,
}

impl Head {
    fn config(&self) -> Result<HeadConfig> {
        Ok(HeadConfig::builder()
            .jets(self.jets)
            .mm_per_row(self.mm_per_row)
            .build()?)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// converts a binary PBM layer into fabricator commands
    Encode {
        /// The PBM layer (stdin if omitted)
        input: Option<PathBuf>,

        /// The output file name (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        head: Head,

        /// Wire encoding of the firing patterns: listing or packed
        #[arg(short, long)]
        encoding: Encoding,
    },

    /// reports how a PBM layer splits into bands
    Inspect {
        /// The PBM layer (stdin if omitted)
        input: Option<PathBuf>,

        #[command(flatten)]
        head: Head,
    },
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Encode {
            input,
            output,
            head,
            encoding,
        } => {
            encode(
                input.as_deref(),
                output.as_deref(),
                &head.config()?,
                encoding,
            )?;
        }
        Commands::Inspect { input, head } => {
            print!("{}", inspect(input.as_deref(), &head.config()?)?);
        }
    }
    Ok(())
}

// help and version requests are not failures
fn usage_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        EXIT_USAGE
    } else {
        0
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(usage_exit_code(&e));
        }
    };
    let level = match cli.verbosity {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };
    // stdout carries the command stream, so diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::from_level(level).into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pbmfab: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}
