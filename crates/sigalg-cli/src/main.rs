//! sigalg command line tool

mod commands;
mod context;
mod envelope;
mod error;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use context::Context;
use error::CliResult;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sigalg")]
#[command(about = "Signature algorithm resolution - names, parameters and identifiers")]
#[command(version)]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an algorithm name or dotted OID to its canonical name
    Normalize {
        /// Algorithm name or OID
        designator: String,
    },

    /// Decode signature parameters
    Decode {
        /// Signature algorithm the parameters belong to
        #[arg(short, long)]
        algorithm: String,

        /// DER parameters as hex; omit for none
        #[arg(short, long)]
        params: Option<String>,
    },

    /// Sign a file
    Sign {
        /// File to sign
        #[arg(short, long)]
        file: PathBuf,

        /// PKCS#8 PEM private key
        #[arg(short, long)]
        key: PathBuf,

        /// Signature algorithm name or OID
        #[arg(short, long)]
        algorithm: String,

        /// DER parameters as hex; defaults are chosen for the key when omitted
        #[arg(short, long)]
        params: Option<String>,

        /// Signature output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a signature file
    Verify {
        /// Signed file
        #[arg(short, long)]
        file: PathBuf,

        /// Public or private key (PEM)
        #[arg(short, long)]
        key: PathBuf,

        /// Signature file written by `sign`
        #[arg(short, long)]
        signature: PathBuf,
    },

    /// Show a key and the algorithms it can be used with
    Info {
        /// Key file (PEM)
        #[arg(short, long)]
        key: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = Context::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Normalize { designator } => {
            commands::normalize::handle(&ctx, designator)?;
        }
        Commands::Decode { algorithm, params } => {
            commands::decode::handle(&ctx, algorithm, params)?;
        }
        Commands::Sign {
            file,
            key,
            algorithm,
            params,
            output,
        } => {
            commands::sign::handle(&ctx, file, key, algorithm, params, output)?;
        }
        Commands::Verify { file, key, signature } => {
            commands::verify::handle(&ctx, file, key, signature)?;
        }
        Commands::Info { key } => {
            commands::info::handle(&ctx, key)?;
        }
    }

    Ok(())
}
