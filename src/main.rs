//! # chisel CLI Entry Point
//!
//! Parses CLI arguments using clap and routes to the build, clean and embed
//! handlers. Running with no subcommand performs the full scan/compile/link
//! pass over the configured source directories.
//!
//! All errors bubble up as `anyhow::Result`; the process exits non-zero with
//! a diagnostic when any step of a build fails.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use chisel::builder::{self, AppConfig};
use chisel::cache::{BuildCache, CACHE_FILE};
use chisel::config;
use chisel::embed::{self, EmbedKind};

#[derive(Parser)]
#[command(name = "chisel")]
#[command(about = "A tiny incremental build helper for C projects", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Compiler executable to use (overrides chisel.toml)
    #[arg(long)]
    cc: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove build artifacts and the build cache
    Clean,
    /// Embed a file into a generated C header
    Embed {
        /// File to embed
        input: PathBuf,
        /// Generated header path
        output: PathBuf,
        /// Emit an unsigned char array instead of a string array
        #[arg(long)]
        bytes: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Clean) => {
            let config = config::load_config()?;
            let app = AppConfig::from_config(&config);
            builder::clean(&app.out_dir, Path::new(CACHE_FILE))
        }

        Some(Commands::Embed {
            input,
            output,
            bytes,
        }) => {
            let kind = if *bytes {
                EmbedKind::ByteArray
            } else {
                EmbedKind::StringArray
            };
            embed::embed(input, output, kind)
        }

        None => {
            let config = config::load_config()?;
            let app = AppConfig::from_config(&config);

            // CLI flag beats chisel.toml beats the platform default. The
            // compiler is resolved through PATH at exec time; no environment
            // variables are consulted.
            let compiler = cli
                .cc
                .clone()
                .or_else(|| config.build.as_ref().and_then(|b| b.compiler.clone()))
                .unwrap_or_else(|| builder::DEFAULT_CC.to_string());

            let cache_file = Path::new(CACHE_FILE);
            let mut cache = BuildCache::load(cache_file)?;
            builder::build_app(&compiler, &app, &mut cache, cache_file)
        }
    }
}
