//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::storage::ExpiryPreset;

/// Notelink - share notes through short expiring links
#[derive(Parser)]
#[command(name = "notelink")]
#[command(version)]
#[command(about = "Share notes through short, expiring links", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true, default_value = crate::config::DEFAULT_CONFIG_PATH)]
    pub config: String,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Share a note from a file or stdin and print its link
    Share {
        /// File to read; reads stdin when omitted or "-"
        file: Option<String>,

        /// Expiry preset: 1d, 7d, 30d or never
        #[arg(long, short = 'e')]
        expires: Option<ExpiryPreset>,
    },

    /// Print a stored note as JSON
    Show {
        /// Slug of the note
        slug: String,
    },

    /// Generate example configuration file
    GenerateConfig {
        /// Output path; prints to stdout when omitted
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// Whether this invocation runs the HTTP server
    pub fn is_server_mode(&self) -> bool {
        matches!(self.command, None | Some(Commands::Serve))
    }
}
