//! Command-line argument parsing for mtgjudge
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::config::Config;

/// mtgjudge - Answer Magic: The Gathering rules questions from the Comprehensive Rules
#[derive(Parser, Debug)]
#[command(name = "mtgjudge")]
#[command(version)]
#[command(about = "Retrieval-augmented rules judge for the MTG Comprehensive Rules", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (only answers and errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Override the vector collection name
    #[arg(long, global = true)]
    pub collection: Option<String>,

    /// Override the number of similarity hits
    #[arg(long, global = true)]
    pub top_k: Option<usize>,

    /// Override the Qdrant URL
    #[arg(long, global = true)]
    pub qdrant_url: Option<String>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Download the latest rules document and write the chunk JSON files
    Fetch,

    /// Embed the rule chunks and rebuild the vector collection
    Index {
        /// Rule chunk JSON (defaults to <output_dir>/per_rule_chunks.json)
        #[arg(long)]
        input: Option<PathBuf>,
    },

    /// Answer a single question
    Ask {
        /// The rules question
        question: String,
    },

    /// Show the rules that would be sent to the model for a question
    Search {
        question: String,
    },

    /// Look up one rule by its number (e.g. 702.9b)
    Rule {
        number: String,
    },

    /// Start interactive question loop
    Start,

    /// Display current configuration
    Config {
        /// Write the effective configuration to the config file (fails if it exists)
        #[arg(long)]
        init: bool,
    },
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Apply command-line overrides on top of a loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(collection) = &self.collection {
            config.qdrant.collection = collection.clone();
        }
        if let Some(top_k) = self.top_k {
            config.retrieval.top_k = top_k;
        }
        if let Some(url) = &self.qdrant_url {
            config.qdrant.url = url.clone();
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show progress bars
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if retrieved rules should be echoed before answers
    pub fn show_rules(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
