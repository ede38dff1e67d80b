//! CLI module - Command-line interface for Cookbook
//!
//! Parsed with clap; every subcommand except `serve` is a one-shot
//! maintenance task against the configured database.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Cookbook - recipe catalog API
#[derive(Parser)]
#[command(name = "cookbook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Read configuration from this file instead of the default search paths
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Load ingredients from a JSON array of {"name", "measurement_unit"}
    ImportIngredients {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Insert the default tags (breakfast, lunch, dinner)
    SeedTags,

    /// Create an account and print its API key
    CreateAccount {
        email: String,

        username: String,

        /// Defaults to the username
        #[arg(long)]
        first_name: Option<String>,

        /// Defaults to the username
        #[arg(long)]
        last_name: Option<String>,

        /// Allow editing and deleting any recipe
        #[arg(long)]
        admin: bool,
    },
}
