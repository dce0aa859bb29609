//! Command-line interface for Destination Finder.

mod commands;

use clap::{Parser, Subcommand};

/// Destination Finder - find places around a location and keep a search history
#[derive(Parser)]
#[command(name = "destination-finder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply migrations and run the web API until Ctrl+C
    #[command(alias = "web")]
    Serve,

    /// Apply database migrations and exit
    Migrate,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Search places around a location
    #[command(alias = "s")]
    Search {
        /// City, address or postcode
        #[arg(required = true)]
        query: Vec<String>,
        /// Search radius in metres
        #[arg(long)]
        radius: Option<u32>,
        /// Category id filter, repeatable
        #[arg(long = "category")]
        categories: Vec<u32>,
        /// Sign in as this user (password read from stdin) and save the results
        #[arg(long = "user")]
        username: Option<String>,
    },

    /// Create an account; the password is read from stdin
    Register {
        username: String,
    },

    /// Show a user's search history
    #[command(alias = "h")]
    History {
        username: String,
        /// Rank places by how often they were found
        #[arg(long, conflicts_with = "keyword")]
        popular: bool,
        /// Number of popular places to show
        #[arg(long, requires = "popular")]
        limit: Option<u64>,
        /// Only records whose name or address contains this text
        #[arg(long)]
        keyword: Option<String>,
    },

    /// Delete a user and their search history
    #[command(alias = "rm")]
    DeleteUser {
        username: String,
    },
}

pub use commands::*;
