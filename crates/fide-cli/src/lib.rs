//! FIDE CLI Library
//!
//! Extracts player records from the local ratings store for a list of FIDE
//! ids.
//!
//! # Overview
//!
//! - **Key lists**: one id per line (`keys`)
//! - **Projection**: whitelist-validated field lists and the keyed lookup
//!   (`projection`)
//! - **Output**: a CSV file plus a table or plain console rendering
//!   (`render`)

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod commands;
pub mod error;
pub mod keys;
pub mod projection;
pub mod render;

// Re-export commonly used types
pub use error::{CliError, Result};
pub use projection::Projection;
pub use render::OutputFormat;

use clap::Parser;
use std::path::PathBuf;

/// Query FIDE ratings by FIDE id and write the results as CSV
#[derive(Parser, Debug)]
#[command(name = "fide-query")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// File containing FIDE ids, one per line
    pub input: PathBuf,

    /// CSV file the results are written to
    pub output: PathBuf,

    /// Fields to include, space or comma separated.
    /// Allowed: id, name, country, sex, title, rating, games_played,
    /// rapid_rating, rapid_games, blitz_rating, blitz_games, birthday
    #[arg(
        long,
        num_args = 1..,
        value_delimiter = ',',
        default_values_t = ["id", "name", "country", "rating"].map(String::from)
    )]
    pub fields: Vec<String>,

    /// SQLite database file
    #[arg(long, env = "FIDE_DATABASE", default_value = "fide_ratings.db")]
    pub database: PathBuf,

    /// Console output format (defaults to table on a terminal, plain otherwise)
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}
