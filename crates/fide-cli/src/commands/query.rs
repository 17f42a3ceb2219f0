//! `fide-query` command implementation
//!
//! Reads a key list, validates the requested fields, looks the keys up in
//! the dataset store, writes the CSV file and prints the result.

use crate::error::{CliError, Result};
use crate::keys::read_keys;
use crate::projection::{write_csv_file, Projection};
use crate::render::OutputFormat;
use crate::Cli;
use colored::Colorize;
use fide_common::store::DatasetStore;
use tracing::{debug, info};

/// Run the query command
pub async fn run(cli: &Cli) -> Result<usize> {
    // Input errors surface before the database is opened
    let projection = Projection::parse(&cli.fields)?;
    let keys = read_keys(&cli.input)?;
    debug!(fields = ?projection.header(), keys = keys.len(), "Validated query input");

    // Only an absent file is "missing"; other open failures pass through
    if !cli.database.exists() {
        return Err(CliError::DatabaseMissing(cli.database.clone()));
    }
    let store = DatasetStore::open_existing(&cli.database).await?;

    let result = projection.execute(&store, &keys).await;
    store.close().await;
    let rows = result?;

    write_csv_file(&cli.output, &projection, &rows)?;
    info!(output = %cli.output.display(), rows = rows.len(), "Query complete");

    let format = OutputFormat::resolve(cli.format);
    println!("\n{}\n", "FIDE Records:".bold());
    print!("{}", format.renderer().render(&projection.header(), &rows));
    println!(
        "{} Output written to: {}",
        "✓".green(),
        cli.output.display().to_string().cyan()
    );

    Ok(rows.len())
}
