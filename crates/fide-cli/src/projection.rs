//! Projection query engine
//!
//! Requested field names come from the command line. They are resolved to the
//! closed [`Field`] whitelist before any lookup is issued, so a bad name never
//! reaches the store and the store only ever sees static column names.

use crate::error::{CliError, Result};
use fide_common::store::RecordLookup;
use fide_common::types::ProjectedRow;
use fide_common::{Field, FideError};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// A validated, ordered field list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<Field>,
}

impl Projection {
    /// Resolve every requested name against the whitelist
    ///
    /// Blank names (from `"id, name,"` style input) are skipped. The first
    /// unknown name fails the whole projection.
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let fields = names
            .iter()
            .map(|name| name.as_ref().trim())
            .filter(|name| !name.is_empty())
            .map(str::parse::<Field>)
            .collect::<std::result::Result<Vec<_>, FideError>>()?;

        if fields.is_empty() {
            return Err(FideError::EmptyProjection.into());
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Column names in requested order
    pub fn header(&self) -> Vec<&'static str> {
        self.fields.iter().map(|field| field.column()).collect()
    }

    /// Run the keyed lookup
    ///
    /// An empty key set is answered without touching the store.
    pub async fn execute(
        &self,
        lookup: &dyn RecordLookup,
        keys: &[String],
    ) -> Result<Vec<ProjectedRow>> {
        if keys.is_empty() {
            debug!("Empty key set, skipping lookup");
            return Ok(Vec::new());
        }

        let rows = lookup.query_by_ids(keys, &self.fields).await?;
        info!(keys = keys.len(), rows = rows.len(), "Lookup complete");
        Ok(rows)
    }
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fields: Field::DEFAULT_PROJECTION.to_vec(),
        }
    }
}

/// Write a header row plus one row per record
///
/// NULL values become empty cells.
pub fn write_csv<W: Write>(writer: W, projection: &Projection, rows: &[ProjectedRow]) -> csv::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(projection.header())?;
    for row in rows {
        csv_writer.write_record(row.iter().map(|value| value.to_csv_cell()))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// [`write_csv`] into a file, replacing it
pub fn write_csv_file(path: &Path, projection: &Projection, rows: &[ProjectedRow]) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| CliError::output(path, e))?;
    write_csv(file, projection, rows).map_err(|e| CliError::output(path, e))?;
    debug!(path = %path.display(), rows = rows.len(), "Wrote CSV output");
    Ok(())
}
