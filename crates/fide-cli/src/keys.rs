// Key-list file reader

use crate::error::{CliError, Result};
use std::io::BufRead;
use std::path::Path;
use tracing::debug;

/// Read one lookup key per line
///
/// Lines are whitespace-trimmed and blank lines skipped. Duplicates are kept;
/// the store returns each matching record once regardless.
pub fn read_keys(path: &Path) -> Result<Vec<String>> {
    let unreadable = |source| CliError::KeyListUnreadable {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(unreadable)?;
    let keys = parse_keys(std::io::BufReader::new(file)).map_err(unreadable)?;

    debug!(path = %path.display(), keys = keys.len(), "Read key list");
    Ok(keys)
}

fn parse_keys<R: BufRead>(reader: R) -> std::io::Result<Vec<String>> {
    let mut keys = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let key = line.trim();
        if !key.is_empty() {
            keys.push(key.to_string());
        }
    }
    Ok(keys)
}
