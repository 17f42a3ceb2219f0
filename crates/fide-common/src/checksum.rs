//! Content digests for change detection
//!
//! Digests are SHA-256, computed over fixed-size chunks so that a feed is
//! never loaded wholesale into memory.

use crate::error::Result;
use sha2::{Digest, Sha256};
use std::io::Read;
use std::path::Path;

/// Chunk size used when streaming a file through the hasher
pub const CHUNK_SIZE: usize = 8192;

/// Compute the hex SHA-256 digest of a file
pub fn compute_file_checksum(path: impl AsRef<Path>) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    compute_checksum(&mut file)
}

/// Compute the hex SHA-256 digest of any readable source
pub fn compute_checksum<R: Read>(reader: &mut R) -> Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; CHUNK_SIZE];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_compute_checksum_sha256() {
        let mut cursor = Cursor::new(b"hello world");
        let checksum = compute_checksum(&mut cursor).unwrap();
        assert_eq!(checksum, "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9");
    }

    #[test]
    fn test_compute_checksum_empty() {
        let mut cursor = Cursor::new(b"");
        let checksum = compute_checksum(&mut cursor).unwrap();
        assert_eq!(checksum, "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855");
    }

    #[test]
    fn test_file_checksum_spans_multiple_chunks() {
        let mut temp_file = NamedTempFile::new().unwrap();
        let data = vec![7u8; CHUNK_SIZE * 3 + 17];
        temp_file.write_all(&data).unwrap();
        temp_file.flush().unwrap();

        let from_file = compute_file_checksum(temp_file.path()).unwrap();
        let from_memory = compute_checksum(&mut Cursor::new(&data)).unwrap();

        assert_eq!(from_file.len(), 64);
        assert_eq!(from_file, from_memory);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = compute_file_checksum("/definitely/not/here.zip");
        assert!(matches!(result, Err(crate::FideError::Io(_))));
    }
}
