//! Checkpoint integrity check against a configured SHA-256 digest.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};

use super::ModelError;

/// Fail unless the file at `path` hashes to `expected` (hex, any case).
pub fn verify(path: &Path, expected: &str) -> Result<(), ModelError> {
    let expected = normalise_hex(expected);
    let actual = sha256_hex(path)?;
    if actual == expected {
        Ok(())
    } else {
        Err(ModelError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected,
            actual,
        })
    }
}

/// SHA-256 of the file at `path` as lowercase hex.
pub fn sha256_hex(path: &Path) -> Result<String, ModelError> {
    let io_err = |source: std::io::Error| ModelError::Checkpoint {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = BufReader::new(File::open(path).map_err(io_err)?);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = reader.read(&mut buffer).map_err(io_err)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

fn normalise_hex(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}
