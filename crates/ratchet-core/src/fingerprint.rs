use std::fs::File;
use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::types::HistoryError;

/// Compute the fingerprint of in-memory content.
///
/// fingerprint = hex(sha256(bytes)), 64 chars.
pub fn fingerprint_bytes(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Compute the fingerprint of a file's content.
///
/// The file is streamed through the hasher; identical bytes always produce
/// the same digest regardless of path or modification time.
pub fn fingerprint_file(path: &Path) -> Result<String, HistoryError> {
    let io_err = |source| HistoryError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher).map_err(io_err)?;
    Ok(hex::encode(hasher.finalize()))
}
