//! Snapshot fingerprinting.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 of a serializable value's JSON form.
///
/// Returns a 64-character lowercase hexadecimal string.
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    let digest = Sha256::digest(&json);
    Ok(format!("{:x}", digest))
}
