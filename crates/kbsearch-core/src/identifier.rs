//! Codec for the dotted record identifiers (`PRT.ORG.0000123`).

use crate::error::{Error, Result};

/// `"<prefix>.<n zero-padded to 7 digits>"`.
pub fn encode(prefix: &str, n: u64) -> String {
    format!("{prefix}.{n:07}")
}

pub fn encode_parts(header: &str, entity: &str, n: u64) -> String {
    format!("{header}.{entity}.{n:07}")
}

/// Trailing integer of an identifier.
pub fn decode(identifier: &str) -> Result<u64> {
    let segments: Vec<&str> = identifier.split('.').collect();
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
        return Err(Error::InvalidIdentifier(identifier.to_string()));
    }
    segments[segments.len() - 1]
        .parse::<u64>()
        .map_err(|_| Error::InvalidIdentifier(identifier.to_string()))
}
