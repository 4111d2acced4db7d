//! crates/tally_io/src/hasher.rs
//!
//! SHA-256 digests over canonical bytes.
//! - `sha256_hex` hashes raw bytes (lowercase hex).
//! - `result_digest` hashes the canonical, LF-terminated JSON of a
//!   `ProcessedResult` and prefixes it with `RES:`. Two runs over the same
//!   snapshot produce the same digest.

#![forbid(unsafe_code)]

use serde::Serialize;
use sha2::{Digest, Sha256};

use tally_core::ProcessedResult;

use crate::canonical_json::to_canonical_bytes;
use crate::IoError;

pub const RESULT_PREFIX: &str = "RES:";

/// SHA-256 over raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// SHA-256 over the canonical bytes of any serializable value.
pub fn sha256_canonical<T: Serialize>(value: &T) -> Result<String, IoError> {
    Ok(sha256_hex(&to_canonical_bytes(value)?))
}

/// `RES:<hex>` for a processed result.
pub fn result_digest(result: &ProcessedResult) -> Result<String, IoError> {
    let hex = sha256_canonical(result)?;
    Ok(format!("{RESULT_PREFIX}{hex}"))
}

/// True for `RES:` followed by 64 lowercase hex digits.
pub fn is_result_digest(s: &str) -> bool {
    s.strip_prefix(RESULT_PREFIX)
        .is_some_and(|h| h.len() == 64 && h.bytes().all(|c| matches!(c, b'0'..=b'9' | b'a'..=b'f')))
}
