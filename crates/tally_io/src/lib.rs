//! crates/tally_io/src/lib.rs
//! Caller-side I/O for the tally engine: read proposal / ballots / params from
//! local JSON files, write canonical JSON, and derive the `RES:` digest.
//!
//! - One shared error type (`IoError`) with `From` conversions used by the modules.
//! - The engine crates never depend on this one.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for tally_io (used by loader/canonical_json/hasher).
#[derive(Debug, Error)]
pub enum IoError {
    /// Reading an input file failed.
    #[error("read error: {0}")]
    Read(String),

    /// Writing an output file failed.
    #[error("write error: {0}")]
    Write(String),

    /// JSON parse or shape errors, with the file and a line/column hint.
    #[error("json error in {path} at {pointer}: {msg}")]
    Json {
        path: String,
        pointer: String,
        msg: String,
    },

    /// Parameter file parsed but carried an invalid value.
    #[error("params error: {0}")]
    Params(String),

    /// Canonicalization or hashing failed.
    #[error("hash error: {0}")]
    Hash(String),
}

pub type IoResult<T> = Result<T, IoError>;

impl From<tally_core::ParamsError> for IoError {
    fn from(e: tally_core::ParamsError) -> Self {
        IoError::Params(e.to_string())
    }
}

pub mod canonical_json;
pub mod hasher;
pub mod loader;

pub use loader::{load_all, load_ballots, load_params, load_proposal, LoadedInputs};

pub mod prelude {
    pub use crate::{IoError, IoResult};

    pub use crate::canonical_json::{to_canonical_bytes, write_canonical_file};
    pub use crate::hasher::{result_digest, sha256_hex};
    pub use crate::loader::{load_all, LoadedInputs};
}
