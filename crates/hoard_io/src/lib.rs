//! crates/hoard_io/src/lib.rs
//! Local, offline I/O for the hoard allocator.
//!
//! - Shared error type (`IoError`) with `From` conversions used across modules.
//! - Catalog and run-manifest loading with size limits and pointer-style error locations.
//! - Canonical JSON writer and SHA-256 artifact IDs.
//! - Generation-request export (per-category `{index, count}` lists).

#![forbid(unsafe_code)]

use thiserror::Error;

/// Unified error for hoard_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync, …)
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON syntax or shape errors with a JSON Pointer to the offending value.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// Input exceeded a size limit.
    #[error("limit exceeded: {0}")]
    Limit(String),

    /// Run manifest problems (shape, offline policy, digests).
    #[error("manifest error: {0}")]
    Manifest(String),

    /// Hashing-related errors (feature disabled, digest mismatch).
    #[error("hash error: {0}")]
    Hash(String),

    /// Generic validation / invariants.
    #[error("invalid: {0}")]
    Invalid(String),
}

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        // serde_json keeps line/column, not a pointer.
        IoError::Json { pointer: "/".to_string(), msg: e.to_string() }
    }
}

impl From<manifest::ManifestError> for IoError {
    fn from(e: manifest::ManifestError) -> Self {
        IoError::Manifest(e.to_string())
    }
}

pub mod canonical_json;
#[cfg(feature = "hash")]
pub mod hasher;
pub mod loader;
pub mod manifest;
pub mod request;

/// Returns true if `s` looks like a URL (any `<scheme>://`, plus bare `http:`/`https:`).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    let s = s.trim();
    s.contains("://") || s.starts_with("http:") || s.starts_with("https:")
}
