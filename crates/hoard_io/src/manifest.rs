// crates/hoard_io/src/manifest.rs
//
// Run manifest: which catalog, how much to spend, which categories, and the
// run parameters.
//
// • Offline-only: reject any path with a scheme ("://", "http:", "https:").
// • Paths resolve against the manifest's own directory.
// • Exactly one of `types` / `preset` selects categories.
// • An optional `catalog_sha256` (lowercase 64-hex) is checked against the
//   canonical digest of the loaded catalog.

use std::fs;
use std::path::{Path, PathBuf};

use hoard_core::{Gold, Params, Preset, SelectionSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::looks_like_url_strict;

/// External manifest accepted by the loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub catalog_path: String,
    /// Number of gp or a price string (`"1,500 gp"`).
    pub budget: Gold,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<SelectionSet>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
    #[serde(default)]
    pub params: Params,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_sha256: Option<String>,
}

/// Manifest with paths resolved and the selection settled.
#[derive(Debug, Clone)]
pub struct ResolvedManifest {
    pub catalog_path: PathBuf,
    pub budget: Gold,
    pub selection: SelectionSet,
    pub preset: Option<Preset>,
    pub params: Params,
    pub catalog_sha256: Option<String>,
}

/// Loader/validation errors.
#[derive(Debug)]
pub enum ManifestError {
    Empty(&'static str),
    UrlPath(&'static str, String),
    Io(&'static str, String),
    NotAFile(&'static str, String),
    Parse(String),
    /// Neither or both of `types` / `preset`.
    Selection(&'static str),
    Domain(String),
    DigestShape(&'static str, String),
    DigestMismatch { expected: String, actual: String },
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ManifestError::*;
        match self {
            Empty(k) => write!(f, "field must not be empty: {k}"),
            UrlPath(k, v) => write!(f, "path must be offline (no scheme) for {k}: {v}"),
            Io(k, v) => write!(f, "cannot access {k}: {v}"),
            NotAFile(k, v) => write!(f, "path is not a file for {k}: {v}"),
            Parse(m) => write!(f, "cannot parse manifest: {m}"),
            Selection(m) => write!(f, "{m}"),
            Domain(m) => write!(f, "parameter out of domain: {m}"),
            DigestShape(k, v) => write!(f, "invalid sha256 format for {k}: {v}"),
            DigestMismatch { expected, actual } => {
                write!(f, "catalog sha256 mismatch: expected {expected}, got {actual}")
            }
        }
    }
}

impl std::error::Error for ManifestError {}

// ---------- helpers (pure) ----------

#[inline]
fn is_lower_hex_64(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

#[inline]
fn join_under(base: &Path, rel: &str) -> PathBuf {
    let p = Path::new(rel);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}

// ---------- validation (shape, offline policy; no I/O) ----------

pub fn validate_manifest(man: &Manifest) -> Result<(), ManifestError> {
    if man.catalog_path.trim().is_empty() {
        return Err(ManifestError::Empty("catalog_path"));
    }
    if looks_like_url_strict(&man.catalog_path) {
        return Err(ManifestError::UrlPath("catalog_path", man.catalog_path.clone()));
    }
    match (&man.types, &man.preset) {
        (Some(_), Some(_)) => {
            return Err(ManifestError::Selection("`types` and `preset` are mutually exclusive"))
        }
        (None, None) => return Err(ManifestError::Selection("one of `types` or `preset` is required")),
        _ => {}
    }
    if let Some(h) = &man.catalog_sha256 {
        if !is_lower_hex_64(h) {
            return Err(ManifestError::DigestShape("catalog_sha256", h.clone()));
        }
    }
    man.params
        .validate_domains()
        .map_err(|e| ManifestError::Domain(e.to_string()))?;
    Ok(())
}

// ---------- resolution (join base + existence/type checks) ----------

/// Resolve under `base_dir` (the manifest's directory) and settle the selection.
pub fn resolve_paths(base_dir: &Path, man: &Manifest) -> Result<ResolvedManifest, ManifestError> {
    let catalog_path = join_under(base_dir, &man.catalog_path);
    must_exist_file("catalog_path", &catalog_path)?;

    let selection = match (&man.types, man.preset) {
        (Some(t), None) => t.clone(),
        (None, Some(p)) => p.types(),
        _ => return Err(ManifestError::Selection("one of `types` or `preset` is required")),
    };

    Ok(ResolvedManifest {
        catalog_path,
        budget: man.budget,
        selection,
        preset: man.preset,
        params: man.params,
        catalog_sha256: man.catalog_sha256.clone(),
    })
}

fn must_exist_file(label: &'static str, p: &Path) -> Result<(), ManifestError> {
    let md = fs::metadata(p).map_err(|e| ManifestError::Io(label, format!("{} ({e})", p.display())))?;
    if !md.is_file() {
        return Err(ManifestError::NotAFile(label, p.display().to_string()));
    }
    Ok(())
}

// ---------- entry points ----------

pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let v = crate::loader::read_json_value_with_limits(path)
        .map_err(|e| ManifestError::Io("manifest", e.to_string()))?;
    serde_json::from_value(v).map_err(|e| ManifestError::Parse(e.to_string()))
}

/// Load → validate → resolve.
pub fn load_and_resolve_manifest(manifest_path: &Path) -> Result<ResolvedManifest, ManifestError> {
    let man = load_manifest(manifest_path)?;
    validate_manifest(&man)?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    let resolved = resolve_paths(base, &man)?;
    debug!(catalog = %resolved.catalog_path.display(), selection = %resolved.selection, "manifest resolved");
    Ok(resolved)
}

/// Compare the expected catalog digest (if any) with the computed one.
pub fn verify_catalog_digest(resolved: &ResolvedManifest, actual_hex: &str) -> Result<(), ManifestError> {
    match &resolved.catalog_sha256 {
        Some(expected) if expected != actual_hex => Err(ManifestError::DigestMismatch {
            expected: expected.clone(),
            actual: actual_hex.to_string(),
        }),
        _ => Ok(()),
    }
}
