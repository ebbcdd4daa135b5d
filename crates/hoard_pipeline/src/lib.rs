//! hoard_pipeline: one hoard run, end to end:
//! VALIDATE → ALLOCATE → BUILD_RESULT → BUILD_RUN_RECORD → GENERATE_REQUEST.
//!
//! The pipeline owns no I/O beyond the optional manifest loader entry point;
//! artifact writing is left to the caller.

#![forbid(unsafe_code)]

pub mod allocate;
pub mod build_result;
pub mod build_run_record;
pub mod validate;

use std::path::Path;

use hoard_algo::{reset_all_counts, AllocError, Allocation};
use hoard_core::{Catalog, CoreError, Gold, HoardRng, Params, Preset, SelectionSet};
use hoard_io::{
    loader,
    manifest::{self, ManifestError},
    request::{build_generate_request, GenerateRequest},
    IoError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub use build_result::{CategoryTotal, PickRow, ResultDoc};
pub use build_run_record::{RngEcho, RunInputs, RunOutputs, RunRecordDoc};
pub use validate::{Severity, ValidationIssue, ValidationReport};

// ----- Engine identity -----

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMeta {
    pub vendor: String,
    pub name: String,
    pub version: String,
    pub build: String,
}

impl Default for EngineMeta {
    fn default() -> Self {
        let (vendor, name, version, build) = engine_identifiers();
        Self {
            vendor: vendor.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            build: build.to_string(),
        }
    }
}

/// Compile-time engine identifiers, overridable through `HOARD_ENGINE_*`.
pub fn engine_identifiers() -> (&'static str, &'static str, &'static str, &'static str) {
    (
        option_env!("HOARD_ENGINE_VENDOR").unwrap_or("hoard"),
        option_env!("HOARD_ENGINE_NAME").unwrap_or(env!("CARGO_PKG_NAME")),
        option_env!("HOARD_ENGINE_VERSION").unwrap_or(env!("CARGO_PKG_VERSION")),
        option_env!("HOARD_ENGINE_BUILD").unwrap_or("dev"),
    )
}

// ----- Context / outputs -----

/// Everything one run needs, already loaded.
#[derive(Debug, Clone)]
pub struct PipelineCtx {
    pub catalog: Catalog,
    pub catalog_sha256: String,
    pub selection: SelectionSet,
    pub preset: Option<Preset>,
    pub budget: Gold,
    pub params: Params,
    pub engine_meta: EngineMeta,
    /// RFC3339 UTC; normalized to whole seconds in the run id.
    pub timestamp_utc: String,
}

#[derive(Debug, Clone)]
pub struct PipelineOutputs {
    pub result: ResultDoc,
    pub run_record: RunRecordDoc,
    pub generate_request: GenerateRequest,
    /// Catalog with counts bumped by this run.
    pub catalog: Catalog,
    pub allocation: Allocation,
    pub report: ValidationReport,
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("io: {0}")]
    Io(#[from] IoError),
    #[error("manifest: {0}")]
    Manifest(#[from] ManifestError),
    #[error("validation failed: {0}")]
    Validate(String),
    #[error(transparent)]
    Allocate(#[from] AllocError),
    #[error("core: {0}")]
    Core(#[from] CoreError),
    #[error("build: {0}")]
    Build(String),
}

impl PipelineError {
    /// Empty selection or nothing affordable.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(self, PipelineError::Allocate(e) if e.is_user_recoverable())
    }
}

// ----- Orchestration -----

/// Run the pipeline over an already-loaded context.
pub fn run_with_ctx(ctx: PipelineCtx) -> Result<PipelineOutputs, PipelineError> {
    let PipelineCtx {
        mut catalog,
        catalog_sha256,
        selection,
        preset,
        budget,
        params,
        engine_meta,
        timestamp_utc,
    } = ctx;

    // 1) VALIDATE
    let report = validate::validate(&catalog, &selection, budget, &params);
    for issue in report.warnings() {
        warn!(code = issue.code, "{}", issue.message);
    }
    if !report.pass {
        return Err(PipelineError::Validate(report.summary()));
    }

    // 2) ALLOCATE over a zeroed catalog
    let counts_reset = reset_all_counts(&mut catalog);
    if counts_reset > Gold::ZERO {
        info!(reset = %counts_reset, "cleared counts carried by the catalog");
    }
    let mut rng = match params.seed {
        Some(seed) => HoardRng::from_seed_u64(seed),
        None => HoardRng::from_entropy(),
    };
    let allocation = allocate::allocate_stage(&mut catalog, &selection, budget, &params, &mut rng)?;

    // 3) BUILD_RESULT
    let result = build_result::build_result(&allocation, &catalog)?;

    // 4) GENERATE_REQUEST
    let generate_request = build_generate_request(&catalog, params.generate_cap);

    // 5) BUILD_RUN_RECORD
    let inputs = RunInputs { catalog_sha256, selection, preset, budget, counts_reset };
    let run_record = build_run_record::build_run_record(
        &timestamp_utc,
        &engine_meta,
        inputs,
        params,
        &rng,
        &result,
        &generate_request,
    )?;

    info!(
        result_id = %result.id,
        run_id = %run_record.id,
        picks = result.picks.len(),
        spent = %result.spent,
        "run complete"
    );

    Ok(PipelineOutputs { result, run_record, generate_request, catalog, allocation, report })
}

/// Load a manifest, its catalog, check the optional digest, and run.
///
/// `seed_override` wins over the manifest's `params.seed`.
pub fn run_from_manifest_path(
    manifest_path: &Path,
    seed_override: Option<u64>,
    engine_meta: EngineMeta,
    timestamp_utc: String,
) -> Result<PipelineOutputs, PipelineError> {
    let ctx = load_ctx_from_manifest(manifest_path, seed_override, engine_meta, timestamp_utc)?;
    run_with_ctx(ctx)
}

/// Manifest → context, without running anything.
pub fn load_ctx_from_manifest(
    manifest_path: &Path,
    seed_override: Option<u64>,
    engine_meta: EngineMeta,
    timestamp_utc: String,
) -> Result<PipelineCtx, PipelineError> {
    let resolved = manifest::load_and_resolve_manifest(manifest_path)?;
    let loaded = loader::load_catalog(&resolved.catalog_path)?;
    manifest::verify_catalog_digest(&resolved, &loaded.sha256)?;

    let mut params = resolved.params;
    if seed_override.is_some() {
        params.seed = seed_override;
    }

    Ok(PipelineCtx {
        catalog: loaded.catalog,
        catalog_sha256: loaded.sha256,
        selection: resolved.selection,
        preset: resolved.preset,
        budget: resolved.budget,
        params,
        engine_meta,
        timestamp_utc,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoard_core::Category;
    use std::fs;

    const TS: &str = "2025-08-12T10:00:00Z";

    fn ctx(costs: &[u64], budget_gp: u64, seed: u64) -> PipelineCtx {
        let mut catalog = Catalog::new();
        catalog.insert_costs(Category::A, costs.iter().map(|&g| Gold::from_gp(g).unwrap()));
        PipelineCtx {
            catalog,
            catalog_sha256: "0".repeat(64),
            selection: "a".parse().unwrap(),
            preset: None,
            budget: Gold::from_gp(budget_gp).unwrap(),
            params: Params { seed: Some(seed), ..Params::default() },
            engine_meta: EngineMeta::default(),
            timestamp_utc: TS.to_string(),
        }
    }

    #[test]
    fn full_run_is_reproducible_with_a_seed() {
        let a = run_with_ctx(ctx(&[10, 20, 30, 40], 500, 7)).unwrap();
        let b = run_with_ctx(ctx(&[10, 20, 30, 40], 500, 7)).unwrap();
        assert_eq!(a.result.id, b.result.id);
        assert_eq!(a.run_record.id, b.run_record.id);
        assert_eq!(a.allocation, b.allocation);
        assert!(a.result.id.starts_with("RES:"));
        assert!(a.run_record.id.starts_with("RUN:2025-08-12T10:00:00Z:"));
        assert_eq!(a.run_record.outputs.result_id, a.result.id);
        assert_eq!(a.run_record.rng.seed, 7);
    }

    #[test]
    fn request_reflects_counts() {
        let out = run_with_ctx(ctx(&[10, 10, 10], 25, 1)).unwrap();
        assert_eq!(out.result.picks.len(), 2);
        assert_eq!(out.generate_request.total(), 2);
    }

    #[test]
    fn counts_from_the_catalog_are_cleared_first() {
        let mut c = ctx(&[10, 10, 10], 25, 1);
        for lot in c.catalog.iter_mut().filter(|l| l.index == 2) {
            lot.count = 5;
        }
        let out = run_with_ctx(c).unwrap();
        assert_eq!(out.result.picks.len(), 2);
        assert_eq!(out.generate_request.total(), 2);
        assert_eq!(out.run_record.inputs.counts_reset, Gold::from_gp(50).unwrap());
        assert_eq!(out.catalog.iter().map(|l| u64::from(l.count)).sum::<u64>(), 2);
    }

    #[test]
    fn empty_selection_is_recoverable() {
        let mut c = ctx(&[10], 100, 1);
        c.selection = SelectionSet::new();
        let err = run_with_ctx(c).unwrap_err();
        assert!(err.is_user_recoverable());
    }

    #[test]
    fn out_of_domain_params_fail_validation() {
        let mut c = ctx(&[10], 100, 1);
        c.params.max_attempts = 0;
        assert!(matches!(run_with_ctx(c), Err(PipelineError::Validate(_))));
    }

    #[test]
    fn unseeded_run_records_its_seed() {
        let mut c = ctx(&[1, 2, 3], 50, 0);
        c.params.seed = None;
        let out = run_with_ctx(c).unwrap();
        let replay = run_with_ctx(ctx(&[1, 2, 3], 50, out.run_record.rng.seed)).unwrap();
        assert_eq!(out.allocation, replay.allocation);
        assert_eq!(out.run_record.params.seed, Some(out.run_record.rng.seed));
    }

    #[test]
    fn manifest_entry_point_and_seed_override() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("catalog.json"),
            r#"{"a":[{"cost":10,"item":"a1"},{"cost":20,"item":"a2"}],"d":[{"cost":15,"item":"d1"}]}"#,
        )
        .unwrap();
        let m = dir.path().join("run.json");
        fs::write(&m, r#"{"catalog_path":"catalog.json","budget":"100 gp","types":"ad","params":{"seed":3}}"#)
            .unwrap();

        let a = run_from_manifest_path(&m, None, EngineMeta::default(), TS.into()).unwrap();
        assert_eq!(a.run_record.rng.seed, 3);
        let b = run_from_manifest_path(&m, Some(99), EngineMeta::default(), TS.into()).unwrap();
        assert_eq!(b.run_record.rng.seed, 99);
        assert_eq!(a.run_record.inputs.catalog_sha256, b.run_record.inputs.catalog_sha256);
    }

    #[test]
    fn manifest_digest_mismatch_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("c.json"), r#"{"a":[{"cost":1}]}"#).unwrap();
        let m = dir.path().join("m.json");
        let body = format!(
            r#"{{"catalog_path":"c.json","budget":5,"types":"a","catalog_sha256":"{}"}}"#,
            "f".repeat(64)
        );
        fs::write(&m, body).unwrap();
        let err = run_from_manifest_path(&m, None, EngineMeta::default(), TS.into()).unwrap_err();
        assert!(matches!(err, PipelineError::Manifest(ManifestError::DigestMismatch { .. })));
    }
}
