// crates/hoard_pipeline/src/build_run_record.rs
//
// run_record.json: provenance for one run.
//
// - id = "RUN:<ts>:<sha256>" over the canonical record without `id`.
// - The seed is always recorded, including one drawn from OS entropy, so any
//   run can be replayed with `--seed`.
// - `outputs` pins the result by id and by the digest of its canonical bytes.

use hoard_core::{Gold, HoardRng, Params, Preset, SelectionSet};
use hoard_io::hasher::{normalize_rfc3339_utc_seconds, run_id_from_canonical, sha256_canonical};
use hoard_io::request::GenerateRequest;
use serde::{Deserialize, Serialize};

use crate::{EngineMeta, PipelineError, ResultDoc};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunInputs {
    pub catalog_sha256: String,
    pub selection: SelectionSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
    pub budget: Gold,
    /// Allocated total the catalog carried before this run's counts were zeroed.
    #[serde(default)]
    pub counts_reset: Gold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngEcho {
    pub seed: u64,
    /// 64-bit words drawn from the ChaCha20 stream.
    pub words_consumed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutputs {
    pub result_id: String,
    pub result_sha256: String,
    pub generate_request_sha256: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecordDoc {
    pub id: String,
    pub timestamp_utc: String,
    pub engine: EngineMeta,
    pub inputs: RunInputs,
    /// Params as used, with `seed` filled in.
    pub params: Params,
    pub rng: RngEcho,
    pub outputs: RunOutputs,
}

#[derive(Serialize)]
struct RunRecordNoId<'a> {
    timestamp_utc: &'a str,
    engine: &'a EngineMeta,
    inputs: &'a RunInputs,
    params: &'a Params,
    rng: &'a RngEcho,
    outputs: &'a RunOutputs,
}

pub fn build_run_record(
    timestamp_utc: &str,
    engine: &EngineMeta,
    inputs: RunInputs,
    mut params: Params,
    rng: &HoardRng,
    result: &ResultDoc,
    request: &GenerateRequest,
) -> Result<RunRecordDoc, PipelineError> {
    let timestamp_utc = normalize_rfc3339_utc_seconds(timestamp_utc)?;
    params.seed = Some(rng.seed());

    let rng = RngEcho {
        seed: rng.seed(),
        words_consumed: u64::try_from(rng.words_consumed()).unwrap_or(u64::MAX),
    };
    let outputs = RunOutputs {
        result_id: result.id.clone(),
        result_sha256: sha256_canonical(result)?,
        generate_request_sha256: sha256_canonical(request)?,
    };

    let id = run_id_from_canonical(
        &timestamp_utc,
        &RunRecordNoId {
            timestamp_utc: &timestamp_utc,
            engine,
            inputs: &inputs,
            params: &params,
            rng: &rng,
            outputs: &outputs,
        },
    )?;

    Ok(RunRecordDoc { id, timestamp_utc, engine: engine.clone(), inputs, params, rng, outputs })
}
