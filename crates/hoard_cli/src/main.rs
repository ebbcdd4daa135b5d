// crates/hoard_cli/src/main.rs
//
// hoard: load inputs → pipeline → canonical artifacts → numbered pick list.
//
// Exit codes:
//   0 ok
//   2 validation / usage
//   3 allocation outcome the user fixes (empty selection, nothing affordable)
//   4 I/O
//   5 internal / precondition

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    pub const VALIDATION: u8 = 2;
    pub const RECOVERABLE: u8 = 3;
    pub const IO: u8 = 4;
    pub const INTERNAL: u8 = 5;
}

use std::path::Path;
use std::process::ExitCode;

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use args::{Args, CliError};
use hoard_algo::scheme_from_config;
use hoard_core::{Params, Preset};
use hoard_io::canonical_json::write_canonical;
use hoard_io::loader;
use hoard_io::manifest::ManifestError;
use hoard_io::IoError;
use hoard_pipeline::{
    load_ctx_from_manifest, run_with_ctx, validate, EngineMeta, PipelineCtx, PipelineError, PipelineOutputs,
    ResultDoc,
};

/// CLI error buckets, one per exit code.
#[derive(Debug)]
enum MainError {
    Validation(String),
    Recoverable(String),
    Io(String),
    Internal(String),
}

impl MainError {
    fn code(&self) -> u8 {
        match self {
            MainError::Validation(_) => exitcodes::VALIDATION,
            MainError::Recoverable(_) => exitcodes::RECOVERABLE,
            MainError::Io(_) => exitcodes::IO,
            MainError::Internal(_) => exitcodes::INTERNAL,
        }
    }

    fn message(&self) -> &str {
        match self {
            MainError::Validation(m) | MainError::Recoverable(m) | MainError::Io(m) | MainError::Internal(m) => m,
        }
    }
}

impl From<CliError> for MainError {
    fn from(e: CliError) -> Self {
        MainError::Validation(e.to_string())
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(a) => a,
        Err(e) => {
            // --help / --version render through the error path with exit 0.
            let code = if e.use_stderr() { exitcodes::VALIDATION } else { exitcodes::OK };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };

    init_tracing(args.quiet);

    match run(&args) {
        Ok(()) => ExitCode::from(exitcodes::OK),
        Err(e) => {
            eprintln!("hoard: error: {}", e.message());
            ExitCode::from(e.code())
        }
    }
}

fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "hoard=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run(args: &Args) -> Result<(), MainError> {
    if args.list_presets {
        print_presets();
        return Ok(());
    }
    args.check()?;

    let ctx = load_ctx(args)?;

    if args.validate_only {
        return validate_only(&ctx);
    }

    let outs = run_with_ctx(ctx).map_err(map_pipeline_err)?;
    write_artifacts(&args.out, &outs)?;
    print_picks(&outs.result);

    info!(out = %args.out.display(), "artifacts written");
    Ok(())
}

/// Build the run context from either a manifest or explicit flags, then
/// apply params overrides from the command line.
fn load_ctx(args: &Args) -> Result<PipelineCtx, MainError> {
    let timestamp_utc = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let engine_meta = EngineMeta::default();

    let mut ctx = if let Some(manifest) = &args.manifest {
        load_ctx_from_manifest(manifest, args.seed, engine_meta, timestamp_utc).map_err(map_pipeline_err)?
    } else {
        let catalog_path = args.catalog.as_deref().ok_or(CliError::Missing("--catalog"))?;
        let budget = args.resolve_budget()?.ok_or(CliError::Missing("budget source"))?;
        let selection = args.resolve_selection()?.ok_or(CliError::Missing("selection source"))?;
        let loaded = loader::load_catalog(catalog_path).map_err(map_io_err)?;
        PipelineCtx {
            catalog: loaded.catalog,
            catalog_sha256: loaded.sha256,
            selection,
            preset: args.preset,
            budget,
            params: Params { seed: args.seed, ..Params::default() },
            engine_meta,
            timestamp_utc,
        }
    };

    if let Some(w) = &args.weighting {
        ctx.params.weighting = scheme_from_config(w);
    }
    if let Some(n) = args.max_attempts {
        ctx.params.max_attempts = n;
    }
    if let Some(n) = args.generate_cap {
        ctx.params.generate_cap = n;
    }
    Ok(ctx)
}

fn validate_only(ctx: &PipelineCtx) -> Result<(), MainError> {
    let report = validate::validate(&ctx.catalog, &ctx.selection, ctx.budget, &ctx.params);
    for issue in &report.issues {
        match issue.severity {
            validate::Severity::Error => eprintln!("error   {}: {}", issue.code, issue.message),
            validate::Severity::Warning => eprintln!("warning {}: {}", issue.code, issue.message),
        }
    }
    if !report.pass {
        return Err(MainError::Validation(report.summary()));
    }
    info!(lots = ctx.catalog.len(), selection = %ctx.selection, budget = %ctx.budget, "validate-only: inputs OK");
    Ok(())
}

fn write_artifacts(out_dir: &Path, outs: &PipelineOutputs) -> Result<(), MainError> {
    let io = |name: &'static str| move |e: IoError| MainError::Io(format!("write {name}: {e}"));
    write_canonical(&out_dir.join("result.json"), &outs.result).map_err(io("result.json"))?;
    write_canonical(&out_dir.join("run_record.json"), &outs.run_record).map_err(io("run_record.json"))?;
    write_canonical(&out_dir.join("generate_request.json"), &outs.generate_request)
        .map_err(io("generate_request.json"))?;
    Ok(())
}

fn print_picks(result: &ResultDoc) {
    for row in &result.picks {
        let item = if row.item.is_empty() { format!("{}[{}]", row.category, row.index) } else { row.item.clone() };
        println!("{:>3}. [{}] {}  {}  (left {})", row.n, row.category, item, row.cost, row.left);
    }
    println!(
        "spent {} of {}, left {} ({}, {} attempts)",
        result.spent, result.budget, result.left, result.stop_reason, result.attempts
    );
}

fn print_presets() {
    for p in Preset::ALL {
        match p.note() {
            Some(note) => println!("{:<20} {:<10} {}", p.name(), p.codes(), note),
            None => println!("{:<20} {}", p.name(), p.codes()),
        }
    }
}

// ----- error mapping -----

fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Path(m) => MainError::Io(format!("path: {m}")),
        IoError::Limit(m) => MainError::Io(format!("limit: {m}")),
        IoError::Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        IoError::Manifest(m) => MainError::Validation(format!("manifest: {m}")),
        IoError::Hash(m) => MainError::Validation(format!("hash: {m}")),
        IoError::Invalid(m) => MainError::Validation(m),
    }
}

fn map_manifest_err(e: ManifestError) -> MainError {
    match e {
        ManifestError::Io(..) | ManifestError::NotAFile(..) => MainError::Io(e.to_string()),
        other => MainError::Validation(other.to_string()),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    if e.is_user_recoverable() {
        warn!("{e}");
        return MainError::Recoverable(e.to_string());
    }
    match e {
        PipelineError::Io(io) => map_io_err(io),
        PipelineError::Manifest(m) => map_manifest_err(m),
        PipelineError::Validate(m) => MainError::Validation(m),
        PipelineError::Core(c) => MainError::Validation(c.to_string()),
        PipelineError::Allocate(a) => MainError::Internal(a.to_string()),
        PipelineError::Build(m) => MainError::Internal(m),
    }
}
