// crates/hoard_cli/src/args.rs
//
// Offline CLI argument surface.
//
// - Exactly one of: --manifest  XOR  (--catalog + one budget source + one selection source)
// - Budget sources: --budget | --encounter-apl [--rate] [--magnitude] | --npc-level [--heroic]
// - Selection sources: --types | --preset
// - No networked paths (reject any scheme:// like http/https/file)
// - Seed is a u64 in decimal or 0x-hex (up to 16 nybbles)

use std::path::{Path, PathBuf};

use clap::{ArgGroup, Parser};
use hoard_algo::{budget_encounter, budget_npc_gear, BudgetError};
use hoard_core::variables::{Magnitude, Rate};
use hoard_core::{Gold, Preset, SelectionSet};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "hoard",
    version,
    disable_help_subcommand = true,
    about = "Offline treasure hoard allocator: spend a budget on weighted-random treasure lots",
    group(ArgGroup::new("budget_source").args(["budget", "encounter_apl", "npc_level"])),
    group(ArgGroup::new("selection_source").args(["types", "preset"]))
)]
pub struct Args {
    // --- Mode selection ---
    /// Run manifest JSON (mutually exclusive with the explicit input flags).
    #[arg(
        long,
        conflicts_with_all = ["catalog", "budget", "encounter_apl", "npc_level", "types", "preset"]
    )]
    pub manifest: Option<PathBuf>,

    // --- Explicit mode ---
    /// Catalog JSON path.
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Budget as a price string, e.g. "1,500 gp" or "250gp 5sp".
    #[arg(long)]
    pub budget: Option<Gold>,

    /// Average party level for the per-encounter treasure table (1..=20).
    #[arg(long)]
    pub encounter_apl: Option<u32>,
    /// Advancement speed for --encounter-apl [default: medium].
    #[arg(long, requires = "encounter_apl")]
    pub rate: Option<Rate>,
    /// Treasure size for --encounter-apl [default: standard].
    #[arg(long, requires = "encounter_apl")]
    pub magnitude: Option<Magnitude>,

    /// NPC level for the NPC gear table (1..=20).
    #[arg(long)]
    pub npc_level: Option<u32>,
    /// Use the heroic NPC column (one level up).
    #[arg(long, requires = "npc_level")]
    pub heroic: bool,

    /// Category codes to draw from, e.g. "abd".
    #[arg(long)]
    pub types: Option<SelectionSet>,
    /// Creature preset selecting categories, e.g. "dragon".
    #[arg(long)]
    pub preset: Option<Preset>,

    // --- Params overrides ---
    /// Weighting scheme; unknown names fall back to `cost` with a warning.
    #[arg(long)]
    pub weighting: Option<String>,
    /// Selection-loop iteration ceiling.
    #[arg(long)]
    pub max_attempts: Option<u32>,
    /// Per-category item cap in generate_request.json.
    #[arg(long)]
    pub generate_cap: Option<u32>,
    /// RNG seed: decimal u64 or 0x-hex (≤16 hex digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,

    // --- Output & control ---
    /// Output directory (default: current directory).
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Load and validate inputs only; do not allocate or write artifacts.
    #[arg(long)]
    pub validate_only: bool,

    /// Only warnings and errors on stderr.
    #[arg(long)]
    pub quiet: bool,

    /// Print the creature presets and exit.
    #[arg(long)]
    pub list_presets: bool,
}

#[derive(Debug)]
pub enum CliError {
    BadCombo(&'static str),
    Missing(&'static str),
    NonLocalPath(String),
    Budget(BudgetError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            BadCombo(s) => write!(f, "invalid flag combination: {s}"),
            Missing(s) => write!(f, "missing required flag: {s}"),
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            Budget(e) => write!(f, "budget: {e}"),
        }
    }
}
impl std::error::Error for CliError {}

/// Decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if hoard_io::looks_like_url_strict(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

impl Args {
    /// Mode and path checks clap cannot express. `--list-presets` skips them.
    pub fn check(&self) -> Result<(), CliError> {
        if self.list_presets {
            return Ok(());
        }
        for p in [self.manifest.as_deref(), self.catalog.as_deref(), Some(self.out.as_path())]
            .into_iter()
            .flatten()
        {
            ensure_local_path(p)?;
        }
        // Sub-flags are only read alongside their budget source.
        if self.encounter_apl.is_none() && (self.rate.is_some() || self.magnitude.is_some()) {
            return Err(CliError::BadCombo("--rate and --magnitude require --encounter-apl"));
        }
        if self.npc_level.is_none() && self.heroic {
            return Err(CliError::BadCombo("--heroic requires --npc-level"));
        }
        if self.manifest.is_some() {
            return Ok(());
        }
        if self.catalog.is_none() {
            return Err(CliError::Missing("--manifest or --catalog"));
        }
        if self.budget.is_none() && self.encounter_apl.is_none() && self.npc_level.is_none() {
            return Err(CliError::Missing("--budget, --encounter-apl or --npc-level"));
        }
        if self.types.is_none() && self.preset.is_none() {
            return Err(CliError::Missing("--types or --preset"));
        }
        Ok(())
    }

    /// Budget for explicit mode; `None` in manifest mode.
    pub fn resolve_budget(&self) -> Result<Option<Gold>, CliError> {
        if let Some(b) = self.budget {
            return Ok(Some(b));
        }
        if let Some(apl) = self.encounter_apl {
            return budget_encounter(apl, self.rate.unwrap_or_default(), self.magnitude.unwrap_or_default())
                .map(Some)
                .map_err(CliError::Budget);
        }
        if let Some(level) = self.npc_level {
            return budget_npc_gear(level, self.heroic).map(Some).map_err(CliError::Budget);
        }
        Ok(None)
    }

    /// Selection for explicit mode; `None` in manifest mode.
    pub fn resolve_selection(&self) -> Result<Option<SelectionSet>, CliError> {
        match (&self.types, self.preset) {
            (Some(t), None) => Ok(Some(t.clone())),
            (None, Some(p)) => Ok(Some(p.types())),
            (None, None) => Ok(None),
            (Some(_), Some(_)) => Err(CliError::BadCombo("--types and --preset are mutually exclusive")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("hoard").chain(argv.iter().copied()))
    }

    #[test]
    fn seeds_decimal_and_hex() {
        assert_eq!(parse_seed("42").unwrap(), 42);
        assert_eq!(parse_seed("0xFF").unwrap(), 255);
        assert_eq!(parse_seed("0xffffffffffffffff").unwrap(), u64::MAX);
        assert!(parse_seed("0x").is_err());
        assert!(parse_seed("0x1ffffffffffffffff").is_err());
        assert!(parse_seed("-1").is_err());
    }

    #[test]
    fn explicit_mode_with_price_budget() {
        let a = parse(&["--catalog", "c.json", "--budget", "1,500 gp", "--types", "dba"]).unwrap();
        a.check().unwrap();
        assert_eq!(a.resolve_budget().unwrap(), Gold::from_gp(1_500));
        assert_eq!(a.resolve_selection().unwrap().unwrap().codes(), "abd");
    }

    #[test]
    fn encounter_and_npc_budgets() {
        let a = parse(&["--catalog", "c.json", "--encounter-apl", "3", "--rate", "fast", "--preset", "dragon"])
            .unwrap();
        assert_eq!(
            a.resolve_budget().unwrap(),
            Some(budget_encounter(3, Rate::Fast, Magnitude::Standard).unwrap())
        );
        assert_eq!(a.resolve_selection().unwrap().unwrap(), Preset::Dragon.types());

        let n = parse(&["--catalog", "c.json", "--npc-level", "5", "--heroic", "--types", "a"]).unwrap();
        assert_eq!(n.resolve_budget().unwrap(), Some(budget_npc_gear(5, true).unwrap()));

        let bad = parse(&["--catalog", "c.json", "--npc-level", "40", "--types", "a"]).unwrap();
        assert!(matches!(bad.resolve_budget(), Err(CliError::Budget(_))));
    }

    #[test]
    fn clap_rejects_conflicting_sources() {
        assert!(parse(&["--catalog", "c.json", "--budget", "5", "--npc-level", "2", "--types", "a"]).is_err());
        assert!(parse(&["--catalog", "c.json", "--budget", "5", "--types", "a", "--preset", "fey"]).is_err());
        assert!(parse(&["--manifest", "m.json", "--catalog", "c.json"]).is_err());
        assert!(parse(&["--budget", "lots of gold"]).is_err());
    }

    #[test]
    fn sub_flags_need_their_budget_source() {
        let extras: [&[&str]; 3] = [&["--heroic"], &["--rate", "fast"], &["--magnitude", "double"]];
        for extra in extras {
            let argv: Vec<&str> =
                ["--catalog", "c.json", "--budget", "5", "--types", "a"].iter().chain(extra).copied().collect();
            let checked = parse(&argv).map(|a| a.check());
            assert!(matches!(checked, Err(_) | Ok(Err(CliError::BadCombo(_)))), "{extra:?}");
        }
        let a = parse(&["--catalog", "c.json", "--encounter-apl", "4", "--magnitude", "double", "--types", "a"])
            .unwrap();
        assert!(a.check().is_ok());
    }

    #[test]
    fn check_reports_missing_pieces_and_urls() {
        let a = parse(&["--catalog", "c.json", "--types", "a"]).unwrap();
        assert!(matches!(a.check(), Err(CliError::Missing(_))));

        let a = parse(&["--catalog", "c.json", "--budget", "5"]).unwrap();
        assert!(matches!(a.check(), Err(CliError::Missing(_))));

        let a = parse(&["--manifest", "https://example.org/m.json"]).unwrap();
        assert!(matches!(a.check(), Err(CliError::NonLocalPath(_))));

        let a = parse(&[]).unwrap();
        assert!(matches!(a.check(), Err(CliError::Missing(_))));

        assert!(parse(&["--list-presets"]).unwrap().check().is_ok());
    }
}
