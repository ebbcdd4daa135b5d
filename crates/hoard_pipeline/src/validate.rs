//! crates/hoard_pipeline/src/validate.rs
//! Pre-allocation checks over the loaded run context.
//! Deterministic; no RNG. Errors stop the run, warnings are logged.
//!
//! An empty selection and an unaffordable catalog are *warnings* here: the
//! allocator reports them as its own recoverable errors.

use hoard_core::{Catalog, Category, Gold, Params, SelectionSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Where the issue occurred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityRef {
    Root,
    Category(Category),
    Lot(Category, usize),
    Param(&'static str),
    Budget,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: &'static str,
    pub message: String,
    pub where_: EntityRef,
}

/// pass = no Error; issue order is stable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    /// `code: message` for each error, joined with `; `.
    pub fn summary(&self) -> String {
        self.errors()
            .map(|i| format!("{}: {}", i.code, i.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

pub fn validate(catalog: &Catalog, selection: &SelectionSet, budget: Gold, params: &Params) -> ValidationReport {
    let mut issues = Vec::new();

    issues.extend(check_catalog_shape(catalog));
    issues.extend(check_params(params));
    issues.extend(check_selection(catalog, selection));
    issues.extend(check_budget(catalog, selection, budget));
    issues.extend(check_counts(catalog));

    let pass = !issues.iter().any(|i| i.severity == Severity::Error);
    ValidationReport { pass, issues }
}

// ----- checks -----

fn check_catalog_shape(catalog: &Catalog) -> Vec<ValidationIssue> {
    match catalog.check_well_formed() {
        Ok(()) => Vec::new(),
        Err(m) => vec![ValidationIssue {
            severity: Severity::Error,
            code: "catalog.misplaced",
            message: format!("lot at {}[{}] does not match its slot", m.category, m.position),
            where_: EntityRef::Lot(m.category, m.position),
        }],
    }
}

fn check_params(params: &Params) -> Vec<ValidationIssue> {
    match params.validate_domains() {
        Ok(()) => Vec::new(),
        Err(e) => {
            let name = match e {
                hoard_core::CoreError::DomainOutOfRange(k) => k,
                _ => "params",
            };
            vec![ValidationIssue {
                severity: Severity::Error,
                code: "params.domain",
                message: e.to_string(),
                where_: EntityRef::Param(name),
            }]
        }
    }
}

fn check_selection(catalog: &Catalog, selection: &SelectionSet) -> Vec<ValidationIssue> {
    if selection.is_empty() {
        return vec![ValidationIssue {
            severity: Severity::Warning,
            code: "selection.empty",
            message: "no treasure category selected".into(),
            where_: EntityRef::Root,
        }];
    }
    selection
        .iter()
        .filter(|&c| catalog.table(c).is_empty())
        .map(|c| ValidationIssue {
            severity: Severity::Warning,
            code: "selection.no_table",
            message: format!("category {c} is selected but has no lots"),
            where_: EntityRef::Category(c),
        })
        .collect()
}

fn check_budget(catalog: &Catalog, selection: &SelectionSet, budget: Gold) -> Vec<ValidationIssue> {
    let mut out = Vec::new();
    if budget.is_zero() {
        out.push(ValidationIssue {
            severity: Severity::Warning,
            code: "budget.zero",
            message: "budget is zero".into(),
            where_: EntityRef::Budget,
        });
    }
    let selected = || catalog.iter().filter(|l| selection.contains(l.category));
    if !selection.is_empty() && !selected().any(|l| l.cost <= budget) {
        out.push(ValidationIssue {
            severity: Severity::Warning,
            code: "budget.unaffordable",
            message: format!("no selected lot costs {budget} or less"),
            where_: EntityRef::Budget,
        });
    }
    for l in selected().filter(|l| l.cost.is_zero()) {
        out.push(ValidationIssue {
            severity: Severity::Warning,
            code: "catalog.zero_cost",
            message: format!("{}[{}] is free; it can be picked until the attempt limit", l.category, l.index),
            where_: EntityRef::Lot(l.category, l.index),
        });
    }
    out
}

fn check_counts(catalog: &Catalog) -> Vec<ValidationIssue> {
    let counted = catalog.iter().filter(|l| l.count > 0).count();
    if counted == 0 {
        return Vec::new();
    }
    vec![ValidationIssue {
        severity: Severity::Warning,
        code: "catalog.counts_nonzero",
        message: format!("{counted} lot(s) already carry counts; they are reset before allocating"),
        where_: EntityRef::Root,
    }]
}
