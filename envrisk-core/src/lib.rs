//! envrisk core library - environmental risk scoring for assessed sites

// Global invariants enforced in this crate:
// - Scoring is strictly per-site
// - No global mutable state
// - Missing measurements are never errors and never zero
// - Identical input yields identical scores, in input order

pub mod config;
pub mod factors;
pub mod ingest;
pub mod plan;
pub mod recommend;
pub mod record;
pub mod report;
pub mod risk;
pub mod scoring;
pub mod weather;

pub use config::ResolvedConfig;
pub use ingest::{load_records, IngestError};
pub use plan::{plan_actions, PlannedAction};
pub use record::SiteRecord;
pub use report::{render_json, render_text, AssessedSite};
pub use risk::RiskLevel;
pub use scoring::{score, CategoryScores, RiskScoringEngine, SiteRiskResult};

use std::path::Path;

/// Options for a full assessment run
#[derive(Debug, Clone, Copy, Default)]
pub struct AssessmentOptions {
    pub recommendations: bool,
    /// Sort by global score instead of input order
    pub sort: bool,
    pub top_n: Option<usize>,
}

/// Load, score and (optionally) recommend for every site in a file
pub fn assess_file(
    path: &Path,
    options: AssessmentOptions,
    resolved_config: &ResolvedConfig,
) -> anyhow::Result<Vec<AssessedSite>> {
    let records = load_records(path)?;
    Ok(assess_records(&records, options, resolved_config))
}

/// Score records and shape them for output
pub fn assess_records(
    records: &[SiteRecord],
    options: AssessmentOptions,
    resolved_config: &ResolvedConfig,
) -> Vec<AssessedSite> {
    let results = resolved_config.engine().score(records);
    let recommendations = options
        .recommendations
        .then(|| recommend::recommend_all(records, &results));

    let sites = report::assemble(results, recommendations);
    let sites = if options.sort {
        report::sort_sites(sites)
    } else {
        sites
    };

    match options.top_n {
        Some(top_n) => sites.into_iter().take(top_n).collect(),
        None => sites,
    }
}
