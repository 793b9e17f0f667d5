use crate::aggregate::reused_labels;
use crate::classify::wrong_ids_for_label;
use crate::config::ReconConfig;
use crate::crossref::get_b_numbers;
use crate::error::ReconError;
use crate::evidence::compute_summary;
use crate::index::SearchIndex;
use crate::model::{DiscrepantPair, ReconMeta, ReconResult, VarfieldSearch};
use crate::report;
use crate::resolve::authoritative_names;

/// The three indices a run reads from.
#[derive(Clone, Copy)]
pub struct Indices<'a> {
    pub catalogue: &'a dyn SearchIndex,
    pub registry: &'a dyn SearchIndex,
    pub varfields: &'a dyn SearchIndex,
}

/// Run reconciliation per config. Returns report rows + summary.
///
/// Each stage finishes before the next starts. Any failure aborts the run;
/// there is no partial result.
pub fn run(config: &ReconConfig, indices: Indices<'_>) -> Result<ReconResult, ReconError> {
    let run_at = chrono::Utc::now().to_rfc3339();

    // Labels shared by several identifiers
    let labels = reused_labels(indices.catalogue, config)?;

    // Canonical name of every identifier, per group
    let resolved = authoritative_names(indices.registry, config, &labels.groups)?;

    // Identifiers grouped under a label that is not theirs
    let wrong: Vec<Vec<DiscrepantPair>> = resolved
        .iter()
        .map(|group| wrong_ids_for_label(&group.label, &group.names))
        .collect();
    let discrepant: Vec<usize> = wrong.iter().map(Vec::len).collect();
    tracing::info!(
        identifiers = discrepant.iter().sum::<usize>(),
        labels = discrepant.iter().filter(|n| **n > 0).count(),
        "found discrepant identifiers"
    );

    // Records still carrying those identifiers
    let mut searches: Vec<VarfieldSearch> = Vec::with_capacity(wrong.len());
    for pairs in &wrong {
        searches.push(get_b_numbers(indices.varfields, config, pairs)?);
    }

    let min = config.report.min_identifier_subfields;
    let summary = compute_summary(&labels, &resolved, &discrepant, &searches, min);
    let rows = report::assemble(searches.into_iter().map(|s| s.hits).collect(), min)?;
    tracing::info!(rows = rows.len(), hits = summary.varfield_hits, "assembled report");

    Ok(ReconResult {
        meta: ReconMeta {
            config_name: config.name.clone(),
            authority: config.authority.scheme.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at,
        },
        summary,
        rows,
    })
}
