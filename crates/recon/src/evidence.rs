use crate::model::{ReconSummary, ResolvedGroup, ReusedLabels, VarfieldSearch};

/// Compute summary statistics from the intermediate stage outputs.
pub fn compute_summary(
    labels: &ReusedLabels,
    resolved: &[ResolvedGroup],
    discrepant: &[usize],
    searches: &[VarfieldSearch],
    min_identifier_subfields: usize,
) -> ReconSummary {
    let mut summary = ReconSummary {
        reused_labels: labels.groups.len(),
        identifiers: labels.groups.iter().map(|g| g.identifiers.len()).sum(),
        resolved_identifiers: resolved.iter().map(|g| g.names.len()).sum(),
        labels_without_discrepancy: discrepant.iter().filter(|n| **n == 0).count(),
        discrepant_identifiers: discrepant.iter().sum(),
        truncated_aggregations: labels.truncated,
        truncated_searches: searches.iter().filter(|s| s.truncated).count(),
        ..ReconSummary::default()
    };

    for hit in searches.iter().flat_map(|s| &s.hits) {
        summary.varfield_hits += 1;
        if hit.identifier_subfields >= min_identifier_subfields {
            summary.report_rows += 1;
        } else if hit.identifier_subfields == 1 {
            summary.single_reference_hits += 1;
        }
    }

    summary
}
