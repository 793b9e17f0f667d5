use std::collections::BTreeMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Catalogue
// ---------------------------------------------------------------------------

/// A label attached to two or more identifiers in the catalogue.
/// Identifiers keep the bucket order the catalogue returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelGroup {
    pub label: String,
    pub identifiers: Vec<String>,
}

/// Label groups in bucket order, plus whether any bucket level was cut
/// off by its cap.
#[derive(Debug, Clone, Default)]
pub struct ReusedLabels {
    pub groups: Vec<LabelGroup>,
    pub truncated: usize,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Identifier -> canonical label, as currently held by the registry.
/// Identifiers the registry does not know are simply absent.
pub type AuthoritativeMapping = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct ResolvedGroup {
    pub label: String,
    pub names: AuthoritativeMapping,
}

/// An identifier still grouped under a label that is not its canonical one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscrepantPair {
    pub identifier: String,
    pub label: String,
}

impl DiscrepantPair {
    pub fn new(identifier: impl Into<String>, label: impl Into<String>) -> Self {
        Self { identifier: identifier.into(), label: label.into() }
    }

    /// Stable query name, so a hit can be traced back to the pair that matched it.
    pub fn query_name(&self) -> String {
        format!("{}: {}", self.identifier, self.label)
    }
}

// ---------------------------------------------------------------------------
// Bibliographic hits
// ---------------------------------------------------------------------------

/// One matched field occurrence in the reporting index.
///
/// Field order is the report's column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarfieldHit {
    pub bnumber: String,
    pub marc_tag: String,
    pub field_content: String,
    pub identifier: String,
    pub authority_label: String,
    pub identifier_subfields: usize,
    pub see_also_subfields: usize,
}

/// Hits for one reused label, plus whether the search was capped.
#[derive(Debug, Clone, Default)]
pub struct VarfieldSearch {
    pub hits: Vec<VarfieldHit>,
    pub truncated: bool,
}

/// Rows are hits that cleared the identifier-subfield threshold.
pub type ReportRow = VarfieldHit;

// ---------------------------------------------------------------------------
// Summary + Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconSummary {
    pub reused_labels: usize,
    pub identifiers: usize,
    pub resolved_identifiers: usize,
    pub labels_without_discrepancy: usize,
    pub discrepant_identifiers: usize,
    pub varfield_hits: usize,
    pub report_rows: usize,
    pub single_reference_hits: usize,
    pub truncated_aggregations: usize,
    pub truncated_searches: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconMeta {
    pub config_name: String,
    pub authority: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconResult {
    pub meta: ReconMeta,
    pub summary: ReconSummary,
    #[serde(skip)]
    pub rows: Vec<ReportRow>,
}
