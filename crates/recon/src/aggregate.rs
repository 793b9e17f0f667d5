use serde_json::Value;

use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::index::SearchIndex;
use crate::model::{LabelGroup, ReusedLabels};
use crate::query::{BoolQuery, Query, SearchRequest, TermsAgg};

const LABELS_AGG: &str = "common-labels";
const IDS_AGG: &str = "ids";

/// Labels attached to at least two identifiers under the configured
/// authority: terms on label (`min_doc_count = 2`), then terms on
/// identifier within each label. Both levels are capped.
pub fn reused_labels_request(config: &ReconConfig) -> SearchRequest {
    let fields = &config.catalogue.fields;
    let mut filter = BoolQuery::default().filter(Query::term(&fields.authority, &config.authority.scheme));
    if !config.authority.identifier_prefix.is_empty() {
        filter = filter.filter(Query::prefix(&fields.identifier, &config.authority.identifier_prefix));
    }

    SearchRequest::new(filter.into()).size(0).agg(
        LABELS_AGG,
        TermsAgg::new(&fields.label, config.limits.label_buckets)
            .min_doc_count(2)
            .sub(IDS_AGG, TermsAgg::new(&fields.identifier, config.limits.ids_per_label)),
    )
}

/// Run the aggregation and collect label -> identifiers, in bucket order.
pub fn reused_labels(catalogue: &dyn SearchIndex, config: &ReconConfig) -> Result<ReusedLabels, ReconError> {
    let request = reused_labels_request(config);
    tracing::debug!(index = catalogue.name(), query = %request.to_json(), "aggregating reused labels");
    let body = catalogue.search(&request)?;

    let index = catalogue.name();
    let labels = &body["aggregations"][LABELS_AGG];
    let buckets = labels["buckets"]
        .as_array()
        .ok_or_else(|| ReconError::response(index, format!("missing '{LABELS_AGG}' buckets")))?;

    let mut out = ReusedLabels::default();
    if other_docs(labels) > 0 {
        tracing::warn!(
            cap = config.limits.label_buckets,
            omitted_docs = other_docs(labels),
            "label aggregation truncated, some reused labels are not reported"
        );
        out.truncated += 1;
    }

    for bucket in buckets {
        let group = collect_ids_from_bucket(index, bucket)?;
        if other_docs(&bucket[IDS_AGG]) > 0 {
            tracing::warn!(
                label = %group.label,
                cap = config.limits.ids_per_label,
                "identifier aggregation truncated for label"
            );
            out.truncated += 1;
        }
        // min_doc_count counts documents, not distinct identifiers
        if group.identifiers.len() < 2 {
            tracing::debug!(label = %group.label, "label has a single identifier, skipping");
            continue;
        }
        out.groups.push(group);
    }

    tracing::info!(labels = out.groups.len(), "found reused labels");
    Ok(out)
}

fn collect_ids_from_bucket(index: &str, bucket: &Value) -> Result<LabelGroup, ReconError> {
    let label = bucket["key"]
        .as_str()
        .ok_or_else(|| ReconError::response(index, "label bucket without a string key"))?;
    let id_buckets = bucket[IDS_AGG]["buckets"].as_array().ok_or_else(|| {
        ReconError::response(index, format!("label '{label}': missing '{IDS_AGG}' buckets"))
    })?;

    let mut identifiers: Vec<String> = Vec::with_capacity(id_buckets.len());
    for id_bucket in id_buckets {
        let id = id_bucket["key"].as_str().ok_or_else(|| {
            ReconError::response(index, format!("label '{label}': identifier bucket without a string key"))
        })?;
        if !identifiers.iter().any(|existing| existing == id) {
            identifiers.push(id.to_string());
        }
    }

    Ok(LabelGroup { label: label.to_string(), identifiers })
}

fn other_docs(agg: &Value) -> u64 {
    agg["sum_other_doc_count"].as_u64().unwrap_or(0)
}
