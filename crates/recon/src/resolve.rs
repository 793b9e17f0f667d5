use crate::config::ReconConfig;
use crate::error::ReconError;
use crate::index::{self, SearchIndex};
use crate::model::{AuthoritativeMapping, LabelGroup, ResolvedGroup};
use crate::query::{BoolQuery, Query, SearchRequest};

/// Bulk lookup of the registry records for one group's identifiers.
/// Returns the identifier and label fields only.
pub fn lookup_request(config: &ReconConfig, identifiers: &[String]) -> SearchRequest {
    let fields = &config.registry.fields;
    SearchRequest::new(
        BoolQuery::default()
            .must(Query::term(&fields.identifier_type, config.authority.identifier_type()))
            .must(Query::terms(&fields.identifier_value, identifiers))
            .into(),
    )
    .size(config.limits.ids_per_label)
    .fields([fields.identifier_value.as_str(), fields.label.as_str()])
}

/// Canonical label for each identifier in `identifiers`, per the registry.
///
/// Identifiers the registry has no record for are absent from the result,
/// as are hits missing either field.
pub fn with_correct_names(
    registry: &dyn SearchIndex,
    config: &ReconConfig,
    identifiers: &[String],
) -> Result<AuthoritativeMapping, ReconError> {
    let mut names = AuthoritativeMapping::new();
    if identifiers.is_empty() {
        return Ok(names);
    }

    let request = lookup_request(config, identifiers);
    let body = registry.search(&request)?;
    let fields = &config.registry.fields;

    for hit in index::hits(registry.name(), &body)? {
        let id = index::first_field(hit, &fields.identifier_value);
        let label = index::first_field(hit, &fields.label);
        match (id, label) {
            (Some(id), Some(label)) => {
                names.insert(id, label);
            }
            _ => tracing::debug!(hit = %hit, "registry hit without identifier or label, ignoring"),
        }
    }

    Ok(names)
}

/// One registry lookup per label group, in group order.
pub fn authoritative_names(
    registry: &dyn SearchIndex,
    config: &ReconConfig,
    groups: &[LabelGroup],
) -> Result<Vec<ResolvedGroup>, ReconError> {
    let mut resolved = Vec::with_capacity(groups.len());
    for group in groups {
        let names = with_correct_names(registry, config, &group.identifiers)?;
        tracing::debug!(
            label = %group.label,
            identifiers = group.identifiers.len(),
            resolved = names.len(),
            "resolved authoritative names"
        );
        resolved.push(ResolvedGroup { label: group.label.clone(), names });
    }
    tracing::info!(groups = resolved.len(), "resolved label groups against the registry");
    Ok(resolved)
}
