use crate::model::{AuthoritativeMapping, DiscrepantPair};

/// Identifiers whose canonical name is not the label they are grouped under.
///
/// An empty result means the registry agrees with the catalogue for every
/// identifier it knows; that is logged, not treated as an error.
pub fn wrong_ids_for_label(label: &str, names: &AuthoritativeMapping) -> Vec<DiscrepantPair> {
    let wrong: Vec<DiscrepantPair> = names
        .iter()
        .filter(|(_, canonical)| canonical.as_str() != label)
        .map(|(id, canonical)| DiscrepantPair::new(id, canonical))
        .collect();

    if wrong.is_empty() {
        tracing::info!(label, ?names, "there were no wrong ids");
    }
    wrong
}
