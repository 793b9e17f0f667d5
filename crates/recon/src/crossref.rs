use serde_json::Value;

use crate::config::{ReconConfig, VarfieldFields};
use crate::error::{MalformedHitContext, ReconError};
use crate::index::{self, SearchIndex};
use crate::matcher::id_to_wildcard;
use crate::model::{DiscrepantPair, VarfieldHit, VarfieldSearch};
use crate::query::{BoolQuery, Query, SearchRequest};

/// Any-of wildcard search over subfield content, one named clause per pair.
pub fn varfields_request(config: &ReconConfig, pairs: &[DiscrepantPair]) -> SearchRequest {
    let fields = &config.varfields.fields;
    let any_of = pairs.iter().fold(BoolQuery::default(), |q, pair| {
        q.should(Query::named_wildcard(
            &fields.content_search,
            id_to_wildcard(&pair.identifier),
            pair.query_name(),
        ))
    });

    SearchRequest::new(any_of.into())
        .size(config.limits.varfield_hits)
        .fields([
            fields.record_id.as_str(),
            fields.subfield_tag.as_str(),
            fields.subfield_content.as_str(),
            fields.marc_tag.as_str(),
        ])
}

/// Find the bibliographic field occurrences that still carry one of the
/// discrepant identifiers.
///
/// No pairs, no query. A hit missing any required field aborts the whole
/// search with the raw hits, the pairs and the issued query attached.
pub fn get_b_numbers(
    varfields: &dyn SearchIndex,
    config: &ReconConfig,
    pairs: &[DiscrepantPair],
) -> Result<VarfieldSearch, ReconError> {
    if pairs.is_empty() {
        return Ok(VarfieldSearch::default());
    }

    let request = varfields_request(config, pairs);
    tracing::debug!(index = varfields.name(), query = %request.to_json(), "searching varfields");
    let body = varfields.search(&request)?;
    let raw_hits = index::hits(varfields.name(), &body)?;

    let truncated = index::total_hits(&body).is_some_and(|total| total > raw_hits.len() as u64);
    if truncated {
        tracing::warn!(
            returned = raw_hits.len(),
            total = index::total_hits(&body),
            cap = config.limits.varfield_hits,
            "varfield search truncated"
        );
    }

    let mut hits = Vec::with_capacity(raw_hits.len());
    for hit in raw_hits {
        match parse_hit(hit, &config.varfields.fields) {
            Ok(parsed) => hits.push(parsed),
            Err(reason) => {
                let ctx = MalformedHitContext {
                    reason,
                    hits: Value::Array(raw_hits.clone()),
                    pairs: pairs.to_vec(),
                    query: request.to_json(),
                };
                tracing::error!("malformed varfield hit\n{}", ctx.dump());
                return Err(ReconError::MalformedHit(Box::new(ctx)));
            }
        }
    }

    Ok(VarfieldSearch { hits, truncated })
}

fn parse_hit(hit: &Value, fields: &VarfieldFields) -> Result<VarfieldHit, String> {
    let hit_id = hit["_id"].as_str().unwrap_or("?");
    let missing = |name: &str| format!("hit '{hit_id}' has no '{name}' field");

    let bnumber = index::first_field(hit, &fields.record_id).ok_or_else(|| missing(&fields.record_id))?;
    let marc_tag = index::first_field(hit, &fields.marc_tag).ok_or_else(|| missing(&fields.marc_tag))?;
    let content = index::all_fields(hit, &fields.subfield_content)
        .ok_or_else(|| missing(&fields.subfield_content))?;
    let tags = index::all_fields(hit, &fields.subfield_tag).ok_or_else(|| missing(&fields.subfield_tag))?;

    let matched = first_matched_query(hit)
        .ok_or_else(|| format!("hit '{hit_id}' has no matched query name"))?;
    let (identifier, authority_label) = split_query_name(matched)
        .ok_or_else(|| format!("hit '{hit_id}': cannot parse matched query name '{matched}'"))?;

    Ok(VarfieldHit {
        bnumber,
        marc_tag,
        field_content: content.join(" "),
        identifier: identifier.to_string(),
        authority_label: authority_label.to_string(),
        identifier_subfields: tags.iter().filter(|t| **t == fields.identifier_code).count(),
        see_also_subfields: tags.iter().filter(|t| **t == fields.see_also_code).count(),
    })
}

/// `matched_queries` is a list of names, or a name -> score map when
/// scores are requested. Either way the first name in response order wins.
fn first_matched_query(hit: &Value) -> Option<&str> {
    match &hit["matched_queries"] {
        Value::Array(names) => names.first()?.as_str(),
        Value::Object(scored) => scored.keys().next().map(String::as_str),
        _ => None,
    }
}

/// Inverse of [`DiscrepantPair::query_name`]: split at the first colon.
fn split_query_name(name: &str) -> Option<(&str, &str)> {
    let (identifier, label) = name.split_once(':')?;
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return None;
    }
    Some((identifier, label.trim_start()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::test_support::ScriptedIndex;
    use crate::test_config;
    use serde_json::json;

    fn varfield_hit(bnumber: &str, tags: &[&str], content: &[&str], matched: &str) -> Value {
        json!({
            "_id": format!("{bnumber}-700"),
            "fields": {
                "parent.idWithCheckDigit": [bnumber],
                "varField.marcTag": ["700"],
                "varField.subfields.tag": tags,
                "varField.subfields.content": content
            },
            "matched_queries": [matched]
        })
    }

    fn response(hits: Vec<Value>, total: usize) -> Value {
        json!({ "hits": { "total": { "value": total, "relation": "eq" }, "hits": hits } })
    }

    fn smith() -> Vec<DiscrepantPair> {
        vec![DiscrepantPair::new("n200", "Smith, Jonathan")]
    }

    #[test]
    fn request_has_one_named_clause_per_pair() {
        let pairs = vec![
            DiscrepantPair::new("n200", "Smith, Jonathan"),
            DiscrepantPair::new("no54321", "Smith, J."),
        ];
        let body = varfields_request(&test_config(), &pairs).to_json();
        assert_eq!(body["size"], 30);
        assert_eq!(body["_source"], false);
        assert_eq!(
            body["fields"],
            json!([
                "parent.idWithCheckDigit",
                "varField.subfields.tag",
                "varField.subfields.content",
                "varField.marcTag"
            ])
        );
        let should = body["query"]["bool"]["should"].as_array().unwrap();
        assert_eq!(should.len(), 2);
        assert_eq!(
            should[1],
            json!({ "wildcard": { "varField.subfields.content.keyword": {
                "value": "no*54321",
                "_name": "no54321: Smith, J."
            } } })
        );
    }

    #[test]
    fn empty_pairs_issue_no_query() {
        let index = ScriptedIndex::new("sierra_varfields", vec![]);
        let out = get_b_numbers(&index, &test_config(), &[]).unwrap();
        assert!(out.hits.is_empty());
        assert!(!out.truncated);
        assert_eq!(index.request_count(), 0);
    }

    #[test]
    fn derives_counts_and_provenance() {
        let index = ScriptedIndex::new(
            "sierra_varfields",
            vec![response(
                vec![varfield_hit(
                    "b1234567x",
                    &["a", "d", "0", "0", "t"],
                    &["Smith, John,", "1900-1980", "n  200", "n 100", "Collected works"],
                    "n200: Smith, Jonathan",
                )],
                1,
            )],
        );
        let out = get_b_numbers(&index, &test_config(), &smith()).unwrap();
        assert_eq!(out.hits.len(), 1);
        let hit = &out.hits[0];
        assert_eq!(hit.bnumber, "b1234567x");
        assert_eq!(hit.marc_tag, "700");
        assert_eq!(hit.field_content, "Smith, John, 1900-1980 n  200 n 100 Collected works");
        assert_eq!(hit.identifier, "n200");
        assert_eq!(hit.authority_label, "Smith, Jonathan");
        assert_eq!(hit.identifier_subfields, 2);
        assert_eq!(hit.see_also_subfields, 1);
        assert!(!out.truncated);
    }

    #[test]
    fn truncation_flagged_when_total_exceeds_hits() {
        let index = ScriptedIndex::new(
            "sierra_varfields",
            vec![response(vec![varfield_hit("b1", &["0"], &["n 200"], "n200: Smith, Jonathan")], 45)],
        );
        let out = get_b_numbers(&index, &test_config(), &smith()).unwrap();
        assert!(out.truncated);
    }

    #[test]
    fn scored_matched_queries_map() {
        let mut hit = varfield_hit("b1", &["0"], &["n 200"], "unused");
        hit["matched_queries"] = json!({ "n200: Smith, Jonathan": 1.0 });
        let index = ScriptedIndex::new("sierra_varfields", vec![response(vec![hit], 1)]);
        let out = get_b_numbers(&index, &test_config(), &smith()).unwrap();
        assert_eq!(out.hits[0].identifier, "n200");
        assert_eq!(out.hits[0].authority_label, "Smith, Jonathan");
    }

    #[test]
    fn scored_map_keeps_response_order() {
        let hit: Value = serde_json::from_str(
            r#"{ "matched_queries": { "n300: Zeller, Ann": 1.0, "n200: Smith, Jonathan": 0.5 } }"#,
        )
        .unwrap();
        assert_eq!(first_matched_query(&hit), Some("n300: Zeller, Ann"));
    }

    #[test]
    fn label_with_colon_survives() {
        assert_eq!(
            split_query_name("n200: Smith, John: a study"),
            Some(("n200", "Smith, John: a study"))
        );
        assert_eq!(split_query_name("n200"), None);
        assert_eq!(split_query_name(": orphan"), None);
    }

    #[test]
    fn malformed_hit_carries_context() {
        let mut bad = varfield_hit("b1", &["0", "0"], &["n 200"], "n200: Smith, Jonathan");
        bad["fields"].as_object_mut().unwrap().remove("varField.marcTag");
        let index = ScriptedIndex::new("sierra_varfields", vec![response(vec![bad], 1)]);

        let err = get_b_numbers(&index, &test_config(), &smith()).unwrap_err();
        let ReconError::MalformedHit(ctx) = err else {
            panic!("expected MalformedHit");
        };
        assert!(ctx.reason.contains("varField.marcTag"));
        assert_eq!(ctx.pairs, smith());
        assert_eq!(ctx.hits.as_array().map(Vec::len), Some(1));
        assert_eq!(
            ctx.query["query"]["bool"]["should"][0]["wildcard"]["varField.subfields.content.keyword"]["value"],
            "n*200"
        );
        let dump = ctx.dump();
        assert!(dump.contains("n200 -> Smith, Jonathan"));
        assert!(dump.contains("n*200"));
    }

    #[test]
    fn missing_matched_queries_is_malformed() {
        let mut bad = varfield_hit("b1", &["0"], &["n 200"], "n200: Smith, Jonathan");
        bad.as_object_mut().unwrap().remove("matched_queries");
        let index = ScriptedIndex::new("sierra_varfields", vec![response(vec![bad], 1)]);
        let err = get_b_numbers(&index, &test_config(), &smith()).unwrap_err();
        assert!(matches!(err, ReconError::MalformedHit(_)));
    }
}
