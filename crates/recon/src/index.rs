//! The seam between the engine and a search index.
//!
//! The engine only ever issues read-only `_search` requests; the CLI
//! implements this over HTTP, tests implement it in memory.

use serde_json::Value;

use crate::error::ReconError;
use crate::query::SearchRequest;

pub trait SearchIndex {
    /// Index name, used in errors and logs.
    fn name(&self) -> &str;

    /// Run one search and return the raw response body.
    fn search(&self, request: &SearchRequest) -> Result<Value, ReconError>;
}

impl<T: SearchIndex + ?Sized> SearchIndex for &T {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn search(&self, request: &SearchRequest) -> Result<Value, ReconError> {
        (**self).search(request)
    }
}

/// `hits.hits` of a search response.
pub(crate) fn hits<'a>(index: &str, body: &'a Value) -> Result<&'a Vec<Value>, ReconError> {
    body["hits"]["hits"]
        .as_array()
        .ok_or_else(|| ReconError::response(index, "missing 'hits.hits' array"))
}

/// `hits.total.value`, when the index reports it.
pub(crate) fn total_hits(body: &Value) -> Option<u64> {
    let total = &body["hits"]["total"];
    total["value"].as_u64().or_else(|| total.as_u64())
}

/// First value of a docvalue-style `fields` entry (`fields.<name>[0]`).
pub(crate) fn first_field(hit: &Value, name: &str) -> Option<String> {
    hit["fields"][name].as_array()?.first().map(value_to_string)
}

/// All values of a `fields` entry, stringified.
pub(crate) fn all_fields(hit: &Value, name: &str) -> Option<Vec<String>> {
    Some(hit["fields"][name].as_array()?.iter().map(value_to_string).collect())
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
