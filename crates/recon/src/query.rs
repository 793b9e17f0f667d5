//! Typed search request builders.
//!
//! Each stage builds its request from these instead of raw JSON so a
//! malformed query shape is a compile error, not a 400 from the index.
//! Serialization produces the Elasticsearch query DSL.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u32>,
    #[serde(rename = "_source", skip_serializing_if = "Option::is_none")]
    source: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<String>,
    query: Query,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    aggs: BTreeMap<String, TermsAgg>,
}

impl SearchRequest {
    pub fn new(query: Query) -> Self {
        Self {
            size: None,
            source: None,
            fields: Vec::new(),
            query,
            aggs: BTreeMap::new(),
        }
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    /// Ask for `fields` only, never the full `_source` document.
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source = Some(false);
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn agg(mut self, name: impl Into<String>, agg: TermsAgg) -> Self {
        self.aggs.insert(name.into(), agg);
        self
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Query clauses
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Bool(BoolQuery),
    Term { field: String, value: String },
    Terms { field: String, values: Vec<String> },
    Prefix { field: String, value: String },
    Wildcard { field: String, value: String, name: String },
}

impl Query {
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Term { field: field.into(), value: value.into() }
    }

    pub fn terms<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Terms {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn prefix(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Prefix { field: field.into(), value: value.into() }
    }

    /// A wildcard clause tagged with `name`, reported back per hit in
    /// `matched_queries`.
    pub fn named_wildcard(
        field: impl Into<String>,
        value: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::Wildcard {
            field: field.into(),
            value: value.into(),
            name: name.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::Bool(b) => b.to_json(),
            Self::Term { field, value } => json!({ "term": { field.as_str(): value } }),
            Self::Terms { field, values } => json!({ "terms": { field.as_str(): values } }),
            Self::Prefix { field, value } => json!({ "prefix": { field.as_str(): value } }),
            Self::Wildcard { field, value, name } => {
                json!({ "wildcard": { field.as_str(): { "value": value, "_name": name } } })
            }
        }
    }
}

impl Serialize for Query {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    pub filter: Vec<Query>,
    pub must: Vec<Query>,
    pub should: Vec<Query>,
}

impl BoolQuery {
    pub fn filter(mut self, query: Query) -> Self {
        self.filter.push(query);
        self
    }

    pub fn must(mut self, query: Query) -> Self {
        self.must.push(query);
        self
    }

    pub fn should(mut self, query: Query) -> Self {
        self.should.push(query);
        self
    }

    fn to_json(&self) -> Value {
        let mut inner = Map::new();
        for (key, clauses) in [("filter", &self.filter), ("must", &self.must), ("should", &self.should)] {
            if !clauses.is_empty() {
                let list = clauses.iter().map(Query::to_json).collect();
                inner.insert(key.into(), Value::Array(list));
            }
        }
        json!({ "bool": inner })
    }
}

impl From<BoolQuery> for Query {
    fn from(b: BoolQuery) -> Self {
        Query::Bool(b)
    }
}

// ---------------------------------------------------------------------------
// Aggregations
// ---------------------------------------------------------------------------

/// A `terms` bucket aggregation, optionally nesting further ones.
#[derive(Debug, Clone, PartialEq)]
pub struct TermsAgg {
    pub field: String,
    pub size: u32,
    pub min_doc_count: Option<u64>,
    pub aggs: BTreeMap<String, TermsAgg>,
}

impl TermsAgg {
    pub fn new(field: impl Into<String>, size: u32) -> Self {
        Self {
            field: field.into(),
            size,
            min_doc_count: None,
            aggs: BTreeMap::new(),
        }
    }

    pub fn min_doc_count(mut self, n: u64) -> Self {
        self.min_doc_count = Some(n);
        self
    }

    pub fn sub(mut self, name: impl Into<String>, agg: TermsAgg) -> Self {
        self.aggs.insert(name.into(), agg);
        self
    }

    fn to_json(&self) -> Value {
        let mut terms = Map::new();
        terms.insert("field".into(), Value::String(self.field.clone()));
        terms.insert("size".into(), json!(self.size));
        if let Some(n) = self.min_doc_count {
            terms.insert("min_doc_count".into(), json!(n));
        }

        let mut out = Map::new();
        out.insert("terms".into(), Value::Object(terms));
        if !self.aggs.is_empty() {
            let subs = self
                .aggs
                .iter()
                .map(|(name, agg)| (name.clone(), agg.to_json()))
                .collect();
            out.insert("aggs".into(), Value::Object(subs));
        }
        Value::Object(out)
    }
}

impl Serialize for TermsAgg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}
