//! `labelcheck-recon`: reused authority label reconciliation engine.
//!
//! Finds catalogue labels shared by several authority identifiers, asks the
//! registry which identifier each label really belongs to, and looks for
//! bibliographic records that still cite the other ones.
//!
//! Engine crate: talks to indices only through [`SearchIndex`]. No CLI,
//! HTTP or credential handling.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod crossref;
pub mod engine;
pub mod error;
pub mod evidence;
pub mod index;
pub mod matcher;
pub mod model;
pub mod query;
pub mod report;
pub mod resolve;

pub use config::ReconConfig;
pub use engine::{run, Indices};
pub use error::ReconError;
pub use index::SearchIndex;
pub use model::{ReconResult, ReportRow, VarfieldHit};

#[cfg(test)]
pub(crate) fn test_config() -> ReconConfig {
    ReconConfig::from_toml(
        r#"
name = "test"

[authority]
scheme = "lc-names"
identifier_prefix = "n"

[catalogue]
url = "http://localhost:9200"
index = "catalogue-concepts"
credentials = { username = "u", password = "p" }

[registry]
url = "http://localhost:9200"
index = "concepts-store"
credentials = { username = "u", password = "p" }

[varfields]
url = "http://localhost:9200"
index = "sierra_varfields"
credentials = { username = "u", password = "p" }
"#,
    )
    .expect("test config is valid")
}
