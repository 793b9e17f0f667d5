use std::fmt;

use crate::model::DiscrepantPair;

/// Everything a malformed bibliographic hit needs for a post-mortem:
/// the raw hits as returned, the pairs that were searched for, and the
/// request body that produced them.
#[derive(Debug, Clone)]
pub struct MalformedHitContext {
    pub reason: String,
    pub hits: serde_json::Value,
    pub pairs: Vec<DiscrepantPair>,
    pub query: serde_json::Value,
}

impl MalformedHitContext {
    /// Pretty-printed dump of the full diagnostic context.
    pub fn dump(&self) -> String {
        let pretty = |v: &serde_json::Value| {
            serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
        };
        let pairs: Vec<String> = self
            .pairs
            .iter()
            .map(|p| format!("  {} -> {}", p.identifier, p.label))
            .collect();
        format!(
            "reason: {}\nhits:\n{}\nidentifiers:\n{}\nquery:\n{}",
            self.reason,
            pretty(&self.hits),
            pairs.join("\n"),
            pretty(&self.query),
        )
    }
}

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (empty scheme, zero cap, etc.).
    ConfigValidation(String),
    /// Credentials for an index could not be resolved.
    Credentials(String),
    /// Request never produced a response (DNS, TLS, timeout, refused).
    Transport { index: String, message: String },
    /// Index answered with a non-success status.
    Http { index: String, status: u16, message: String },
    /// Response body was not the expected shape.
    Response { index: String, message: String },
    /// A bibliographic hit lacked a required field.
    MalformedHit(Box<MalformedHitContext>),
    /// Nothing survived the report filter, so no header can be derived.
    EmptyReport { hits: usize },
    /// IO error (report write, etc.).
    Io(String),
}

impl ReconError {
    pub fn response(index: &str, message: impl Into<String>) -> Self {
        Self::Response { index: index.to_string(), message: message.into() }
    }
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Credentials(msg) => write!(f, "credentials error: {msg}"),
            Self::Transport { index, message } => {
                write!(f, "index '{index}': request failed: {message}")
            }
            Self::Http { index, status, message } => {
                write!(f, "index '{index}': HTTP {status}: {message}")
            }
            Self::Response { index, message } => {
                write!(f, "index '{index}': unexpected response: {message}")
            }
            Self::MalformedHit(ctx) => write!(f, "malformed varfield hit: {}", ctx.reason),
            Self::EmptyReport { hits } => write!(
                f,
                "empty report: {hits} varfield hit(s), none with enough identifier subfields"
            ),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
