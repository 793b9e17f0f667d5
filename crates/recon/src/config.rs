use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReconConfig {
    pub name: String,
    pub authority: AuthorityConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    pub catalogue: IndexConfig<CatalogueFields>,
    pub registry: IndexConfig<RegistryFields>,
    pub varfields: IndexConfig<VarfieldFields>,
    #[serde(default)]
    pub report: ReportConfig,
}

// ---------------------------------------------------------------------------
// Authority
// ---------------------------------------------------------------------------

/// Which authority scheme is being reconciled.
///
/// `scheme` filters the catalogue (`authority` field), `identifier_prefix`
/// narrows it to one family of ids (e.g. `n` for personal names), and
/// `identifier_type` filters the registry. The registry type defaults to
/// the scheme name when omitted.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthorityConfig {
    pub scheme: String,
    #[serde(default)]
    pub identifier_prefix: String,
    #[serde(default)]
    pub identifier_type: Option<String>,
}

impl AuthorityConfig {
    pub fn identifier_type(&self) -> &str {
        self.identifier_type.as_deref().unwrap_or(&self.scheme)
    }
}

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Bucket and page caps. These truncate, they do not paginate.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_label_buckets")]
    pub label_buckets: u32,
    #[serde(default = "default_ids_per_label")]
    pub ids_per_label: u32,
    #[serde(default = "default_varfield_hits")]
    pub varfield_hits: u32,
}

fn default_label_buckets() -> u32 {
    20_000
}

fn default_ids_per_label() -> u32 {
    30
}

fn default_varfield_hits() -> u32 {
    30
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            label_buckets: default_label_buckets(),
            ids_per_label: default_ids_per_label(),
            varfield_hits: default_varfield_hits(),
        }
    }
}

// ---------------------------------------------------------------------------
// Index endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig<F> {
    pub url: String,
    pub index: String,
    pub credentials: CredentialsConfig,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub fields: F,
}

fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsConfig {
    pub username: SecretValue,
    pub password: SecretValue,
}

/// Where a credential comes from. Secrets never need to live in the file:
/// `{ env = "VAR" }` reads the environment, `{ aws_secret = { .. } }` asks
/// the secrets manager for a cached secret string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SecretValue {
    Literal(String),
    Env { env: String },
    AwsSecret { aws_secret: AwsSecretRef },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct AwsSecretRef {
    pub profile: String,
    pub secret_id: String,
}

// ---------------------------------------------------------------------------
// Field mappings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogueFields {
    #[serde(default = "default_catalogue_label")]
    pub label: String,
    #[serde(default = "default_catalogue_identifier")]
    pub identifier: String,
    #[serde(default = "default_catalogue_authority")]
    pub authority: String,
}

fn default_catalogue_label() -> String {
    "label".into()
}

fn default_catalogue_identifier() -> String {
    "identifier".into()
}

fn default_catalogue_authority() -> String {
    "authority".into()
}

impl Default for CatalogueFields {
    fn default() -> Self {
        Self {
            label: default_catalogue_label(),
            identifier: default_catalogue_identifier(),
            authority: default_catalogue_authority(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryFields {
    #[serde(default = "default_registry_identifier_type")]
    pub identifier_type: String,
    #[serde(default = "default_registry_identifier_value")]
    pub identifier_value: String,
    #[serde(default = "default_registry_label")]
    pub label: String,
}

fn default_registry_identifier_type() -> String {
    "query.identifiers.identifierType".into()
}

fn default_registry_identifier_value() -> String {
    "query.identifiers.value".into()
}

fn default_registry_label() -> String {
    "query.label".into()
}

impl Default for RegistryFields {
    fn default() -> Self {
        Self {
            identifier_type: default_registry_identifier_type(),
            identifier_value: default_registry_identifier_value(),
            label: default_registry_label(),
        }
    }
}

/// Field names in the bibliographic reporting index, plus the subfield
/// codes that get counted on each matched field occurrence.
#[derive(Debug, Clone, Deserialize)]
pub struct VarfieldFields {
    #[serde(default = "default_varfield_record_id")]
    pub record_id: String,
    #[serde(default = "default_varfield_marc_tag")]
    pub marc_tag: String,
    #[serde(default = "default_varfield_subfield_tag")]
    pub subfield_tag: String,
    #[serde(default = "default_varfield_subfield_content")]
    pub subfield_content: String,
    /// Keyword (non-analyzed) variant of the content field, used for wildcards.
    #[serde(default = "default_varfield_content_search")]
    pub content_search: String,
    #[serde(default = "default_identifier_code")]
    pub identifier_code: String,
    #[serde(default = "default_see_also_code")]
    pub see_also_code: String,
}

fn default_varfield_record_id() -> String {
    "parent.idWithCheckDigit".into()
}

fn default_varfield_marc_tag() -> String {
    "varField.marcTag".into()
}

fn default_varfield_subfield_tag() -> String {
    "varField.subfields.tag".into()
}

fn default_varfield_subfield_content() -> String {
    "varField.subfields.content".into()
}

fn default_varfield_content_search() -> String {
    "varField.subfields.content.keyword".into()
}

fn default_identifier_code() -> String {
    "0".into()
}

fn default_see_also_code() -> String {
    "t".into()
}

impl Default for VarfieldFields {
    fn default() -> Self {
        Self {
            record_id: default_varfield_record_id(),
            marc_tag: default_varfield_marc_tag(),
            subfield_tag: default_varfield_subfield_tag(),
            subfield_content: default_varfield_subfield_content(),
            content_search: default_varfield_content_search(),
            identifier_code: default_identifier_code(),
            see_also_code: default_see_also_code(),
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// A hit is reported when its field carries at least this many
    /// identifier subfields. One stray reference is not evidence of reuse.
    #[serde(default = "default_min_identifier_subfields")]
    pub min_identifier_subfields: usize,
}

fn default_min_identifier_subfields() -> usize {
    2
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            min_identifier_subfields: default_min_identifier_subfields(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ReconConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: ReconConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.authority.scheme.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "authority.scheme must not be empty".into(),
            ));
        }
        if self.authority.identifier_type().trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "authority.identifier_type must not be empty".into(),
            ));
        }

        for (name, value) in [
            ("limits.label_buckets", self.limits.label_buckets),
            ("limits.ids_per_label", self.limits.ids_per_label),
            ("limits.varfield_hits", self.limits.varfield_hits),
        ] {
            if value == 0 {
                return Err(ReconError::ConfigValidation(format!("{name} must be at least 1")));
            }
        }

        if self.report.min_identifier_subfields == 0 {
            return Err(ReconError::ConfigValidation(
                "report.min_identifier_subfields must be at least 1".into(),
            ));
        }

        validate_endpoint("catalogue", &self.catalogue.url, &self.catalogue.index)?;
        validate_endpoint("registry", &self.registry.url, &self.registry.index)?;
        validate_endpoint("varfields", &self.varfields.url, &self.varfields.index)?;

        let c = &self.catalogue.fields;
        let r = &self.registry.fields;
        let v = &self.varfields.fields;
        let field_names = [
            ("catalogue.fields.label", &c.label),
            ("catalogue.fields.identifier", &c.identifier),
            ("catalogue.fields.authority", &c.authority),
            ("registry.fields.identifier_type", &r.identifier_type),
            ("registry.fields.identifier_value", &r.identifier_value),
            ("registry.fields.label", &r.label),
            ("varfields.fields.record_id", &v.record_id),
            ("varfields.fields.marc_tag", &v.marc_tag),
            ("varfields.fields.subfield_tag", &v.subfield_tag),
            ("varfields.fields.subfield_content", &v.subfield_content),
            ("varfields.fields.content_search", &v.content_search),
            ("varfields.fields.identifier_code", &v.identifier_code),
            ("varfields.fields.see_also_code", &v.see_also_code),
        ];
        for (name, value) in field_names {
            if value.trim().is_empty() {
                return Err(ReconError::ConfigValidation(format!("{name} must not be empty")));
            }
        }

        Ok(())
    }
}

fn validate_endpoint(name: &str, url: &str, index: &str) -> Result<(), ReconError> {
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ReconError::ConfigValidation(format!(
            "{name}.url must start with http:// or https://, got '{url}'"
        )));
    }
    if index.trim().is_empty() {
        return Err(ReconError::ConfigValidation(format!("{name}.index must not be empty")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
