//! `labelcheck run | validate | wildcard`: config-driven reused label checks.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use labelcheck_recon::config::IndexConfig;
use labelcheck_recon::{matcher, report, Indices, ReconConfig, ReconError, ReconResult};

use crate::client::ElasticClient;
use crate::credentials::SecretCache;
use crate::CliError;

fn load_config(path: &Path) -> Result<ReconConfig, CliError> {
    let config_str = std::fs::read_to_string(path).map_err(|e| {
        CliError::args(format!("cannot read config {}: {e}", path.display()))
            .with_hint("pass the path to a .toml config, e.g. `labelcheck validate lc-names.toml`")
    })?;
    ReconConfig::from_toml(&config_str).map_err(CliError::recon)
}

fn connect<F>(
    secrets: &mut SecretCache,
    role: &str,
    index: &IndexConfig<F>,
) -> Result<ElasticClient, CliError> {
    let (username, password) = secrets.resolve(role, &index.credentials).map_err(CliError::recon)?;
    let client = ElasticClient::new(
        &index.url,
        &index.index,
        username,
        password,
        Duration::from_secs(index.timeout_secs),
    )
    .map_err(CliError::recon)?;
    tracing::debug!(role, url = %client.search_url(), "index client ready");
    Ok(client)
}

/// `<path>.tmp` next to the final report.
fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

/// Write the report to a sibling temp file. Returns the temp path; nothing
/// exists at `out` until [`commit`].
fn stage_report(result: &ReconResult, out: &Path) -> Result<PathBuf, CliError> {
    let tmp = temp_path(out);
    let file = File::create(&tmp)
        .map_err(|e| CliError::io(format!("cannot create {}: {e}", tmp.display())))?;

    if let Err(e) = report::write_csv(&result.rows, BufWriter::new(file)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(CliError::recon(e));
    }
    Ok(tmp)
}

fn stage_summary(result: &ReconResult, out: &Path, path: &Path) -> Result<PathBuf, CliError> {
    let json = serde_json::json!({
        "meta": result.meta,
        "summary": result.summary,
        "report": out.display().to_string(),
    });
    let json_str = serde_json::to_string_pretty(&json)
        .map_err(|e| CliError::other(format!("JSON serialization error: {e}")))?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, json_str + "\n")
        .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
    Ok(tmp)
}

/// Rename staged `(temp, final)` files into place in order. On failure every
/// file already renamed and every temp file left is removed.
fn commit(staged: &[(PathBuf, &Path)]) -> Result<(), CliError> {
    for (i, (tmp, dest)) in staged.iter().enumerate() {
        if let Err(e) = std::fs::rename(tmp, dest) {
            for (_, done) in &staged[..i] {
                let _ = std::fs::remove_file(done);
            }
            for (left, _) in &staged[i..] {
                let _ = std::fs::remove_file(left);
            }
            return Err(CliError::io(format!("cannot write {}: {e}", dest.display())));
        }
    }
    Ok(())
}

/// Stage every output, then move them all into place. A failed write
/// leaves neither the report nor the summary behind.
fn write_outputs(result: &ReconResult, out: &Path, summary: Option<&Path>) -> Result<(), CliError> {
    let report_tmp = stage_report(result, out)?;
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(2);

    if let Some(path) = summary {
        match stage_summary(result, out, path) {
            Ok(tmp) => staged.push((tmp, path)),
            Err(e) => {
                let _ = std::fs::remove_file(&report_tmp);
                return Err(e);
            }
        }
    }
    // report last, so it only appears once everything else is in place
    staged.push((report_tmp, out));
    commit(&staged)
}

pub fn cmd_run(
    config_path: PathBuf,
    out: PathBuf,
    summary_path: Option<PathBuf>,
    aws_cli: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    let mut secrets = match aws_cli {
        Some(program) => SecretCache::with_aws_program(program),
        None => SecretCache::new(),
    };
    let catalogue = connect(&mut secrets, "catalogue", &config.catalogue)?;
    let registry = connect(&mut secrets, "registry", &config.registry)?;
    let varfields = connect(&mut secrets, "varfields", &config.varfields)?;

    let result = labelcheck_recon::run(
        &config,
        Indices { catalogue: &catalogue, registry: &registry, varfields: &varfields },
    )
    .map_err(CliError::recon)?;

    write_outputs(&result, &out, summary_path.as_deref())?;

    if !quiet {
        let s = &result.summary;
        eprintln!(
            "{}: {} reused labels, {} discrepant identifiers, {} varfield hits",
            result.meta.config_name, s.reused_labels, s.discrepant_identifiers, s.varfield_hits,
        );
        eprintln!(
            "wrote {} rows to {} ({} single-reference hits left out)",
            s.report_rows,
            out.display(),
            s.single_reference_hits,
        );
        if s.truncated_aggregations > 0 || s.truncated_searches > 0 {
            eprintln!(
                "warning: results truncated ({} aggregations, {} searches); raise [limits]",
                s.truncated_aggregations, s.truncated_searches,
            );
        }
    }

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;
    eprintln!(
        "{}: ok (authority {}, {} -> {} -> {})",
        config.name,
        config.authority.scheme,
        config.catalogue.index,
        config.registry.index,
        config.varfields.index,
    );
    Ok(())
}

pub fn cmd_wildcard(identifiers: Vec<String>) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    for id in &identifiers {
        writeln!(handle, "{}\t{}", id, matcher::id_to_wildcard(id))
            .map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

impl CliError {
    /// Map an engine error onto its exit code, with a hint where one helps.
    pub fn recon(err: ReconError) -> Self {
        let code = crate::exit_codes::recon_exit_code(&err);
        let hint = match &err {
            ReconError::Credentials(_) => {
                Some("check the env vars named in the config, or run `aws sso login`".to_string())
            }
            ReconError::Http { status: 401 | 403, .. } => {
                Some("the index rejected the credentials".to_string())
            }
            ReconError::EmptyReport { .. } => {
                Some("no record cites a discrepant identifier more than once".to_string())
            }
            _ => None,
        };
        Self { code, message: err.to_string(), hint }
    }
}
