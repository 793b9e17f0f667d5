//! Index credentials: literal, environment or AWS Secrets Manager.
//!
//! Secrets manager lookups shell out to the `aws` CLI so the operator's
//! named profiles and SSO sessions apply unchanged. Each (profile, secret)
//! pair is fetched at most once per run.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;

use labelcheck_recon::config::{AwsSecretRef, CredentialsConfig, SecretValue};
use labelcheck_recon::ReconError;

#[derive(Default)]
pub struct SecretCache {
    aws_program: Option<PathBuf>,
    secrets: HashMap<AwsSecretRef, String>,
}

impl SecretCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific `aws` executable instead of searching `PATH`.
    pub fn with_aws_program(program: impl Into<PathBuf>) -> Self {
        Self { aws_program: Some(program.into()), secrets: HashMap::new() }
    }

    /// Resolve a username/password pair. `label` names the index in errors.
    pub fn resolve(
        &mut self,
        label: &str,
        credentials: &CredentialsConfig,
    ) -> Result<(String, String), ReconError> {
        let username = self.resolve_value(&format!("{label} username"), &credentials.username)?;
        let password = self.resolve_value(&format!("{label} password"), &credentials.password)?;
        Ok((username, password))
    }

    pub fn resolve_value(&mut self, label: &str, value: &SecretValue) -> Result<String, ReconError> {
        match value {
            SecretValue::Literal(s) => Ok(s.clone()),
            SecretValue::Env { env } => resolve_env(env, label),
            SecretValue::AwsSecret { aws_secret } => {
                if let Some(cached) = self.secrets.get(aws_secret) {
                    return Ok(cached.clone());
                }
                let secret = self.fetch_aws_secret(aws_secret, label)?;
                self.secrets.insert(aws_secret.clone(), secret.clone());
                Ok(secret)
            }
        }
    }

    fn aws_program(&mut self) -> Result<PathBuf, ReconError> {
        if let Some(program) = &self.aws_program {
            return Ok(program.clone());
        }
        let program = which::which("aws").map_err(|e| {
            ReconError::Credentials(format!("aws CLI not found on PATH: {e}"))
        })?;
        self.aws_program = Some(program.clone());
        Ok(program)
    }

    fn fetch_aws_secret(&mut self, secret: &AwsSecretRef, label: &str) -> Result<String, ReconError> {
        let program = self.aws_program()?;
        tracing::debug!(profile = %secret.profile, secret_id = %secret.secret_id, "fetching secret");

        let output = Command::new(&program)
            .args([
                "secretsmanager",
                "get-secret-value",
                "--profile",
                &secret.profile,
                "--secret-id",
                &secret.secret_id,
                "--query",
                "SecretString",
                "--output",
                "text",
            ])
            .output()
            .map_err(|e| {
                ReconError::Credentials(format!("failed to run {}: {e}", program.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReconError::Credentials(format!(
                "secret '{}' (profile '{}') for {label}: {}",
                secret.secret_id,
                secret.profile,
                stderr.trim(),
            )));
        }

        let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if value.is_empty() {
            return Err(ReconError::Credentials(format!(
                "secret '{}' (profile '{}') for {label} is empty",
                secret.secret_id, secret.profile,
            )));
        }
        Ok(value)
    }
}

fn resolve_env(var_name: &str, label: &str) -> Result<String, ReconError> {
    let value = std::env::var(var_name).map_err(|_| {
        ReconError::Credentials(format!(
            "environment variable {var_name} not set (needed for {label})"
        ))
    })?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ReconError::Credentials(format!(
            "environment variable {var_name} is empty (needed for {label})"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aws(profile: &str, secret_id: &str) -> SecretValue {
        SecretValue::AwsSecret {
            aws_secret: AwsSecretRef { profile: profile.into(), secret_id: secret_id.into() },
        }
    }

    #[test]
    fn literal_is_returned_as_is() {
        let mut cache = SecretCache::new();
        let value = cache.resolve_value("x", &SecretValue::Literal(" spaced ".into())).unwrap();
        assert_eq!(value, " spaced ");
    }

    #[test]
    fn env_is_trimmed() {
        std::env::set_var("LABELCHECK_TEST_CRED_TRIM", "  hunter2\n");
        let mut cache = SecretCache::new();
        let value = cache
            .resolve_value("x", &SecretValue::Env { env: "LABELCHECK_TEST_CRED_TRIM".into() })
            .unwrap();
        assert_eq!(value, "hunter2");
    }

    #[test]
    fn missing_env_is_credentials_error() {
        std::env::remove_var("LABELCHECK_TEST_CRED_MISSING");
        let mut cache = SecretCache::new();
        let err = cache
            .resolve_value("catalogue password", &SecretValue::Env { env: "LABELCHECK_TEST_CRED_MISSING".into() })
            .unwrap_err();
        assert!(matches!(err, ReconError::Credentials(_)));
        assert!(err.to_string().contains("catalogue password"));
    }

    #[test]
    fn empty_env_is_credentials_error() {
        std::env::set_var("LABELCHECK_TEST_CRED_EMPTY", "   ");
        let mut cache = SecretCache::new();
        let err = cache
            .resolve_value("x", &SecretValue::Env { env: "LABELCHECK_TEST_CRED_EMPTY".into() })
            .unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }

    #[test]
    fn missing_aws_program_is_credentials_error() {
        let mut cache = SecretCache::with_aws_program("/nonexistent/aws");
        let err = cache.resolve_value("x", &aws("catalogue-developer", "es/user")).unwrap_err();
        assert!(matches!(err, ReconError::Credentials(_)));
    }

    #[cfg(unix)]
    mod fake_aws {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// Shell script standing in for `aws`: prints `<profile>/<secret-id>`
        /// and appends one line to `calls` per invocation.
        fn fake_aws(dir: &std::path::Path, exit: i32) -> PathBuf {
            let path = dir.join("aws");
            let calls = dir.join("calls");
            let script = format!(
                "#!/bin/sh\necho x >> '{}'\necho \"$4/$6\"\necho 'denied' >&2\nexit {exit}\n",
                calls.display()
            );
            std::fs::write(&path, script).unwrap();
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        fn calls(dir: &std::path::Path) -> usize {
            std::fs::read_to_string(dir.join("calls")).map(|s| s.lines().count()).unwrap_or(0)
        }

        #[test]
        fn fetches_and_caches_secret() {
            let dir = tempfile::tempdir().unwrap();
            let mut cache = SecretCache::with_aws_program(fake_aws(dir.path(), 0));

            let first = cache.resolve_value("x", &aws("catalogue-developer", "es/user")).unwrap();
            let second = cache.resolve_value("y", &aws("catalogue-developer", "es/user")).unwrap();
            let other = cache.resolve_value("z", &aws("platform-developer", "es/pass")).unwrap();

            assert_eq!(first, "catalogue-developer/es/user");
            assert_eq!(second, first);
            assert_eq!(other, "platform-developer/es/pass");
            assert_eq!(calls(dir.path()), 2);
        }

        #[test]
        fn failing_cli_reports_stderr() {
            let dir = tempfile::tempdir().unwrap();
            let mut cache = SecretCache::with_aws_program(fake_aws(dir.path(), 255));
            let err = cache.resolve_value("x", &aws("catalogue-developer", "es/user")).unwrap_err();
            assert!(matches!(err, ReconError::Credentials(_)));
            assert!(err.to_string().contains("denied"), "{err}");
        }

        #[test]
        fn resolves_pair() {
            let dir = tempfile::tempdir().unwrap();
            let mut cache = SecretCache::with_aws_program(fake_aws(dir.path(), 0));
            let creds = CredentialsConfig {
                username: SecretValue::Literal("reader".into()),
                password: aws("platform-developer", "es/pass"),
            };
            let (user, pass) = cache.resolve("varfields", &creds).unwrap();
            assert_eq!(user, "reader");
            assert_eq!(pass, "platform-developer/es/pass");
        }
    }
}
