//! Secrets management for Grader
//!
//! Secrets are stored separately from configuration to avoid accidental sharing.
//! The secrets file is located at `~/.config/grader/secrets.toml` and must have
//! restrictive permissions (0600 on Unix).
//!
//! Loading priority:
//! 1. Environment variables (GITHUB_TOKEN, OPENAI_API_KEY)
//! 2. Secrets file (~/.config/grader/secrets.toml)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{Error, Result};

/// Secrets structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Secrets {
    /// GitHub configuration
    pub github: GitHubSecrets,

    /// OpenAI configuration
    pub openai: OpenAiSecrets,
}

/// GitHub-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GitHubSecrets {
    /// GitHub Personal Access Token
    pub token: Option<String>,
}

/// OpenAI-related secrets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenAiSecrets {
    /// API key for the chat completion endpoint
    pub api_key: Option<String>,
}

impl Secrets {
    /// Load secrets from the default location
    ///
    /// Returns default (empty) secrets if file doesn't exist
    pub fn load() -> Result<Self> {
        let secrets_path = Self::default_secrets_path();

        if let Some(path) = secrets_path {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Load secrets from a specific file with permission checking
    pub fn load_from_file(path: &Path) -> Result<Self> {
        // Check file permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let metadata = std::fs::metadata(path).map_err(Error::Io)?;
            let mode = metadata.permissions().mode();

            if mode & 0o077 != 0 {
                return Err(Error::Config(format!(
                    "Secrets file {} has insecure permissions {:o}. \
                     Please run: chmod 600 {}",
                    path.display(),
                    mode & 0o777,
                    path.display()
                )));
            }

            debug!(path = %path.display(), mode = format!("{:o}", mode & 0o777), "Secrets file permissions OK");
        }

        let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
        let mut secrets: Secrets = toml::from_str(&contents)
            .map_err(|e| Error::Config(format!("Failed to parse secrets: {}", e)))?;

        for value in [&mut secrets.github.token, &mut secrets.openai.api_key] {
            if let Some(secret) = value {
                *secret = secret.trim().to_string();
            }
        }

        Ok(secrets)
    }

    /// Get the default secrets file path
    ///
    /// Returns `~/.config/grader/secrets.toml` on Unix
    pub fn default_secrets_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("grader").join("secrets.toml"))
    }

    /// Get GitHub token with environment variable override
    ///
    /// Priority: GITHUB_TOKEN env var > secrets file
    pub fn github_token(&self) -> Option<String> {
        resolve(
            "GITHUB_TOKEN",
            std::env::var("GITHUB_TOKEN").ok(),
            self.github.token.as_deref(),
        )
    }

    /// Get the OpenAI API key with environment variable override
    ///
    /// Priority: OPENAI_API_KEY env var > secrets file
    pub fn openai_api_key(&self) -> Option<String> {
        resolve(
            "OPENAI_API_KEY",
            std::env::var("OPENAI_API_KEY").ok(),
            self.openai.api_key.as_deref(),
        )
    }

    /// Create a template secrets file at the default location
    ///
    /// Creates parent directories if needed and sets secure permissions
    pub fn create_template() -> Result<PathBuf> {
        let path = Self::default_secrets_path()
            .ok_or_else(|| Error::Config("Could not determine secrets path".to_string()))?;
        Self::create_template_at(&path)?;
        Ok(path)
    }

    /// Create a template secrets file at a specific path
    pub fn create_template_at(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        // Don't overwrite existing file
        if path.exists() {
            return Err(Error::Config(format!(
                "Secrets file already exists at {}",
                path.display()
            )));
        }

        let template = r#"# Grader Secrets
# This file contains sensitive credentials - do not share or commit to version control
#
# IMPORTANT: This file must have restrictive permissions (chmod 600)

[github]
# GitHub Personal Access Token (read access to repository contents)
# Create at: https://github.com/settings/tokens
token = ""

[openai]
# API key for the chat completion endpoint
api_key = ""
"#;

        std::fs::write(path, template).map_err(Error::Io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(path, perms).map_err(Error::Io)?;
        }

        warn!(path = %path.display(), "Created secrets template - please edit and add your tokens");

        Ok(())
    }
}

/// Pick the environment value when set, otherwise the file value
fn resolve(var: &str, env_value: Option<String>, file_value: Option<&str>) -> Option<String> {
    if let Some(value) = env_value {
        let value = value.trim().to_string();
        if !value.is_empty() {
            debug!(var, "Using secret from environment variable");
            return Some(value);
        }
    }

    match file_value {
        Some(value) if !value.is_empty() => {
            debug!(var, "Using secret from secrets file");
            Some(value.to_string())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_secrets() {
        let secrets = Secrets::default();
        assert!(secrets.github.token.is_none());
        assert!(secrets.openai.api_key.is_none());
    }

    #[test]
    fn test_parse_secrets() {
        let toml = r#"
[github]
token = "ghp_xxxxxxxxxxxx"

[openai]
api_key = "sk-test"
"#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.github.token, Some("ghp_xxxxxxxxxxxx".to_string()));
        assert_eq!(secrets.openai.api_key, Some("sk-test".to_string()));
    }

    #[test]
    fn test_resolve_prefers_environment() {
        let value = resolve("GITHUB_TOKEN", Some(" from_env ".to_string()), Some("from_file"));
        assert_eq!(value, Some("from_env".to_string()));
    }

    #[test]
    fn test_resolve_falls_back_to_file() {
        assert_eq!(
            resolve("GITHUB_TOKEN", Some("   ".to_string()), Some("from_file")),
            Some("from_file".to_string())
        );
        assert_eq!(
            resolve("GITHUB_TOKEN", None, Some("from_file")),
            Some("from_file".to_string())
        );
        assert_eq!(resolve("GITHUB_TOKEN", None, Some("")), None);
        assert_eq!(resolve("GITHUB_TOKEN", None, None), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_insecure_permissions_rejected() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[github]\ntoken = \"test\"").unwrap();

        let perms = std::fs::Permissions::from_mode(0o644);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let result = Secrets::load_from_file(file.path());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("insecure permissions"));
    }

    #[cfg(unix)]
    #[test]
    fn test_secure_permissions_accepted_and_trimmed() {
        use std::os::unix::fs::PermissionsExt;

        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[github]\ntoken = \"  ghp_test \"\n[openai]\napi_key = \"sk-test\\n\""
        )
        .unwrap();

        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(file.path(), perms).unwrap();

        let secrets = Secrets::load_from_file(file.path()).unwrap();
        assert_eq!(secrets.github.token, Some("ghp_test".to_string()));
        assert_eq!(secrets.openai.api_key, Some("sk-test".to_string()));
    }

    #[test]
    fn test_create_template_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grader").join("secrets.toml");

        Secrets::create_template_at(&path).unwrap();
        assert!(path.exists());

        let loaded = Secrets::load_from_file(&path).unwrap();
        assert_eq!(loaded.github.token, Some(String::new()));

        let again = Secrets::create_template_at(&path);
        assert!(again.unwrap_err().to_string().contains("already exists"));
    }
}
