use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::edv::{TlsSettings, TlsVersion};
use crate::errors::{EdvError, Result};
use crate::store::VaultConfig;

/// Project-level configuration, loaded from `.edvault.toml`.
///
/// Every field has a default so a bare `--vault-url` on the command line
/// is enough to get started.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the vault server.
    #[serde(default)]
    pub vault_url: Option<String>,

    /// Vault identifier on that server.
    #[serde(default)]
    pub vault_id: Option<String>,

    /// Store used when none is given on the command line.
    #[serde(default = "default_store")]
    pub default_store: String,

    /// Index keying material (relative to the project root).
    #[serde(default = "default_key_file")]
    pub key_file: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Minimum TLS version: "1.2" or "1.3".
    #[serde(default = "default_tls_min_version")]
    pub tls_min_version: String,

    /// Server name override for TLS.
    #[serde(default)]
    pub tls_server_name: Option<String>,

    /// Extra PEM root certificate.
    #[serde(default)]
    pub tls_ca_file: Option<String>,

    /// Skip certificate verification.
    #[serde(default)]
    pub tls_insecure: bool,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_store() -> String {
    "default".to_string()
}

fn default_key_file() -> String {
    ".edvault/index.key".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_tls_min_version() -> String {
    "1.2".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_url: None,
            vault_id: None,
            default_store: default_store(),
            key_file: default_key_file(),
            timeout_secs: default_timeout_secs(),
            tls_min_version: default_tls_min_version(),
            tls_server_name: None,
            tls_ca_file: None,
            tls_insecure: false,
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".edvault.toml";

    /// Load settings from `<project_dir>/.edvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            EdvError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Full path to the keyfile.
    pub fn key_file_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.key_file)
    }

    /// TLS options for the HTTP transport.
    pub fn tls_settings(&self, project_dir: &Path) -> Result<TlsSettings> {
        Ok(TlsSettings {
            min_version: self.tls_min_version.parse::<TlsVersion>()?,
            server_name: self.tls_server_name.clone(),
            ca_file: self.tls_ca_file.as_ref().map(|p| project_dir.join(p)),
            insecure: self.tls_insecure,
        })
    }

    /// Build the provider configuration, checking that the vault URL and
    /// identifier are present and usable.
    pub fn vault_config(&self, project_dir: &Path) -> Result<VaultConfig> {
        let url = self
            .vault_url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or_else(|| {
                EdvError::Config("no vault URL configured (set vault_url or --vault-url)".into())
            })?;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(EdvError::Config(format!(
                "vault URL '{url}' must start with http:// or https://"
            )));
        }

        let vault_id = self
            .vault_id
            .as_deref()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                EdvError::Config("no vault id configured (set vault_id or --vault-id)".into())
            })?;

        Ok(VaultConfig::new(url, vault_id)
            .with_tls(self.tls_settings(project_dir)?)
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.default_store, "default");
        assert_eq!(s.key_file, ".edvault/index.key");
        assert_eq!(s.timeout_secs, 30);
        assert_eq!(s.tls_min_version, "1.2");
        assert!(s.vault_url.is_none());
        assert!(!s.tls_insecure);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.default_store, "default");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_url = "https://edv.example.com/encrypted-data-vaults"
vault_id = "z4sRgBJJLnYy"
default_store = "credentials"
key_file = "keys/index.key"
timeout_secs = 5
tls_min_version = "1.3"
tls_server_name = "edv.internal"
"#;
        fs::write(tmp.path().join(".edvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(
            settings.vault_url.as_deref(),
            Some("https://edv.example.com/encrypted-data-vaults")
        );
        assert_eq!(settings.vault_id.as_deref(), Some("z4sRgBJJLnYy"));
        assert_eq!(settings.default_store, "credentials");
        assert_eq!(settings.key_file, "keys/index.key");
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.tls_server_name.as_deref(), Some("edv.internal"));
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".edvault.toml"), "not valid {{toml").unwrap();

        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn vault_config_requires_url_and_id() {
        let dir = Path::new("/project");
        assert!(Settings::default().vault_config(dir).is_err());

        let only_url = Settings {
            vault_url: Some("https://edv.example".into()),
            ..Settings::default()
        };
        assert!(only_url.vault_config(dir).is_err());
    }

    #[test]
    fn vault_config_rejects_bad_scheme() {
        let s = Settings {
            vault_url: Some("EDVServerURL".into()),
            vault_id: Some("vaultID".into()),
            ..Settings::default()
        };
        let err = s.vault_config(Path::new("/project")).unwrap_err();
        assert!(err.to_string().contains("must start with http"));
    }

    #[test]
    fn vault_config_carries_tls_and_timeout() {
        let s = Settings {
            vault_url: Some("https://edv.example".into()),
            vault_id: Some("vaultID".into()),
            timeout_secs: 7,
            tls_min_version: "1.3".into(),
            tls_ca_file: Some("ca.pem".into()),
            ..Settings::default()
        };
        let config = s.vault_config(Path::new("/project")).unwrap();
        assert_eq!(config.base_url, "https://edv.example");
        assert_eq!(config.vault_id, "vaultID");
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.tls.min_version, TlsVersion::Tls13);
        assert_eq!(config.tls.ca_file, Some(PathBuf::from("/project/ca.pem")));
    }

    #[test]
    fn vault_config_rejects_unknown_tls_version() {
        let s = Settings {
            vault_url: Some("https://edv.example".into()),
            vault_id: Some("vaultID".into()),
            tls_min_version: "1.0".into(),
            ..Settings::default()
        };
        assert!(s.vault_config(Path::new("/project")).is_err());
    }

    #[test]
    fn key_file_path_is_relative_to_project() {
        let s = Settings::default();
        assert_eq!(
            s.key_file_path(Path::new("/home/user/app")),
            PathBuf::from("/home/user/app/.edvault/index.key")
        );
    }
}
