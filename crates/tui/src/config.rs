use anyhow::{Context, Result};
use directories::ProjectDirs;
use eudiplo_shop_verifier::VerifyRequest;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_ID: &str = "age-over-18";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub verifier: VerifierConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Base URL of the verifier, e.g. `https://verifier.example.com`.
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    /// Presentation configuration to request from the wallet.
    pub config_id: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            client_id: String::new(),
            client_secret: String::new(),
            config_id: DEFAULT_CONFIG_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    BaseUrl,
    ClientId,
    ClientSecret,
    ConfigId,
}

impl ConfigField {
    pub const ALL: [ConfigField; 4] = [
        ConfigField::BaseUrl,
        ConfigField::ClientId,
        ConfigField::ClientSecret,
        ConfigField::ConfigId,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConfigField::BaseUrl => "Server URL",
            ConfigField::ClientId => "Client ID",
            ConfigField::ClientSecret => "Client Secret",
            ConfigField::ConfigId => "Presentation Config",
        }
    }

    pub fn env_var(self) -> &'static str {
        match self {
            ConfigField::BaseUrl => "EUDIPLO_BASE_URL",
            ConfigField::ClientId => "EUDIPLO_CLIENT_ID",
            ConfigField::ClientSecret => "EUDIPLO_CLIENT_SECRET",
            ConfigField::ConfigId => "EUDIPLO_CONFIG_ID",
        }
    }

    pub fn is_secret(self) -> bool {
        matches!(self, ConfigField::ClientSecret)
    }
}

/// Outcome of [`Config::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigReport {
    pub missing: Vec<ConfigField>,
}

impl ConfigReport {
    pub fn is_ready(&self) -> bool {
        self.missing.is_empty()
    }

    pub fn notice(&self) -> Option<String> {
        if self.is_ready() {
            return None;
        }
        let fields = self
            .missing
            .iter()
            .map(|f| f.label())
            .collect::<Vec<_>>()
            .join(", ");
        Some(format!(
            "Setup required: {fields} missing. Press [s] to configure the verifier."
        ))
    }
}

impl Config {
    /// Values of the public demo verifier.
    pub fn demo() -> Self {
        Self {
            verifier: VerifierConfig {
                base_url: "https://demo.eudiplo.dev".to_string(),
                client_id: "demo-wine-shop".to_string(),
                client_secret: "demo-secret-key-2024".to_string(),
                config_id: DEFAULT_CONFIG_ID.to_string(),
            },
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unreadable config: {:#}", e);
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = file.metadata()?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(path, perms)?;
        }
        Ok(())
    }

    /// Overrides file values with non-empty variables from `lookup`.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        for field in ConfigField::ALL {
            if let Some(value) = lookup(field.env_var()).filter(|v| !v.trim().is_empty()) {
                *self.field_mut(field) = value;
            }
        }
        self
    }

    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn validate(&self) -> ConfigReport {
        ConfigReport {
            missing: ConfigField::ALL
                .into_iter()
                .filter(|f| self.field(*f).trim().is_empty())
                .collect(),
        }
    }

    pub fn field(&self, field: ConfigField) -> &str {
        match field {
            ConfigField::BaseUrl => &self.verifier.base_url,
            ConfigField::ClientId => &self.verifier.client_id,
            ConfigField::ClientSecret => &self.verifier.client_secret,
            ConfigField::ConfigId => &self.verifier.config_id,
        }
    }

    pub fn field_mut(&mut self, field: ConfigField) -> &mut String {
        match field {
            ConfigField::BaseUrl => &mut self.verifier.base_url,
            ConfigField::ClientId => &mut self.verifier.client_id,
            ConfigField::ClientSecret => &mut self.verifier.client_secret,
            ConfigField::ConfigId => &mut self.verifier.config_id,
        }
    }

    pub fn verify_request(&self) -> VerifyRequest {
        VerifyRequest {
            base_url: self.verifier.base_url.trim().to_string(),
            client_id: self.verifier.client_id.trim().to_string(),
            client_secret: self.verifier.client_secret.clone(),
            config_id: self.verifier.config_id.trim().to_string(),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("dev", "eudiplo", "eudiplo-shop") {
        proj_dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from("config/default.toml")
    }
}
