use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::constants::{GRAPH_ENDPOINT, LOGIN_ENDPOINT};
use crate::api::models::{SpoProbe, SpoStatus, TenantCredential};
use crate::api::resilience::{ResilienceConfig, RetryConfig};

/// One managed Microsoft 365 tenant, keyed by name in `Config::tenants`
#[derive(Clone, Serialize, Deserialize)]
pub struct TenantRecord {
    pub directory_id: String,
    pub application_id: String,
    pub application_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo_status: Option<SpoStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo_checked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

fn default_true() -> bool {
    true
}

impl TenantRecord {
    pub fn new(directory_id: String, application_id: String, application_secret: String) -> Self {
        Self {
            directory_id,
            application_id,
            application_secret,
            secret_expires_at: None,
            remarks: None,
            is_active: true,
            spo_status: None,
            spo_message: None,
            spo_checked_at: None,
            created_at: Utc::now(),
        }
    }

    /// Credentials handed to the Graph layer for one operation
    pub fn credential(&self) -> TenantCredential {
        TenantCredential {
            directory_id: self.directory_id.clone(),
            application_id: self.application_id.clone(),
            application_secret: self.application_secret.clone(),
            secret_expiry: self.secret_expires_at,
        }
    }

    pub fn record_spo_probe(&mut self, probe: &SpoProbe) {
        self.spo_status = Some(probe.status);
        self.spo_message = Some(probe.message.clone());
        self.spo_checked_at = Some(probe.checked_at);
    }

    pub fn record_new_secret(&mut self, secret: String, expires_at: Option<DateTime<Utc>>) {
        self.application_secret = secret;
        self.secret_expires_at = expires_at;
    }
}

impl std::fmt::Debug for TenantRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantRecord")
            .field("directory_id", &self.directory_id)
            .field("application_id", &self.application_id)
            .field("application_secret", &"[REDACTED]")
            .field("secret_expires_at", &self.secret_expires_at)
            .field("is_active", &self.is_active)
            .field("spo_status", &self.spo_status)
            .finish()
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Config {
    pub current_tenant: Option<String>,
    #[serde(default)]
    pub tenants: BTreeMap<String, TenantRecord>,
    #[serde(default)]
    pub settings: Settings,
    /// File this config was loaded from; `None` means the default location
    #[serde(skip)]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_graph_endpoint")]
    pub graph_endpoint: String,
    #[serde(default = "default_login_endpoint")]
    pub login_endpoint: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
    #[serde(default = "default_propagation_delay_ms")]
    pub secret_propagation_delay_ms: u64,
    #[serde(default = "default_cleanup_attempts")]
    pub secret_cleanup_attempts: u32,
    #[serde(default = "default_cleanup_base_delay_ms")]
    pub secret_cleanup_base_delay_ms: u64,
    /// JSON file mapping SKU part numbers to friendly names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku_catalog_path: Option<PathBuf>,
}

fn default_graph_endpoint() -> String {
    GRAPH_ENDPOINT.to_string()
}

fn default_login_endpoint() -> String {
    LOGIN_ENDPOINT.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_page_size() -> u32 {
    100
}

fn default_propagation_delay_ms() -> u64 {
    1000
}

fn default_cleanup_attempts() -> u32 {
    3
}

fn default_cleanup_base_delay_ms() -> u64 {
    1000
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            graph_endpoint: default_graph_endpoint(),
            login_endpoint: default_login_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            default_page_size: default_page_size(),
            secret_propagation_delay_ms: default_propagation_delay_ms(),
            secret_cleanup_attempts: default_cleanup_attempts(),
            secret_cleanup_base_delay_ms: default_cleanup_base_delay_ms(),
            sku_catalog_path: None,
        }
    }
}

impl Settings {
    pub fn resilience(&self) -> ResilienceConfig {
        ResilienceConfig::builder()
            .request_timeout(Duration::from_secs(self.request_timeout_secs))
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .propagation_delay(Duration::from_millis(self.secret_propagation_delay_ms))
            .cleanup_retry(RetryConfig {
                max_attempts: self.secret_cleanup_attempts.max(1),
                base_delay: Duration::from_millis(self.secret_cleanup_base_delay_ms),
                ..RetryConfig::secret_cleanup()
            })
            .build()
    }
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "linux") {
            dirs::config_dir()
                .context("Failed to get XDG config directory")?
                .join("m365-admin")
        } else {
            dirs::home_dir()
                .context("Failed to get home directory")?
                .join(".m365-admin")
        };

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {:?}", config_dir))?;
            info!("Created config directory: {:?}", config_dir);
        }

        Ok(config_dir.join("config.toml"))
    }

    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        debug!("Loading config from: {:?}", config_path);

        if !config_path.exists() {
            info!("Config file doesn't exist, using defaults");
            return Ok(Self {
                path: Some(config_path.to_path_buf()),
                ..Self::default()
            });
        }

        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let mut config: Config = toml::from_str(&config_content)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
        config.path = Some(config_path.to_path_buf());

        debug!("Loaded config with {} tenants", config.tenants.len());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = match &self.path {
            Some(path) => path.clone(),
            None => Self::get_config_path()?,
        };
        debug!("Saving config to: {:?}", config_path);

        let config_content =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, config_content)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        info!("Config saved successfully");
        Ok(())
    }

    pub fn add_tenant(&mut self, name: String, record: TenantRecord) -> Result<()> {
        if self.tenants.contains_key(&name) {
            anyhow::bail!("Tenant '{}' already exists", name);
        }
        if let Some((existing, _)) = self
            .tenants
            .iter()
            .find(|(_, t)| t.directory_id == record.directory_id)
        {
            anyhow::bail!(
                "Directory '{}' is already registered as tenant '{}'",
                record.directory_id,
                existing
            );
        }

        info!("Adding tenant: {}", name);
        self.tenants.insert(name.clone(), record);

        // First tenant becomes the current one
        if self.current_tenant.is_none() {
            self.current_tenant = Some(name.clone());
            info!("Set {} as current tenant", name);
        }

        self.save()
    }

    /// Apply `update` to a stored tenant and persist the result
    pub fn update_tenant<F>(&mut self, name: &str, update: F) -> Result<()>
    where
        F: FnOnce(&mut TenantRecord),
    {
        let record = self
            .tenants
            .get_mut(name)
            .with_context(|| format!("Tenant '{}' not found", name))?;
        update(record);

        info!("Updated tenant: {}", name);
        self.save()
    }

    pub fn get_tenant(&self, name: &str) -> Option<&TenantRecord> {
        self.tenants.get(name)
    }

    pub fn get_current_tenant_name(&self) -> Option<&String> {
        self.current_tenant.as_ref()
    }

    /// The named tenant, or the current one when no name is given
    pub fn resolve_tenant(&self, name: Option<&str>) -> Result<(String, TenantRecord)> {
        let name = match name {
            Some(name) => name.to_string(),
            None => self.current_tenant.clone().context(
                "No tenant selected. Run 'm365-admin tenant select <name>' or pass --tenant",
            )?,
        };

        let record = self
            .tenants
            .get(&name)
            .with_context(|| format!("Tenant '{}' not found", name))?;
        Ok((name, record.clone()))
    }

    pub fn set_current_tenant(&mut self, name: String) -> Result<()> {
        if !self.tenants.contains_key(&name) {
            anyhow::bail!("Tenant '{}' not found", name);
        }

        info!("Setting current tenant to: {}", name);
        self.current_tenant = Some(name);
        self.save()
    }

    /// Tenants sorted by name
    pub fn list_tenants(&self) -> Vec<(&String, &TenantRecord)> {
        self.tenants.iter().collect()
    }

    pub fn remove_tenant(&mut self, name: &str) -> Result<()> {
        if self.tenants.remove(name).is_none() {
            anyhow::bail!("Tenant '{}' not found", name);
        }
        info!("Removing tenant: {}", name);

        if self.current_tenant.as_deref() == Some(name) {
            warn!("Removed current tenant, clearing current selection");
            self.current_tenant = None;
        }

        self.save()
    }

    /// File this config reads from and saves to, when known
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("m365-admin-test-{}", uuid::Uuid::new_v4()))
            .join("config.toml")
    }

    fn temp_config() -> Config {
        let path = temp_config_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        Config::load_from(&path).unwrap()
    }

    fn record(directory_id: &str) -> TenantRecord {
        TenantRecord::new(directory_id.into(), "app-1".into(), "secret".into())
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = temp_config();
        assert!(config.tenants.is_empty());
        assert_eq!(config.settings.graph_endpoint, GRAPH_ENDPOINT);
        assert_eq!(config.settings.secret_cleanup_attempts, 3);
    }

    #[test]
    fn test_first_tenant_becomes_current_and_persists() {
        let mut config = temp_config();
        config.add_tenant("contoso".into(), record("dir-1")).unwrap();
        config.add_tenant("fabrikam".into(), record("dir-2")).unwrap();

        let reloaded = Config::load_from(config.path.as_ref().unwrap()).unwrap();
        assert_eq!(reloaded.current_tenant.as_deref(), Some("contoso"));
        let names: Vec<&String> = reloaded.list_tenants().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["contoso", "fabrikam"]);
        assert_eq!(reloaded.tenants["contoso"].application_secret, "secret");
    }

    #[test]
    fn test_duplicate_directory_rejected() {
        let mut config = temp_config();
        config.add_tenant("contoso".into(), record("dir-1")).unwrap();

        let err = config.add_tenant("other".into(), record("dir-1")).unwrap_err();
        assert!(err.to_string().contains("already registered"));
        assert_eq!(config.tenants.len(), 1);
    }

    #[test]
    fn test_remove_current_clears_selection() {
        let mut config = temp_config();
        config.add_tenant("contoso".into(), record("dir-1")).unwrap();
        config.remove_tenant("contoso").unwrap();

        assert!(config.current_tenant.is_none());
        assert!(config.remove_tenant("contoso").is_err());
        assert!(config.resolve_tenant(None).is_err());
    }

    #[test]
    fn test_update_tenant_records_probe() {
        let mut config = temp_config();
        config.add_tenant("contoso".into(), record("dir-1")).unwrap();

        let probe = SpoProbe {
            status: SpoStatus::NoSubscription,
            message: "No SharePoint subscription".into(),
            checked_at: Utc::now(),
        };
        config
            .update_tenant("contoso", |t| t.record_spo_probe(&probe))
            .unwrap();

        let reloaded = Config::load_from(config.path.as_ref().unwrap()).unwrap();
        let (_, tenant) = reloaded.resolve_tenant(Some("contoso")).unwrap();
        assert_eq!(tenant.spo_status, Some(SpoStatus::NoSubscription));
        assert!(tenant.spo_checked_at.is_some());
    }

    #[test]
    fn test_settings_resilience_uses_configured_delays() {
        let settings = Settings {
            secret_propagation_delay_ms: 5,
            secret_cleanup_attempts: 4,
            secret_cleanup_base_delay_ms: 2,
            ..Settings::default()
        };
        let resilience = settings.resilience();

        assert_eq!(resilience.propagation_delay, Duration::from_millis(5));
        assert_eq!(resilience.cleanup_retry.max_attempts, 4);
        assert_eq!(resilience.cleanup_retry.base_delay, Duration::from_millis(2));
        assert_eq!(resilience.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_partial_settings_fill_defaults() {
        let config: Config = toml::from_str(
            r#"
            [settings]
            graph_endpoint = "http://localhost:9000"
            "#,
        )
        .unwrap();
        assert_eq!(config.settings.graph_endpoint, "http://localhost:9000");
        assert_eq!(config.settings.login_endpoint, LOGIN_ENDPOINT);
        assert_eq!(config.settings.default_page_size, 100);
    }
}
