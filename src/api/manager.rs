use anyhow::{Context, Result};
use log::{error, info, warn};
use thiserror::Error;

use super::auth::ClientCredentialsProvider;
use super::client::GraphClient;
use super::constants;
use super::models::{PermissionConfiguration, SecretRotation, SkuRecord, SpoProbe, TenantCredential};
use super::operations::SkuCatalog;
use crate::config::Config;

/// Outcome of configuring an application's Graph permissions
#[derive(Debug, Clone)]
pub struct PermissionSetup {
    pub configuration: PermissionConfiguration,
    /// Where an administrator grants consent for the configured permissions
    pub admin_consent_url: String,
}

/// A secret Graph issued that could not be written to the tenant record.
///
/// Carries the rotation so the caller can still hand the secret to the
/// operator; the old secret may already be gone.
#[derive(Debug, Error)]
#[error("New secret {} was issued for tenant '{tenant}' but could not be saved", .rotation.key_id)]
pub struct UnsavedSecret {
    pub tenant: String,
    pub rotation: SecretRotation,
    #[source]
    pub source: anyhow::Error,
}

/// Runs tenant-level operations against the stored tenants.
///
/// A fresh `GraphClient` is built for every operation so no token is shared
/// between tenants or outlives the call that acquired it.
pub struct TenantManager {
    config: Config,
}

impl TenantManager {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Graph client for the named tenant, or the current one
    pub fn client(&self, tenant: Option<&str>) -> Result<(String, GraphClient)> {
        let (name, record) = self.config.resolve_tenant(tenant)?;
        if !record.is_active {
            warn!("Tenant '{}' is marked inactive", name);
        }

        let client = GraphClient::for_tenant(record.credential(), &self.config.settings)
            .with_context(|| format!("Failed to create Graph client for tenant '{}'", name))?;
        Ok((name, client))
    }

    /// Check that the identity provider accepts a set of credentials
    pub async fn validate_credential(&self, credential: TenantCredential) -> Result<()> {
        let settings = &self.config.settings;
        let directory_id = credential.directory_id.clone();
        let provider = ClientCredentialsProvider::new(
            credential,
            &settings.login_endpoint,
            &settings.graph_endpoint,
        )?;

        provider
            .validate()
            .await
            .with_context(|| format!("Credential check failed for directory {}", directory_id))
    }

    pub async fn validate_tenant(&self, tenant: Option<&str>) -> Result<String> {
        let (name, record) = self.config.resolve_tenant(tenant)?;
        info!("Validating tenant: {}", name);

        self.validate_credential(record.credential()).await?;
        Ok(name)
    }

    /// Probe SharePoint Online and store the result on the tenant record
    pub async fn check_sharepoint(&mut self, tenant: Option<&str>) -> Result<(String, SpoProbe)> {
        let (name, client) = self.client(tenant)?;
        let probe = client.check_sharepoint_status().await;
        info!("SharePoint status for {}: {}", name, probe.status);

        self.config
            .update_tenant(&name, |record| record.record_spo_probe(&probe))?;
        Ok((name, probe))
    }

    /// Issue a new application secret and store it on the tenant record.
    ///
    /// The record is only updated once Graph has issued the secret; a failed
    /// cleanup of the old secret does not prevent the update. If the update
    /// cannot be saved the error is an [`UnsavedSecret`] holding the rotation.
    pub async fn rotate_secret(
        &mut self,
        tenant: Option<&str>,
        delete_old: bool,
    ) -> Result<(String, SecretRotation)> {
        let (name, client) = self.client(tenant)?;
        let application_id = client_application_id(&self.config, &name)?;

        let rotation = client
            .rotate_application_secret(&application_id, delete_old)
            .await
            .with_context(|| format!("Secret rotation failed for tenant '{}'", name))?;

        let secret = rotation.secret_text.clone();
        let expires_at = rotation.expires_at();
        if let Err(source) = self
            .config
            .update_tenant(&name, |record| record.record_new_secret(secret, expires_at))
        {
            error!(
                "Secret {} issued for tenant '{}' was not saved: {:#}",
                rotation.key_id, name, source
            );
            return Err(UnsavedSecret {
                tenant: name,
                rotation,
                source,
            }
            .into());
        }

        Ok((name, rotation))
    }

    pub async fn configure_permissions(&self, tenant: Option<&str>) -> Result<(String, PermissionSetup)> {
        let (name, client) = self.client(tenant)?;
        let (_, record) = self.config.resolve_tenant(Some(&name))?;

        let configuration = client
            .configure_application_permissions(&record.application_id)
            .await
            .with_context(|| format!("Permission configuration failed for tenant '{}'", name))?;

        let admin_consent_url = constants::admin_consent_url(
            &self.config.settings.login_endpoint,
            &record.directory_id,
            &record.application_id,
        );

        Ok((
            name,
            PermissionSetup {
                configuration,
                admin_consent_url,
            },
        ))
    }

    pub async fn license_summary(&self, tenant: Option<&str>) -> Result<(String, Vec<SkuRecord>)> {
        let (name, client) = self.client(tenant)?;
        let catalog = match &self.config.settings.sku_catalog_path {
            Some(path) => SkuCatalog::load(path),
            None => SkuCatalog::default(),
        };

        let records = client.license_summary(&catalog).await?;
        Ok((name, records))
    }
}

fn client_application_id(config: &Config, name: &str) -> Result<String> {
    config
        .get_tenant(name)
        .map(|record| record.application_id.clone())
        .with_context(|| format!("Tenant '{}' not found", name))
}
