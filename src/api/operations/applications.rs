//! Application registrations: secret rotation and permission setup

use log::{info, warn};
use serde_json::{Value, json};

use crate::api::client::GraphClient;
use crate::api::constants::{
    GRAPH_RESOURCE_APP_ID, REQUIRED_GRAPH_PERMISSIONS, SECRET_DISPLAY_NAME, SECRET_END_DATE, paths,
};
use crate::api::error::{GraphError, GraphResult};
use crate::api::models::{
    Application, CleanupOutcome, PasswordCredential, PermissionConfiguration, SecretRotation,
};
use crate::api::resilience::RetryPolicy;

use super::users::odata_quote;

fn application_path(object_id: &str) -> String {
    format!("{}/{}", paths::APPLICATIONS, object_id)
}

/// `requiredResourceAccess` body granting every permission in
/// `REQUIRED_GRAPH_PERMISSIONS` as an application permission
pub fn required_resource_access() -> Value {
    let resource_access: Vec<Value> = REQUIRED_GRAPH_PERMISSIONS
        .iter()
        .map(|(_, id)| json!({ "id": id, "type": "Role" }))
        .collect();

    json!({
        "requiredResourceAccess": [{
            "resourceAppId": GRAPH_RESOURCE_APP_ID,
            "resourceAccess": resource_access,
        }]
    })
}

impl GraphClient {
    /// Look up an application registration by its public application id
    pub async fn find_application(&self, app_id: &str) -> GraphResult<Application> {
        let filter = format!("appId eq '{}'", odata_quote(app_id));
        let mut apps: Vec<Application> = self
            .get(paths::APPLICATIONS, &[("$filter", filter)])
            .await?
            .into_list()?;

        if apps.is_empty() {
            return Err(GraphError::NotFound(format!(
                "Application with client_id {} not found",
                app_id
            )));
        }
        Ok(apps.swap_remove(0))
    }

    /// Issue a new client secret for the application and optionally remove
    /// the previously active one.
    ///
    /// The first credential Graph lists is taken to be the active one. Graph
    /// does not document its ordering, so with several secrets the wrong one
    /// may be removed. Removal is best effort: once the new secret exists the
    /// call succeeds, and any cleanup failure is reported in
    /// `SecretRotation::cleanup`.
    pub async fn rotate_application_secret(
        &self,
        app_id: &str,
        delete_old: bool,
    ) -> GraphResult<SecretRotation> {
        let application = self.find_application(app_id).await?;

        let previous_key = application
            .password_credentials
            .first()
            .and_then(|c| c.key_id.clone());
        if application.password_credentials.len() > 1 {
            warn!(
                "Application {} has {} secrets; treating the first listed ({:?}) as active",
                app_id,
                application.password_credentials.len(),
                previous_key
            );
        }

        let created = self.add_password(&application.id).await?;
        let key_id = created.key_id.unwrap_or_default();
        let secret_text = created.secret_text.ok_or_else(|| {
            GraphError::UnexpectedResponse("addPassword response did not include secretText".into())
        })?;
        let end_date = created
            .end_date_time
            .unwrap_or_else(|| SECRET_END_DATE.to_string());
        info!("Issued new secret {} for application {}", key_id, app_id);

        let cleanup = match (delete_old, previous_key) {
            (false, _) => CleanupOutcome::NotRequested,
            (true, None) => CleanupOutcome::NothingToDelete,
            (true, Some(previous)) if previous == key_id => {
                CleanupOutcome::SameAsNew { key_id: previous }
            }
            (true, Some(previous)) => self.remove_previous_secret(&application.id, previous).await,
        };

        Ok(SecretRotation {
            secret_text,
            key_id,
            end_date,
            cleanup,
        })
    }

    async fn add_password(&self, object_id: &str) -> GraphResult<PasswordCredential> {
        let body = json!({
            "passwordCredential": {
                "displayName": SECRET_DISPLAY_NAME,
                "endDateTime": SECRET_END_DATE,
            }
        });

        self.post(&format!("{}/addPassword", application_path(object_id)), &body)
            .await?
            .into_value()
    }

    pub async fn remove_password(&self, object_id: &str, key_id: &str) -> GraphResult<()> {
        self.post(
            &format!("{}/removePassword", application_path(object_id)),
            &json!({ "keyId": key_id }),
        )
        .await?;
        Ok(())
    }

    /// Wait for the new secret to propagate, then remove the old one,
    /// retrying only on conflicts.
    async fn remove_previous_secret(&self, object_id: &str, key_id: String) -> CleanupOutcome {
        tokio::time::sleep(self.resilience().propagation_delay).await;

        let policy = RetryPolicy::new(self.resilience().cleanup_retry.clone());
        let result = policy
            .execute(GraphError::is_conflict, |attempt| {
                info!("Removing previous secret {} (attempt {})", key_id, attempt);
                self.remove_password(object_id, &key_id)
            })
            .await;

        match result {
            Ok(()) => {
                info!("Removed previous secret {}", key_id);
                CleanupOutcome::Deleted { key_id }
            }
            Err(e) => {
                warn!("Failed to remove previous secret {}: {}", key_id, e);
                CleanupOutcome::Failed {
                    key_id,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Grant the application the Graph permissions this tool relies on.
    /// Admin consent still has to be given separately.
    pub async fn configure_application_permissions(
        &self,
        app_id: &str,
    ) -> GraphResult<PermissionConfiguration> {
        let application = self.find_application(app_id).await?;

        self.patch(&application_path(&application.id), &required_resource_access())
            .await?;
        info!("Configured permissions for application {}", app_id);

        Ok(PermissionConfiguration {
            client_id: app_id.to_string(),
            permissions_configured: REQUIRED_GRAPH_PERMISSIONS
                .iter()
                .map(|(name, _)| name.to_string())
                .collect(),
        })
    }
}
