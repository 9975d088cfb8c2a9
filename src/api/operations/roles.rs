//! Directory roles and their members

use log::info;
use serde_json::json;

use crate::api::client::GraphClient;
use crate::api::constants::paths;
use crate::api::error::GraphResult;
use crate::api::models::{DirectoryObject, DirectoryRole};

fn role_path(role_id: &str) -> String {
    format!("{}/{}", paths::DIRECTORY_ROLES, urlencoding::encode(role_id))
}

impl GraphClient {
    /// Activated directory roles in the tenant
    pub async fn list_directory_roles(&self) -> GraphResult<Vec<DirectoryRole>> {
        self.get(paths::DIRECTORY_ROLES, &[]).await?.into_list()
    }

    pub async fn role_members(&self, role_id: &str) -> GraphResult<Vec<DirectoryObject>> {
        let path = format!("{}/members", role_path(role_id));
        self.get(&path, &[]).await?.into_list()
    }

    pub async fn add_role_member(&self, role_id: &str, user_id: &str) -> GraphResult<()> {
        info!("Assigning role {} to {}", role_id, user_id);
        let path = format!("{}/members/$ref", role_path(role_id));
        let body = json!({
            "@odata.id": format!(
                "{}/directoryObjects/{}",
                self.base_url().trim_end_matches('/'),
                urlencoding::encode(user_id)
            )
        });
        self.post(&path, &body).await?;
        Ok(())
    }

    pub async fn remove_role_member(&self, role_id: &str, user_id: &str) -> GraphResult<()> {
        info!("Removing role {} from {}", role_id, user_id);
        let path = format!(
            "{}/members/{}/$ref",
            role_path(role_id),
            urlencoding::encode(user_id)
        );
        self.delete(&path).await?;
        Ok(())
    }
}
