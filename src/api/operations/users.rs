//! User management

use log::{info, warn};

use crate::api::client::GraphClient;
use crate::api::constants::paths;
use crate::api::error::GraphResult;
use crate::api::models::{BatchOutcome, GraphUser, NewUser, UserUpdate};

/// Fields requested when listing users
const USER_SELECT: &str =
    "id,displayName,userPrincipalName,mail,accountEnabled,usageLocation,createdDateTime";

/// Quote a value for use inside an OData string literal
pub(crate) fn odata_quote(value: &str) -> String {
    value.replace('\'', "''")
}

fn user_path(user_id: &str) -> String {
    format!("{}/{}", paths::USERS, urlencoding::encode(user_id))
}

impl GraphClient {
    pub async fn list_users(&self, filter: Option<&str>, top: u32) -> GraphResult<Vec<GraphUser>> {
        let mut query = vec![("$top", top.to_string()), ("$select", USER_SELECT.to_string())];
        if let Some(filter) = filter {
            query.push(("$filter", filter.to_string()));
        }

        self.get(paths::USERS, &query).await?.into_list()
    }

    pub async fn get_user(&self, user_id: &str) -> GraphResult<GraphUser> {
        self.get(&user_path(user_id), &[("$select", USER_SELECT.to_string())])
            .await?
            .into_value()
    }

    pub async fn create_user(&self, user: &NewUser) -> GraphResult<GraphUser> {
        info!("Creating user {}", user.user_principal_name);
        self.post(paths::USERS, &user.to_graph_body()).await?.into_value()
    }

    pub async fn update_user(&self, user_id: &str, update: &UserUpdate) -> GraphResult<()> {
        self.patch(&user_path(user_id), &serde_json::to_value(update)?).await?;
        Ok(())
    }

    pub async fn delete_user(&self, user_id: &str) -> GraphResult<()> {
        info!("Deleting user {}", user_id);
        self.delete(&user_path(user_id)).await?;
        Ok(())
    }

    pub async fn enable_user(&self, user_id: &str) -> GraphResult<()> {
        self.update_user(user_id, &UserUpdate { account_enabled: Some(true), ..Default::default() })
            .await
    }

    pub async fn disable_user(&self, user_id: &str) -> GraphResult<()> {
        self.update_user(user_id, &UserUpdate { account_enabled: Some(false), ..Default::default() })
            .await
    }

    /// Users whose display name or UPN starts with `keyword`
    pub async fn search_users(&self, keyword: &str, top: u32) -> GraphResult<Vec<GraphUser>> {
        let keyword = odata_quote(keyword);
        let filter = format!(
            "startswith(displayName,'{keyword}') or startswith(userPrincipalName,'{keyword}')"
        );
        self.list_users(Some(&filter), top).await
    }

    /// Create users one at a time. A failure is recorded for that user and
    /// the remaining users are still attempted.
    pub async fn batch_create_users(&self, users: &[NewUser]) -> Vec<BatchOutcome> {
        let mut outcomes = Vec::with_capacity(users.len());

        for user in users {
            match self.create_user(user).await {
                Ok(created) => outcomes.push(BatchOutcome::Created(created)),
                Err(e) => {
                    warn!("Failed to create user {}: {}", user.user_principal_name, e);
                    outcomes.push(BatchOutcome::Failed {
                        user_principal_name: user.user_principal_name.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let created = outcomes.iter().filter(|o| o.is_success()).count();
        info!("Batch user creation finished: {}/{} created", created, users.len());
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_odata_quote_doubles_single_quotes() {
        assert_eq!(odata_quote("o'brien"), "o''brien");
        assert_eq!(odata_quote("plain"), "plain");
    }

    #[test]
    fn test_user_path_encodes_upn() {
        assert_eq!(user_path("ada#EXT#@contoso.com"), "/users/ada%23EXT%23%40contoso.com");
    }

    #[test]
    fn test_enable_body() {
        let update = UserUpdate { account_enabled: Some(true), ..Default::default() };
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, json!({"accountEnabled": true}));
    }
}
