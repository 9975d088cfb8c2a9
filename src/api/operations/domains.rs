//! Domain management

use log::info;
use reqwest::Method;
use serde_json::json;

use crate::api::client::GraphClient;
use crate::api::constants::paths;
use crate::api::error::GraphResult;
use crate::api::models::Domain;

fn domain_path(domain_id: &str) -> String {
    format!("{}/{}", paths::DOMAINS, urlencoding::encode(domain_id))
}

impl GraphClient {
    pub async fn list_domains(&self) -> GraphResult<Vec<Domain>> {
        self.get(paths::DOMAINS, &[]).await?.into_list()
    }

    pub async fn get_domain(&self, domain_id: &str) -> GraphResult<Domain> {
        self.get(&domain_path(domain_id), &[]).await?.into_value()
    }

    pub async fn create_domain(&self, domain_name: &str) -> GraphResult<Domain> {
        info!("Adding domain {}", domain_name);
        self.post(paths::DOMAINS, &json!({ "id": domain_name }))
            .await?
            .into_value()
    }

    pub async fn delete_domain(&self, domain_id: &str) -> GraphResult<()> {
        info!("Removing domain {}", domain_id);
        self.delete(&domain_path(domain_id)).await?;
        Ok(())
    }

    /// Ask Graph to check the domain's DNS verification records
    pub async fn verify_domain(&self, domain_id: &str) -> GraphResult<Domain> {
        let path = format!("{}/verify", domain_path(domain_id));
        self.request(Method::POST, &path, None, &[]).await?.into_value()
    }
}
