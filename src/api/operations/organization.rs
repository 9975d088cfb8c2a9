use crate::api::client::GraphClient;
use crate::api::constants::paths;
use crate::api::error::GraphResult;
use crate::api::models::Organization;

impl GraphClient {
    /// The tenant's organization record, if Graph returns one
    pub async fn organization(&self) -> GraphResult<Option<Organization>> {
        let mut orgs: Vec<Organization> = self.get(paths::ORGANIZATION, &[]).await?.into_list()?;
        if orgs.is_empty() {
            Ok(None)
        } else {
            Ok(Some(orgs.swap_remove(0)))
        }
    }
}
