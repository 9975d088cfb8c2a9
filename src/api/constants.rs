//! API constants for Microsoft Graph and the Microsoft identity platform

use reqwest::Url;

use super::error::{GraphError, GraphResult};

/// Default Microsoft Graph endpoint, including the API version
pub const GRAPH_ENDPOINT: &str = "https://graph.microsoft.com/v1.0";

/// Default identity provider authority
pub const LOGIN_ENDPOINT: &str = "https://login.microsoftonline.com";

/// Application ID of the Microsoft Graph service principal
pub const GRAPH_RESOURCE_APP_ID: &str = "00000003-0000-0000-c000-000000000000";

/// Expiry stamped on every secret issued by a rotation
pub const SECRET_END_DATE: &str = "2099-12-31T23:59:59Z";

/// Display name stamped on every secret issued by a rotation
pub const SECRET_DISPLAY_NAME: &str = "M365 Admin Auto-Generated Secret";

/// Standard headers for Graph requests
pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";

    /// Correlation header echoed back by Graph in its diagnostics
    pub const CLIENT_REQUEST_ID: &str = "client-request-id";
}

/// Resource paths consumed by the domain operations
pub mod paths {
    pub const USERS: &str = "/users";
    pub const DOMAINS: &str = "/domains";
    pub const SUBSCRIBED_SKUS: &str = "/subscribedSkus";
    pub const DIRECTORY_ROLES: &str = "/directoryRoles";
    pub const ORGANIZATION: &str = "/organization";
    pub const APPLICATIONS: &str = "/applications";
    pub const SPO_PROBE: &str = "/sites/root/drive/root/permissions";
}

/// Application permissions granted by `configure_application_permissions`,
/// as (permission name, app role id) on the Microsoft Graph resource.
pub const REQUIRED_GRAPH_PERMISSIONS: &[(&str, &str)] = &[
    ("User.ReadWrite.All", "741f803b-c850-494e-b5df-cde7c675a1ca"),
    ("Directory.ReadWrite.All", "19dbc75e-c2e2-444c-a770-ec69d8559fc7"),
    ("Organization.Read.All", "498476ce-e0fe-48b0-b801-37ba7e2685c6"),
    ("Reports.Read.All", "230c1aed-a721-4c5d-9cb4-a90514e508ef"),
    ("RoleManagement.ReadWrite.Directory", "9e3f62cf-ca93-4989-b6ce-bf83c28f9fe8"),
    ("Domain.ReadWrite.All", "7e05723c-0bb0-42da-be95-ae9f08a6e53c"),
    ("Application.ReadWrite.All", "1bfefb4e-e0b5-418b-a88f-73c46d2cc8e9"),
    ("Sites.FullControl.All", "a82116e5-55eb-4c41-a434-62fe8a61c773"),
];

/// Build the URL for a Graph path
pub fn graph_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Build the client-credentials token endpoint for a directory
pub fn token_endpoint(login_endpoint: &str, directory_id: &str) -> String {
    format!(
        "{}/{}/oauth2/v2.0/token",
        login_endpoint.trim_end_matches('/'),
        directory_id
    )
}

/// Scope requested for Graph tokens: the endpoint's origin plus `/.default`
pub fn graph_scope(graph_endpoint: &str) -> GraphResult<String> {
    let url = Url::parse(graph_endpoint).map_err(|e| {
        GraphError::Config(format!("Invalid Graph endpoint '{}': {}", graph_endpoint, e))
    })?;
    Ok(format!("{}/.default", url.origin().ascii_serialization()))
}

/// URL an administrator opens to grant consent for the configured permissions
pub fn admin_consent_url(login_endpoint: &str, directory_id: &str, client_id: &str) -> String {
    format!(
        "{}/{}/adminconsent?client_id={}",
        login_endpoint.trim_end_matches('/'),
        directory_id,
        urlencoding::encode(client_id)
    )
}
