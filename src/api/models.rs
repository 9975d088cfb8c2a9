use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials of one tenant's application registration.
/// Handed to the Graph layer by value; never persisted from there.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantCredential {
    pub directory_id: String,
    pub application_id: String,
    pub application_secret: String,
    #[serde(default)]
    pub secret_expiry: Option<DateTime<Utc>>,
}

impl fmt::Debug for TenantCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantCredential")
            .field("directory_id", &self.directory_id)
            .field("application_id", &self.application_id)
            .field("application_secret", &"[REDACTED]")
            .field("secret_expiry", &self.secret_expiry)
            .finish()
    }
}

/// OData collection envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ODataList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphUser {
    pub id: String,
    pub display_name: Option<String>,
    pub user_principal_name: Option<String>,
    pub mail: Option<String>,
    #[serde(default)]
    pub account_enabled: bool,
    pub usage_location: Option<String>,
    pub created_date_time: Option<String>,
}

/// Input for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub display_name: String,
    pub user_principal_name: String,
    pub mail_nickname: String,
    pub password: String,
    #[serde(default = "default_true")]
    pub force_change_password: bool,
    #[serde(default = "default_usage_location")]
    pub usage_location: String,
    #[serde(default = "default_true")]
    pub account_enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_usage_location() -> String {
    "US".to_string()
}

impl NewUser {
    /// Graph request body for `POST /users`
    pub fn to_graph_body(&self) -> serde_json::Value {
        serde_json::json!({
            "accountEnabled": self.account_enabled,
            "displayName": self.display_name,
            "mailNickname": self.mail_nickname,
            "userPrincipalName": self.user_principal_name,
            "usageLocation": self.usage_location,
            "passwordProfile": {
                "forceChangePasswordNextSignIn": self.force_change_password,
                "password": self.password,
            }
        })
    }
}

/// Partial update for a user; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_location: Option<String>,
}

/// Per-user result of a batch creation
#[derive(Debug, Clone)]
pub enum BatchOutcome {
    Created(GraphUser),
    Failed { user_principal_name: String, error: String },
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BatchOutcome::Created(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    #[serde(default)]
    pub authentication_type: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub supported_services: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepaidUnits {
    #[serde(default)]
    pub enabled: i64,
    #[serde(default)]
    pub suspended: i64,
    #[serde(default)]
    pub warning: i64,
}

/// Subscribed SKU as returned by Graph
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedSku {
    pub sku_id: String,
    #[serde(default)]
    pub sku_part_number: String,
    #[serde(default)]
    pub consumed_units: i64,
    #[serde(default)]
    pub prepaid_units: PrepaidUnits,
}

/// License summary row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkuRecord {
    pub sku_id: String,
    pub sku_part_number: String,
    pub display_name: String,
    pub consumed_units: i64,
    pub enabled_units: i64,
}

impl SkuRecord {
    /// Not clamped: a negative value means Graph reports more consumed
    /// than enabled units.
    pub fn available_units(&self) -> i64 {
        self.enabled_units - self.consumed_units
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRole {
    pub id: String,
    pub display_name: Option<String>,
    pub description: Option<String>,
    pub role_template_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryObject {
    pub id: String,
    #[serde(rename = "@odata.type")]
    pub odata_type: Option<String>,
    pub display_name: Option<String>,
    pub user_principal_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedDomain {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub is_initial: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: String,
    pub display_name: Option<String>,
    pub country_letter_code: Option<String>,
    pub tenant_type: Option<String>,
    #[serde(default)]
    pub verified_domains: Vec<VerifiedDomain>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordCredential {
    pub key_id: Option<String>,
    pub display_name: Option<String>,
    /// Only present in the response that created the credential
    pub secret_text: Option<String>,
    pub end_date_time: Option<String>,
}

/// Application registration, looked up by its public `appId`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Internal object id used in `/applications/{id}` paths
    pub id: String,
    pub app_id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub password_credentials: Vec<PasswordCredential>,
}

/// What happened to the previously active secret during a rotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// Caller did not ask for deletion
    NotRequested,
    /// No credential existed before the rotation
    NothingToDelete,
    /// The snapshotted credential is the one just created
    SameAsNew { key_id: String },
    Deleted { key_id: String },
    /// Deletion gave up; the new secret is still valid
    Failed { key_id: String, reason: String },
}

impl CleanupOutcome {
    /// Human-readable summary; empty when deletion was not requested
    pub fn summary(&self) -> String {
        match self {
            CleanupOutcome::NotRequested => String::new(),
            CleanupOutcome::NothingToDelete => "nothing to delete: no previous secret".to_string(),
            CleanupOutcome::SameAsNew { key_id } => {
                format!("skipped deletion: previous secret {} is the new secret", key_id)
            }
            CleanupOutcome::Deleted { key_id } => format!("deleted previous secret {}", key_id),
            CleanupOutcome::Failed { key_id, reason } => {
                format!("failed to delete previous secret {}: {}", key_id, reason)
            }
        }
    }
}

/// Result of issuing a new application secret
#[derive(Debug, Clone)]
pub struct SecretRotation {
    pub secret_text: String,
    pub key_id: String,
    pub end_date: String,
    pub cleanup: CleanupOutcome,
}

impl SecretRotation {
    pub fn deletion_summary(&self) -> String {
        self.cleanup.summary()
    }

    /// Parsed `end_date`, if Graph returned a well-formed timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.end_date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PermissionConfiguration {
    pub client_id: String,
    pub permissions_configured: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpoStatus {
    Available,
    Unavailable,
    NoSubscription,
    Unknown,
    Error,
}

impl fmt::Display for SpoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SpoStatus::Available => "available",
            SpoStatus::Unavailable => "unavailable",
            SpoStatus::NoSubscription => "no_subscription",
            SpoStatus::Unknown => "unknown",
            SpoStatus::Error => "error",
        };
        f.write_str(s)
    }
}

/// Point-in-time SharePoint Online availability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpoProbe {
    pub status: SpoStatus,
    pub message: String,
    pub checked_at: DateTime<Utc>,
}

/// Period accepted by the usage report functions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportPeriod {
    #[default]
    D7,
    D30,
    D90,
    D180,
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportPeriod::D7 => "D7",
            ReportPeriod::D30 => "D30",
            ReportPeriod::D90 => "D90",
            ReportPeriod::D180 => "D180",
        };
        f.write_str(s)
    }
}
