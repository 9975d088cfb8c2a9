//! SharePoint Online availability probe
//!
//! Reads the permissions of the root site's drive and maps the outcome to a
//! status. It is a point-in-time check; callers re-run it when they need a
//! fresh answer.

use chrono::Utc;
use log::{info, warn};
use serde_json::Value;

use crate::api::client::GraphClient;
use crate::api::constants::paths;
use crate::api::models::{SpoProbe, SpoStatus};

/// Map a probe response onto a status and message
pub fn classify_spo_response(status: u16, body: Option<&Value>) -> (SpoStatus, String) {
    match status {
        200 => match body {
            Some(body) => match body.get("value") {
                Some(Value::Array(items)) if !items.is_empty() => {
                    (SpoStatus::Available, "SharePoint Online is available".to_string())
                }
                // an absent list counts as empty
                Some(Value::Array(_)) | None => {
                    (SpoStatus::Unavailable, "SharePoint Online is unavailable".to_string())
                }
                Some(_) => (
                    SpoStatus::Error,
                    "Check failed: permission list has an unexpected shape".to_string(),
                ),
            },
            None => (
                SpoStatus::Error,
                "Check failed: response body is not JSON".to_string(),
            ),
        },
        400 => (
            SpoStatus::NoSubscription,
            "No SharePoint Online subscription".to_string(),
        ),
        404 | 429 | 502 => (SpoStatus::Unavailable, "SharePoint Online is unavailable".to_string()),
        other => (SpoStatus::Unknown, format!("Unknown status (HTTP {})", other)),
    }
}

impl GraphClient {
    /// Never fails: transport and authentication problems are reported as
    /// `SpoStatus::Error` with the underlying message.
    pub async fn check_sharepoint_status(&self) -> SpoProbe {
        let (status, message) = match self.probe(paths::SPO_PROBE).await {
            Ok((code, body)) => classify_spo_response(code, body.as_ref()),
            Err(e) => {
                warn!("SharePoint probe failed: {}", e);
                (SpoStatus::Error, format!("Check failed: {}", e))
            }
        };

        info!("SharePoint Online status: {}", status);
        SpoProbe {
            status,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_200_with_permissions_is_available() {
        let body = json!({"value": [{"id": "perm-1"}]});
        assert_eq!(classify_spo_response(200, Some(&body)).0, SpoStatus::Available);
    }

    #[test]
    fn test_200_with_empty_list_is_unavailable() {
        let body = json!({"value": []});
        assert_eq!(classify_spo_response(200, Some(&body)).0, SpoStatus::Unavailable);
    }

    #[test]
    fn test_200_without_value_key_is_unavailable() {
        let body = json!({});
        assert_eq!(classify_spo_response(200, Some(&body)).0, SpoStatus::Unavailable);
    }

    #[test]
    fn test_200_with_non_json_body_is_error() {
        let (status, message) = classify_spo_response(200, None);
        assert_eq!(status, SpoStatus::Error);
        assert!(message.starts_with("Check failed"));
    }

    #[test]
    fn test_400_is_no_subscription() {
        assert_eq!(classify_spo_response(400, None).0, SpoStatus::NoSubscription);
    }

    #[test]
    fn test_throttled_and_gateway_errors_are_unavailable() {
        for status in [404, 429, 502] {
            assert_eq!(classify_spo_response(status, None).0, SpoStatus::Unavailable);
        }
    }

    #[test]
    fn test_other_statuses_are_unknown() {
        for status in [401, 403, 500, 503] {
            let (spo, message) = classify_spo_response(status, None);
            assert_eq!(spo, SpoStatus::Unknown);
            assert!(message.contains(&status.to_string()));
        }
    }
}
