//! Usage reports, returned by Graph as CSV

use crate::api::client::GraphClient;
use crate::api::error::GraphResult;
use crate::api::models::ReportPeriod;

fn report_path(function: &str, period: ReportPeriod) -> String {
    format!("/reports/{}(period='{}')", function, period)
}

impl GraphClient {
    pub async fn onedrive_usage_report(&self, period: ReportPeriod) -> GraphResult<Vec<u8>> {
        self.get_bytes(&report_path("getOneDriveUsageAccountDetail", period))
            .await
    }

    pub async fn mailbox_usage_report(&self, period: ReportPeriod) -> GraphResult<Vec<u8>> {
        self.get_bytes(&report_path("getMailboxUsageDetail", period)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_path() {
        assert_eq!(
            report_path("getMailboxUsageDetail", ReportPeriod::D30),
            "/reports/getMailboxUsageDetail(period='D30')"
        );
    }
}
