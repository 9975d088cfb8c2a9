//! Structured logging with correlation tracking for Graph requests
//!
//! Each dispatched request gets a correlation id that is also sent to Graph as
//! `client-request-id`, so a failing call can be matched against the service's
//! own diagnostics.

use super::config::{LogLevel, MonitoringConfig};
use log::{debug, error, info, warn};
use serde_json::json;
use std::time::{Duration, Instant};

/// Structured logger for Graph requests
#[derive(Debug, Clone)]
pub struct ApiLogger {
    config: MonitoringConfig,
}

/// Context for a single dispatched request
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub correlation_id: String,
    pub method: String,
    /// Graph path, without the base URL or query string
    pub path: String,
    pub start_time: Instant,
}

impl ApiLogger {
    pub fn new(config: MonitoringConfig) -> Self {
        Self { config }
    }

    pub fn correlation_ids_enabled(&self) -> bool {
        self.config.correlation_ids
    }

    pub fn start_operation(&self, method: &str, path: &str) -> OperationContext {
        let context = OperationContext {
            correlation_id: uuid::Uuid::new_v4().to_string(),
            method: method.to_string(),
            path: path.to_string(),
            start_time: Instant::now(),
        };

        if self.config.request_logging && self.should_log(LogLevel::Debug) {
            let log_data = json!({
                "event": "graph_request",
                "correlation_id": context.correlation_id,
                "method": context.method,
                "path": context.path,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });

            debug!("Graph Request: {}", log_data);
        }

        context
    }

    pub fn log_response(&self, context: &OperationContext, status_code: u16, attempt: u32) {
        if !self.config.request_logging {
            return;
        }

        let log_data = json!({
            "event": "graph_response",
            "correlation_id": context.correlation_id,
            "method": context.method,
            "path": context.path,
            "status_code": status_code,
            "attempt": attempt,
            "duration_ms": context.elapsed().as_millis(),
        });

        if status_code >= 400 && self.should_log(LogLevel::Warn) {
            warn!("Graph Response (Error): {}", log_data);
        } else if self.should_log(LogLevel::Debug) {
            debug!("Graph Response: {}", log_data);
        }
    }

    /// Token was rejected and is being refreshed before the single retry
    pub fn log_reauthentication(&self, context: &OperationContext) {
        if self.should_log(LogLevel::Info) {
            info!(
                "Graph returned 401 for {} {} ({}), refreshing token and retrying once",
                context.method, context.path, context.correlation_id
            );
        }
    }

    pub fn complete_operation(&self, context: &OperationContext, success: bool, error_message: Option<&str>) {
        if !self.config.request_logging {
            return;
        }

        let log_data = json!({
            "event": "graph_request_completed",
            "correlation_id": context.correlation_id,
            "method": context.method,
            "path": context.path,
            "duration_ms": context.elapsed().as_millis(),
            "success": success,
            "error_message": error_message,
        });

        if success {
            if self.should_log(LogLevel::Info) {
                info!("Graph Request Completed: {}", log_data);
            }
        } else if self.should_log(LogLevel::Error) {
            error!("Graph Request Failed: {}", log_data);
        }
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level <= self.config.log_level
    }
}

impl OperationContext {
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
