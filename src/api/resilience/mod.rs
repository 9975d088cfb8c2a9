//! Retry, timeout and request logging support for Graph calls

pub mod config;
pub mod logging;
pub mod retry;

pub use config::{LogLevel, MonitoringConfig, ResilienceConfig, ResilienceConfigBuilder};
pub use logging::{ApiLogger, OperationContext};
pub use retry::{RetryConfig, RetryPolicy};
