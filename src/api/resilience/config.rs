//! Resilience configuration with builder pattern
//!
//! Groups the transport timeouts, the secret cleanup retry policy and the
//! request logging switches used by `GraphClient`.

use super::retry::RetryConfig;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ResilienceConfig {
    /// Whole-request timeout applied by the HTTP client
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Wait between issuing a new secret and removing the old one
    pub propagation_delay: Duration,
    /// Retry policy for removing the old secret
    pub cleanup_retry: RetryConfig,
    pub monitoring: MonitoringConfig,
}

/// Monitoring and logging configuration
#[derive(Debug, Clone)]
pub struct MonitoringConfig {
    /// Send a `client-request-id` with every request
    pub correlation_ids: bool,
    pub request_logging: bool,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            propagation_delay: Duration::from_secs(1),
            cleanup_retry: RetryConfig::secret_cleanup(),
            monitoring: MonitoringConfig::default(),
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            correlation_ids: true,
            request_logging: true,
            log_level: LogLevel::Info,
        }
    }
}

impl ResilienceConfig {
    pub fn builder() -> ResilienceConfigBuilder {
        ResilienceConfigBuilder::new()
    }

    /// No waiting and no logging, for tests against a local mock server
    pub fn immediate() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            propagation_delay: Duration::ZERO,
            cleanup_retry: RetryConfig {
                base_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(5),
                ..RetryConfig::secret_cleanup()
            },
            monitoring: MonitoringConfig {
                correlation_ids: true,
                request_logging: false,
                log_level: LogLevel::Error,
            },
        }
    }
}

#[derive(Debug)]
pub struct ResilienceConfigBuilder {
    config: ResilienceConfig,
}

impl ResilienceConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: ResilienceConfig::default(),
        }
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    pub fn propagation_delay(mut self, delay: Duration) -> Self {
        self.config.propagation_delay = delay;
        self
    }

    pub fn cleanup_retry(mut self, retry: RetryConfig) -> Self {
        self.config.cleanup_retry = retry;
        self
    }

    /// Set max attempts for removing the old secret
    pub fn cleanup_attempts(mut self, attempts: u32) -> Self {
        self.config.cleanup_retry.max_attempts = attempts;
        self
    }

    pub fn monitoring_config(mut self, monitoring: MonitoringConfig) -> Self {
        self.config.monitoring = monitoring;
        self
    }

    pub fn correlation_ids(mut self, enabled: bool) -> Self {
        self.config.monitoring.correlation_ids = enabled;
        self
    }

    pub fn request_logging(mut self, enabled: bool) -> Self {
        self.config.monitoring.request_logging = enabled;
        self
    }

    pub fn log_level(mut self, level: LogLevel) -> Self {
        self.config.monitoring.log_level = level;
        self
    }

    pub fn build(self) -> ResilienceConfig {
        self.config
    }
}

impl Default for ResilienceConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
