//! Microsoft Graph access layer
//!
//! `GraphClient` dispatches authenticated calls for one tenant, re-acquiring
//! its token once on a 401. The domain operations in `operations` are
//! `impl GraphClient` blocks, one file per resource family.

pub mod auth;
pub mod client;
pub mod constants;
pub mod error;
pub mod manager;
pub mod models;
pub mod operations;
pub mod resilience;

pub use auth::{ClientCredentialsProvider, TokenProvider};
pub use client::{GraphClient, GraphResponse};
pub use error::{AuthFailureKind, ErrorCategory, GraphError, GraphResult};
pub use manager::{PermissionSetup, TenantManager, UnsavedSecret};
pub use models::{
    BatchOutcome, CleanupOutcome, ReportPeriod, SecretRotation, SkuRecord, SpoProbe, SpoStatus,
    TenantCredential,
};
pub use operations::SkuCatalog;
pub use resilience::{
    ApiLogger, LogLevel, MonitoringConfig, OperationContext, ResilienceConfig,
    RetryConfig, RetryPolicy,
};
