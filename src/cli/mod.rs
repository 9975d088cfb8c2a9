pub mod app;
pub mod commands;
pub mod ui;

pub use app::{Cli, Commands};

use anyhow::Result;
use log::info;

use crate::api::TenantManager;
use crate::config::Config;

/// Load the config and dispatch a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let mut manager = TenantManager::new(config);
    let tenant = cli.tenant.as_deref();

    info!("Dispatching command");
    match cli.command {
        Commands::Tenant(cmd) => commands::tenant::handle_tenant_command(cmd, &mut manager, tenant).await,
        Commands::Users(cmd) => commands::users::handle_user_command(cmd, &manager, tenant).await,
        Commands::Domains(cmd) => commands::domains::handle_domain_command(cmd, &manager, tenant).await,
        Commands::Licenses => commands::licenses::licenses_command(&manager, tenant).await,
        Commands::Roles(cmd) => commands::roles::handle_role_command(cmd, &manager, tenant).await,
        Commands::Org => commands::org::org_command(&manager, tenant).await,
        Commands::Reports(cmd) => commands::reports::handle_report_command(cmd, &manager, tenant).await,
    }
}
