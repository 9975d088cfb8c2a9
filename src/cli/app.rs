use super::commands::domains::DomainCommands;
use super::commands::reports::ReportCommands;
use super::commands::roles::RoleCommands;
use super::commands::tenant::TenantCommands;
use super::commands::users::UserCommands;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "m365-admin")]
#[command(about = "Administer Microsoft 365 tenants through Microsoft Graph")]
pub struct Cli {
    /// Tenant to operate on (defaults to the selected tenant)
    #[arg(short, long, global = true)]
    pub tenant: Option<String>,
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Manage stored tenants and their application credentials
    Tenant(TenantCommands),
    /// User management
    Users(UserCommands),
    /// Domain management
    Domains(DomainCommands),
    /// Show subscribed licenses and remaining seats
    Licenses,
    /// Directory role management
    Roles(RoleCommands),
    /// Show organization details
    Org,
    /// Download usage reports as CSV
    Reports(ReportCommands),
}
