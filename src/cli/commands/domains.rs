use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;

use crate::api::TenantManager;
use crate::api::models::Domain;
use crate::cli::ui;

#[derive(Args)]
pub struct DomainCommands {
    #[command(subcommand)]
    pub command: DomainSubcommands,
}

#[derive(Subcommand)]
pub enum DomainSubcommands {
    /// List the tenant's domains
    List,
    /// Add a custom domain
    Add { name: String },
    /// Verify ownership of a domain
    Verify { name: String },
    /// Remove a domain
    Remove {
        name: String,
        /// Force removal without confirmation
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn handle_domain_command(
    cmd: DomainCommands,
    manager: &TenantManager,
    tenant: Option<&str>,
) -> Result<()> {
    let (_, client) = manager.client(tenant)?;

    match cmd.command {
        DomainSubcommands::List => {
            let domains = client.list_domains().await?;
            print_domains(&domains);
        }
        DomainSubcommands::Add { name } => {
            let domain = client.create_domain(&name).await?;
            ui::success(&format!("Added domain {}", domain.id.bright_green()));
            if !domain.is_verified {
                println!("  Add the DNS records shown in the admin center, then run 'm365-admin domains verify {}'", domain.id);
            }
        }
        DomainSubcommands::Verify { name } => {
            let domain = client.verify_domain(&name).await?;
            if domain.is_verified {
                ui::success(&format!("Domain {} verified", domain.id));
            } else {
                ui::warning(&format!("Domain {} is not verified yet", domain.id));
            }
        }
        DomainSubcommands::Remove { name, force } => {
            if !ui::confirm_destructive(&format!("Remove domain '{}'?", name), force)? {
                println!("Removal cancelled.");
                return Ok(());
            }
            client.delete_domain(&name).await?;
            ui::success(&format!("Removed domain {}", name));
        }
    }

    Ok(())
}

fn print_domains(domains: &[Domain]) {
    if domains.is_empty() {
        ui::warning("No domains found");
        return;
    }

    ui::heading("Domains:");
    for domain in domains {
        let default = if domain.is_default { " (default)".bright_green() } else { "".white() };
        println!(
            "  {:<40} verified {} auth {}{}",
            domain.id,
            ui::yes_no(domain.is_verified),
            domain.authentication_type,
            default
        );
    }
    println!();
}
