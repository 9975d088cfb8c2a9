//! Tenant store management and tenant-level Graph operations

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use log::{error, info};

use crate::api::{CleanupOutcome, SecretRotation, TenantManager, UnsavedSecret};
use crate::auth::Credentials;
use crate::cli::ui;

#[derive(Args)]
pub struct TenantCommands {
    #[command(subcommand)]
    pub command: TenantSubcommands,
}

#[derive(Subcommand)]
pub enum TenantSubcommands {
    /// Register a tenant's application credentials
    Add {
        /// Name for this tenant (e.g., "contoso")
        name: String,
        /// Directory (tenant) ID
        #[arg(long)]
        directory_id: Option<String>,
        /// Application (client) ID
        #[arg(long)]
        client_id: Option<String>,
        /// Application client secret
        #[arg(long)]
        client_secret: Option<String>,
        /// Import credentials from M365_* environment variables
        #[arg(long)]
        from_env: bool,
        /// Import credentials from the specified .env file
        #[arg(long)]
        from_env_file: Option<String>,
        /// Free-form note stored with the tenant
        #[arg(long)]
        remarks: Option<String>,
        /// Save without checking the credentials first
        #[arg(long)]
        skip_validation: bool,
    },
    /// List stored tenants
    List,
    /// Remove a stored tenant
    Remove {
        name: String,
        /// Force removal without confirmation
        #[arg(short, long)]
        force: bool,
    },
    /// Select the tenant used when --tenant is not given
    Select { name: String },
    /// Check that the tenant's credentials are accepted
    Validate,
    /// Probe SharePoint Online availability and store the result
    SpoStatus,
    /// Issue a new client secret for the tenant's application
    RotateSecret {
        /// Remove the previously active secret after issuing the new one
        #[arg(long)]
        delete_old: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Grant the tenant's application the Graph permissions this tool uses
    ConfigurePermissions,
}

pub async fn handle_tenant_command(
    cmd: TenantCommands,
    manager: &mut TenantManager,
    tenant: Option<&str>,
) -> Result<()> {
    match cmd.command {
        TenantSubcommands::Add {
            name,
            directory_id,
            client_id,
            client_secret,
            from_env,
            from_env_file,
            remarks,
            skip_validation,
        } => {
            let credentials = if from_env {
                Credentials::from_env()?
            } else if let Some(path) = from_env_file {
                Credentials::from_env_file(&path)?
            } else {
                Credentials::from_command_line(
                    ui::prompt_text("Directory (tenant) ID", directory_id)?,
                    ui::prompt_text("Application (client) ID", client_id)?,
                    ui::prompt_secret("Application client secret", client_secret)?,
                )
            };
            add_tenant(manager, name, credentials, remarks, skip_validation).await
        }
        TenantSubcommands::List => list_tenants(manager),
        TenantSubcommands::Remove { name, force } => remove_tenant(manager, &name, force),
        TenantSubcommands::Select { name } => {
            manager.config_mut().set_current_tenant(name.clone())?;
            ui::success(&format!("Selected tenant '{}'", name.bright_green().bold()));
            Ok(())
        }
        TenantSubcommands::Validate => {
            println!("Testing authentication...");
            let name = manager.validate_tenant(tenant).await?;
            ui::success(&format!("Credentials for '{}' are valid", name));
            Ok(())
        }
        TenantSubcommands::SpoStatus => {
            let (name, probe) = manager.check_sharepoint(tenant).await?;
            println!(
                "SharePoint Online for {}: {} ({})",
                name.bright_white().bold(),
                probe.status.to_string().cyan().bold(),
                probe.message
            );
            Ok(())
        }
        TenantSubcommands::RotateSecret { delete_old, force } => {
            rotate_secret(manager, tenant, delete_old, force).await
        }
        TenantSubcommands::ConfigurePermissions => {
            let (name, setup) = manager.configure_permissions(tenant).await?;
            ui::success(&format!("Configured permissions for '{}'", name));
            for permission in &setup.configuration.permissions_configured {
                println!("  • {}", permission);
            }
            println!();
            println!("Grant admin consent at:");
            println!("  {}", setup.admin_consent_url.cyan());
            Ok(())
        }
    }
}

async fn add_tenant(
    manager: &mut TenantManager,
    name: String,
    credentials: Credentials,
    remarks: Option<String>,
    skip_validation: bool,
) -> Result<()> {
    info!("Adding tenant: {}", name);
    let record = credentials.into_record(remarks);

    if !skip_validation {
        println!("Testing authentication...");
        match manager.validate_credential(record.credential()).await {
            Ok(()) => ui::success("Authentication test successful"),
            Err(e) => {
                error!("Authentication test failed: {:#}", e);
                ui::report_error(&e);
                if !ui::prompt_confirmation("Save tenant anyway?", false)? {
                    println!("Add cancelled.");
                    return Ok(());
                }
            }
        }
    }

    manager.config_mut().add_tenant(name.clone(), record)?;
    ui::success(&format!("Tenant '{}' saved", name.bright_green().bold()));

    if manager.config().get_current_tenant_name() == Some(&name) {
        ui::success("Set as current tenant");
    }
    Ok(())
}

fn list_tenants(manager: &TenantManager) -> Result<()> {
    let config = manager.config();
    let tenants = config.list_tenants();

    if tenants.is_empty() {
        ui::warning("No tenants configured");
        println!("  {}", "Run 'm365-admin tenant add <name>' to add one.".dimmed());
        return Ok(());
    }

    ui::heading("Configured tenants:");
    for (name, record) in tenants {
        let current = config.get_current_tenant_name() == Some(name);
        let (marker, label) = if current {
            ("●", format!("{} (current)", name).bright_green().bold())
        } else {
            ("○", name.white())
        };
        let spo = record
            .spo_status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unchecked".to_string());
        let expiry = record
            .secret_expires_at
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        println!(
            "  {} {} → {} (app {}, spo {}, secret expires {}, active {})",
            marker.bright_green(),
            label,
            record.directory_id.cyan(),
            record.application_id.bright_yellow(),
            spo,
            expiry,
            ui::yes_no(record.is_active)
        );
        if let Some(remarks) = &record.remarks {
            println!("      {}", remarks.dimmed());
        }
    }
    println!();
    Ok(())
}

fn remove_tenant(manager: &mut TenantManager, name: &str, force: bool) -> Result<()> {
    if manager.config().get_tenant(name).is_none() {
        anyhow::bail!("Tenant '{}' not found", name);
    }
    if manager.config().get_current_tenant_name().map(|s| s.as_str()) == Some(name) {
        ui::warning(&format!("'{}' is the current tenant", name));
    }

    if !ui::confirm_destructive(&format!("Remove tenant '{}'?", name), force)? {
        println!("Removal cancelled.");
        return Ok(());
    }

    manager.config_mut().remove_tenant(name)?;
    ui::success(&format!("Tenant '{}' removed", name));
    Ok(())
}

async fn rotate_secret(
    manager: &mut TenantManager,
    tenant: Option<&str>,
    delete_old: bool,
    force: bool,
) -> Result<()> {
    let prompt = if delete_old {
        "Issue a new client secret and delete the current one?"
    } else {
        "Issue a new client secret?"
    };
    if !ui::confirm_destructive(prompt, force)? {
        println!("Rotation cancelled.");
        return Ok(());
    }

    let (name, rotation) = match manager.rotate_secret(tenant, delete_old).await {
        Ok(rotated) => rotated,
        Err(e) => {
            if let Some(unsaved) = e.downcast_ref::<UnsavedSecret>() {
                ui::failure(&format!(
                    "Issued new secret for '{}' but could not save it",
                    unsaved.tenant
                ));
                print_rotation(&unsaved.rotation);
                ui::warning("Copy this secret now: it is not stored anywhere else.");
            }
            return Err(e);
        }
    };

    ui::success(&format!("Issued new secret for '{}'", name.bright_green().bold()));
    print_rotation(&rotation);
    println!("  {}", "The new secret has been saved to the tenant record.".dimmed());
    Ok(())
}

fn print_rotation(rotation: &SecretRotation) {
    println!("  Key ID:     {}", rotation.key_id);
    println!("  Expires:    {}", rotation.end_date);
    println!("  Secret:     {}", rotation.secret_text.bright_yellow().bold());

    match &rotation.cleanup {
        CleanupOutcome::NotRequested => {}
        CleanupOutcome::Failed { .. } => ui::warning(&rotation.deletion_summary()),
        _ => println!("  {}", rotation.deletion_summary()),
    }
}
