use anyhow::Result;
use clap::{Args, Subcommand};

use crate::api::TenantManager;
use crate::cli::ui;

#[derive(Args)]
pub struct RoleCommands {
    #[command(subcommand)]
    pub command: RoleSubcommands,
}

#[derive(Subcommand)]
pub enum RoleSubcommands {
    /// List activated directory roles
    List,
    /// List the members of a role
    Members { role_id: String },
    /// Add a user to a role
    Assign { role_id: String, user_id: String },
    /// Remove a user from a role
    Revoke {
        role_id: String,
        user_id: String,
        /// Force removal without confirmation
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn handle_role_command(
    cmd: RoleCommands,
    manager: &TenantManager,
    tenant: Option<&str>,
) -> Result<()> {
    let (_, client) = manager.client(tenant)?;

    match cmd.command {
        RoleSubcommands::List => {
            let roles = client.list_directory_roles().await?;
            ui::heading("Directory roles:");
            for role in &roles {
                println!(
                    "  {:<38} {}",
                    role.id,
                    role.display_name.as_deref().unwrap_or("-")
                );
            }
            println!();
        }
        RoleSubcommands::Members { role_id } => {
            let members = client.role_members(&role_id).await?;
            if members.is_empty() {
                ui::warning("Role has no members");
                return Ok(());
            }
            ui::heading("Members:");
            for member in &members {
                println!(
                    "  {:<38} {:<40} {}",
                    member.id,
                    member.user_principal_name.as_deref().unwrap_or("-"),
                    member.display_name.as_deref().unwrap_or("-")
                );
            }
            println!();
        }
        RoleSubcommands::Assign { role_id, user_id } => {
            client.add_role_member(&role_id, &user_id).await?;
            ui::success(&format!("Added {} to role {}", user_id, role_id));
        }
        RoleSubcommands::Revoke {
            role_id,
            user_id,
            force,
        } => {
            let prompt = format!("Remove {} from role {}?", user_id, role_id);
            if !ui::confirm_destructive(&prompt, force)? {
                println!("Revoke cancelled.");
                return Ok(());
            }
            client.remove_role_member(&role_id, &user_id).await?;
            ui::success(&format!("Removed {} from role {}", user_id, role_id));
        }
    }

    Ok(())
}
