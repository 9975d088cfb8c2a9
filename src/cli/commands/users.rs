use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use std::fs;
use std::path::PathBuf;

use crate::api::models::{GraphUser, NewUser};
use crate::api::{BatchOutcome, TenantManager};
use crate::cli::ui;

#[derive(Args)]
pub struct UserCommands {
    #[command(subcommand)]
    pub command: UserSubcommands,
}

#[derive(Subcommand)]
pub enum UserSubcommands {
    /// List users
    List {
        /// Raw OData filter, e.g. "accountEnabled eq false"
        #[arg(long)]
        filter: Option<String>,
        /// Maximum number of users to return
        #[arg(long)]
        top: Option<u32>,
    },
    /// Find users whose display name or UPN starts with a keyword
    Search {
        keyword: String,
        #[arg(long)]
        top: Option<u32>,
    },
    /// Show one user
    Get {
        /// Object ID or user principal name
        user: String,
    },
    /// Create a user, or several from a JSON file
    Create {
        #[arg(long)]
        display_name: Option<String>,
        /// User principal name, e.g. ada@contoso.com
        #[arg(long)]
        upn: Option<String>,
        /// Defaults to the part of the UPN before '@'
        #[arg(long)]
        mail_nickname: Option<String>,
        /// Initial password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,
        #[arg(long, default_value = "US")]
        usage_location: String,
        /// Do not require a password change at first sign-in
        #[arg(long)]
        no_force_change: bool,
        /// JSON array of users to create one after another
        #[arg(long, conflicts_with_all = ["display_name", "upn"])]
        from_file: Option<PathBuf>,
    },
    /// Enable sign-in for a user
    Enable { user: String },
    /// Block sign-in for a user
    Disable { user: String },
    /// Delete a user
    Delete {
        user: String,
        /// Force deletion without confirmation
        #[arg(short, long)]
        force: bool,
    },
}

pub async fn handle_user_command(
    cmd: UserCommands,
    manager: &TenantManager,
    tenant: Option<&str>,
) -> Result<()> {
    let (_, client) = manager.client(tenant)?;
    let page_size = manager.config().settings.default_page_size;

    match cmd.command {
        UserSubcommands::List { filter, top } => {
            let users = client
                .list_users(filter.as_deref(), top.unwrap_or(page_size))
                .await?;
            print_users(&users);
        }
        UserSubcommands::Search { keyword, top } => {
            let users = client
                .search_users(&keyword, top.unwrap_or(page_size))
                .await?;
            print_users(&users);
        }
        UserSubcommands::Get { user } => {
            let user = client.get_user(&user).await?;
            print_user_details(&user);
        }
        UserSubcommands::Create {
            display_name,
            upn,
            mail_nickname,
            password,
            usage_location,
            no_force_change,
            from_file,
        } => {
            if let Some(path) = from_file {
                let content = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read user file: {:?}", path))?;
                let users: Vec<NewUser> = serde_json::from_str(&content)
                    .with_context(|| format!("Failed to parse user file: {:?}", path))?;
                let outcomes = client.batch_create_users(&users).await;
                print_batch(&outcomes);
                return Ok(());
            }

            let display_name = ui::prompt_text("Display name", display_name)?;
            let user_principal_name = ui::prompt_text("User principal name", upn)?;
            let mail_nickname = mail_nickname.unwrap_or_else(|| {
                user_principal_name
                    .split('@')
                    .next()
                    .unwrap_or(&user_principal_name)
                    .to_string()
            });
            let new_user = NewUser {
                display_name,
                user_principal_name,
                mail_nickname,
                password: ui::prompt_secret("Initial password", password)?,
                force_change_password: !no_force_change,
                usage_location,
                account_enabled: true,
            };

            let created = client.create_user(&new_user).await?;
            ui::success(&format!(
                "Created user {} ({})",
                created.user_principal_name.as_deref().unwrap_or("-").bright_green(),
                created.id
            ));
        }
        UserSubcommands::Enable { user } => {
            client.enable_user(&user).await?;
            ui::success(&format!("Enabled {}", user));
        }
        UserSubcommands::Disable { user } => {
            client.disable_user(&user).await?;
            ui::success(&format!("Disabled {}", user));
        }
        UserSubcommands::Delete { user, force } => {
            if !ui::confirm_destructive(&format!("Delete user '{}'?", user), force)? {
                println!("Deletion cancelled.");
                return Ok(());
            }
            client.delete_user(&user).await?;
            ui::success(&format!("Deleted {}", user));
        }
    }

    Ok(())
}

fn print_users(users: &[GraphUser]) {
    if users.is_empty() {
        ui::warning("No users found");
        return;
    }

    ui::heading(&format!("{} users:", users.len()));
    for user in users {
        let status = if user.account_enabled {
            "enabled".bright_green()
        } else {
            "disabled".bright_red()
        };
        println!(
            "  {:<40} {:<30} {}",
            user.user_principal_name.as_deref().unwrap_or("-"),
            user.display_name.as_deref().unwrap_or("-"),
            status
        );
    }
    println!();
}

fn print_user_details(user: &GraphUser) {
    ui::heading(user.display_name.as_deref().unwrap_or(&user.id));
    println!("  ID:              {}", user.id);
    println!("  UPN:             {}", user.user_principal_name.as_deref().unwrap_or("-"));
    println!("  Mail:            {}", user.mail.as_deref().unwrap_or("-"));
    println!("  Enabled:         {}", ui::yes_no(user.account_enabled));
    println!("  Usage location:  {}", user.usage_location.as_deref().unwrap_or("-"));
    println!("  Created:         {}", user.created_date_time.as_deref().unwrap_or("-"));
    println!();
}

fn print_batch(outcomes: &[BatchOutcome]) {
    let created = outcomes.iter().filter(|o| o.is_success()).count();

    for outcome in outcomes {
        match outcome {
            BatchOutcome::Created(user) => ui::success(&format!(
                "Created {}",
                user.user_principal_name.as_deref().unwrap_or(&user.id)
            )),
            BatchOutcome::Failed {
                user_principal_name,
                error,
            } => ui::failure(&format!("{}: {}", user_principal_name, error)),
        }
    }
    println!();
    println!("{} of {} users created", created, outcomes.len());
}
