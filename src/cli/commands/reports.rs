use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use std::io::Write;
use std::path::PathBuf;

use crate::api::{ReportPeriod, TenantManager};
use crate::cli::ui;

#[derive(Args)]
pub struct ReportCommands {
    #[command(subcommand)]
    pub command: ReportSubcommands,
}

#[derive(Subcommand)]
pub enum ReportSubcommands {
    /// OneDrive usage per account
    Onedrive {
        #[arg(long, value_enum, default_value_t)]
        period: ReportPeriod,
        /// Write the CSV here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Mailbox usage per user
    Mailbox {
        #[arg(long, value_enum, default_value_t)]
        period: ReportPeriod,
        /// Write the CSV here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn handle_report_command(
    cmd: ReportCommands,
    manager: &TenantManager,
    tenant: Option<&str>,
) -> Result<()> {
    let (_, client) = manager.client(tenant)?;

    let (csv, output) = match cmd.command {
        ReportSubcommands::Onedrive { period, output } => {
            (client.onedrive_usage_report(period).await?, output)
        }
        ReportSubcommands::Mailbox { period, output } => {
            (client.mailbox_usage_report(period).await?, output)
        }
    };

    match output {
        Some(path) => {
            std::fs::write(&path, &csv)
                .with_context(|| format!("Failed to write report: {:?}", path))?;
            ui::success(&format!("Saved report to {:?} ({} bytes)", path, csv.len()));
        }
        None => {
            std::io::stdout()
                .write_all(&csv)
                .context("Failed to write report to stdout")?;
        }
    }
    Ok(())
}
