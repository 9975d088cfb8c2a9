use anyhow::Result;
use clap::Parser;
use log::{error, info};

use m365_admin::cli::{self, Cli, ui};

#[tokio::main]
async fn main() -> Result<()> {
    // Log to a file (truncated each run) so terminal output stays clean
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("m365-admin.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    info!("Starting m365-admin");

    if let Err(e) = cli::run(cli).await {
        error!("Command failed: {:#}", e);
        ui::report_error(&e);
        std::process::exit(1);
    }

    Ok(())
}
