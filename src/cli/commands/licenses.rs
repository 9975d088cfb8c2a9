use anyhow::Result;
use colored::*;

use crate::api::TenantManager;
use crate::cli::ui;

pub async fn licenses_command(manager: &TenantManager, tenant: Option<&str>) -> Result<()> {
    let (name, records) = manager.license_summary(tenant).await?;

    if records.is_empty() {
        ui::warning(&format!("No subscribed licenses for '{}'", name));
        return Ok(());
    }

    ui::heading(&format!("Licenses for {}:", name));
    println!(
        "  {:<40} {:>8} {:>8} {:>9}",
        "SKU".bold(),
        "Enabled".bold(),
        "Used".bold(),
        "Available".bold()
    );
    for record in &records {
        let available = record.available_units();
        let available = if available < 0 {
            available.to_string().bright_red()
        } else if available == 0 {
            available.to_string().bright_yellow()
        } else {
            available.to_string().bright_green()
        };
        println!(
            "  {:<40} {:>8} {:>8} {:>9}",
            record.display_name, record.enabled_units, record.consumed_units, available
        );
    }
    println!();
    Ok(())
}
