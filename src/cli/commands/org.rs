use anyhow::Result;
use colored::*;

use crate::api::TenantManager;
use crate::cli::ui;

pub async fn org_command(manager: &TenantManager, tenant: Option<&str>) -> Result<()> {
    let (name, client) = manager.client(tenant)?;

    let Some(org) = client.organization().await? else {
        ui::warning(&format!("No organization returned for '{}'", name));
        return Ok(());
    };

    ui::heading(org.display_name.as_deref().unwrap_or(&org.id));
    println!("  Tenant ID:  {}", org.id);
    println!("  Country:    {}", org.country_letter_code.as_deref().unwrap_or("-"));
    println!("  Type:       {}", org.tenant_type.as_deref().unwrap_or("-"));
    println!("  Domains:");
    for domain in &org.verified_domains {
        let mut flags = Vec::new();
        if domain.is_default {
            flags.push("default");
        }
        if domain.is_initial {
            flags.push("initial");
        }
        let flags = if flags.is_empty() {
            String::new()
        } else {
            format!(" ({})", flags.join(", "))
        };
        println!("    • {}{}", domain.name.cyan(), flags);
    }
    println!();
    Ok(())
}
