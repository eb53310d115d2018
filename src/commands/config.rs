use std::path::{Path, PathBuf};

use anyhow::Result;
use bamboo::core::config::BambooConfig;
use bamboo::core::settings;
use bamboo::core::terminal;
use colored::*;

use super::{print_title, resolver};

pub fn show(vault: Option<PathBuf>, json: bool) -> Result<()> {
    let resolver = resolver(vault)?;
    let config = resolver.config();

    if json {
        println!("{}", serde_json::to_string_pretty(config)?);
        return Ok(());
    }

    print_title("Settings");
    print_config(config, resolver.resolve().as_deref());
    println!();
    println!("{}", "Config files searched:".dimmed());
    for path in resolver.source().candidates() {
        let marker = if path.exists() { "✓".green() } else { "·".dimmed() };
        println!("  {} {}", marker, path.display());
    }
    Ok(())
}

pub fn switch(path: &Path) -> Result<()> {
    let resolver = resolver(None)?;
    let config = settings::switch_vault(resolver.source(), path)?;
    super::ok(&format!(
        "Switched to vault '{}' at {}",
        config.vault_name,
        config.vault_path.as_deref().unwrap_or("?")
    ));
    Ok(())
}

pub fn set_focus(minutes: u32) -> Result<()> {
    let resolver = resolver(None)?;
    settings::set_focus_minutes(resolver.source(), resolver.config(), minutes)?;
    super::ok(&format!("Set focus time to {} minutes", minutes));
    Ok(())
}

pub fn set_break(minutes: u32) -> Result<()> {
    let resolver = resolver(None)?;
    settings::set_break_minutes(resolver.source(), resolver.config(), minutes)?;
    super::ok(&format!("Set break time to {} minutes", minutes));
    Ok(())
}

pub fn reset(yes: bool) -> Result<()> {
    let resolver = resolver(None)?;
    if !yes && !terminal::confirm("Reset all settings to defaults?")? {
        println!("{}", "Cancelled".yellow());
        return Ok(());
    }
    let config = settings::reset_to_defaults(resolver.source(), resolver.config())?;
    super::ok("Reset to default settings");
    print_config(&config, config.vault_root().as_deref());
    Ok(())
}

fn print_config(config: &BambooConfig, active: Option<&Path>) {
    let active = active
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "Not set".red().to_string());
    println!("Vault:       {}", config.vault_name.cyan());
    println!("Path:        {}", active);
    println!("Focus:       {} min", config.pomodoro_focus);
    println!("Break:       {} min", config.pomodoro_break);
    println!("Long break:  {} min", config.long_break);
    println!("Long every:  {} cycles", config.cycles_before_long_break);
}
