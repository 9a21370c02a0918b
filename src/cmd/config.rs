//! Configuration view and validation commands: `pdashboard config`.

use std::path::Path;

use anyhow::Result;
use pdashboard::config::DashboardConfig;

use crate::{Cli, ConfigCommands};

fn print_config(config: &DashboardConfig) {
    println!("[api]");
    println!("  base_url = \"{}\"", config.api.base_url);
    println!("  timeout_ms = {}", config.api.timeout_ms);
    println!();
    println!("[carousel]");
    println!("  interval_ms = {}", config.carousel.interval_ms);
    println!("  refresh_ms = {}", config.carousel.refresh_ms);
    println!("  clock_ms = {}", config.carousel.clock_ms);
    println!();
    println!("[watcher]");
    println!("  interval_ms = {}", config.watcher.interval_ms);
    println!();
    println!("[admin]");
    println!("  save_debounce_ms = {}", config.admin.save_debounce_ms);
    println!("  autoscroll_margin = {}", config.admin.autoscroll_margin);
    println!("  autoscroll_step = {}", config.admin.autoscroll_step);
    println!("  autoscroll_tick_ms = {}", config.admin.autoscroll_tick_ms);
    println!();
    println!("[notifications]");
    println!("  dismiss_ms = {}", config.notifications.dismiss_ms);
    println!();
    println!("[kiosk]");
    println!("  port = {}", config.kiosk.port);
    println!("  lan = {}", config.kiosk.lan);
    println!();
}

pub fn cmd_config(config_path: &Path, cli: &Cli, command: Option<ConfigCommands>) -> Result<()> {
    match command {
        None | Some(ConfigCommands::Show) => {
            println!();
            println!("{}", console::style("Dashboard Configuration").bold().cyan());
            println!();

            if config_path.exists() {
                println!("Config file: {}", config_path.display());
            } else {
                println!("No dashboard.toml found at {}", config_path.display());
                println!("Using defaults. Run 'pdashboard config init' to create one.");
            }
            println!();

            let config = if config_path.exists() {
                DashboardConfig::load(config_path)?
            } else {
                DashboardConfig::default()
            };
            let effective = config.with_env().with_api_url(cli.api_url.as_deref());
            println!("Effective values (with env/CLI overrides):");
            println!();
            print_config(&effective);
        }
        Some(ConfigCommands::Validate) => {
            println!();
            println!("Validating configuration...");
            println!();

            if !config_path.exists() {
                println!("No dashboard.toml found. Using defaults (valid).");
                return Ok(());
            }

            let config = DashboardConfig::load(config_path)?;
            let warnings = config.validate();

            if warnings.is_empty() {
                println!("{}", console::style("Configuration is valid.").green());
            } else {
                println!("{}", console::style("Configuration warnings:").yellow());
                for warning in &warnings {
                    println!("  - {}", warning);
                }
                println!();
                anyhow::bail!("{} configuration problem(s) found", warnings.len());
            }
            println!();
        }
        Some(ConfigCommands::Init) => {
            if config_path.exists() {
                println!("dashboard.toml already exists at {}", config_path.display());
                println!("Delete it first if you want to recreate it.");
                return Ok(());
            }

            if let Some(parent) = config_path.parent()
                && !parent.as_os_str().is_empty()
                && !parent.exists()
            {
                std::fs::create_dir_all(parent)?;
            }

            DashboardConfig::default().save(config_path)?;

            println!("Created dashboard.toml at {}", config_path.display());
            println!();
            println!("You can now customize:");
            println!("  - [api] base_url, timeout_ms");
            println!("  - [carousel] interval_ms, refresh_ms");
            println!("  - [watcher] interval_ms");
            println!("  - [kiosk] port, lan");
            println!();
        }
    }

    Ok(())
}
