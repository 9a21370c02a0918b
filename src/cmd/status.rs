//! Backend status commands: `pdashboard status` and `pdashboard version`.

use anyhow::{Context, Result};
use pdashboard::app::AppContext;
use pdashboard::config::DashboardConfig;
use pdashboard::status::DataStatus;
use pdashboard::watcher::version_label;

pub async fn cmd_status(config: DashboardConfig) -> Result<()> {
    let ctx = AppContext::new(config)?;
    println!("Backend: {}", ctx.config().api.base_url);

    match ctx.data_status().await {
        DataStatus::Loaded {
            source,
            records,
            checked_at,
        } => {
            println!(
                "{} Data loaded from {} ({} records)",
                console::style("✓").green(),
                source.label(),
                records
            );
            println!("  Last check: {}", checked_at.format("%d/%m/%Y %H:%M:%S"));
            Ok(())
        }
        DataStatus::ServerError { message } => {
            println!("{} Server error: {}", console::style("✗").red(), message);
            anyhow::bail!("Backend reported an error")
        }
        DataStatus::ConnectionError { message } => {
            println!("{} Connection error: {}", console::style("✗").red(), message);
            anyhow::bail!("Backend is unreachable")
        }
    }
}

pub async fn cmd_version(config: DashboardConfig) -> Result<()> {
    let ctx = AppContext::new(config)?;
    let version = ctx
        .registry()
        .fetch_version()
        .await
        .context("Failed to fetch backend version")?;
    println!("pdashboard {}", env!("CARGO_PKG_VERSION"));
    println!("backend    {}", version_label(&version));
    Ok(())
}
