//! Page administration commands: `pdashboard pages`.

use anyhow::{Context, Result};
use pdashboard::admin::AdminPanel;
use pdashboard::app::AppContext;
use pdashboard::config::DashboardConfig;
use pdashboard::notify::{Toast, ToastLevel};
use pdashboard_common::PageId;

use crate::PagesCommands;

pub async fn cmd_pages(config: DashboardConfig, command: PagesCommands) -> Result<()> {
    let ctx = AppContext::new(config)?;
    let mut panel = ctx
        .admin_panel()
        .await
        .context("Failed to load pages")?;

    let result = match command {
        PagesCommands::List => {
            print_pages(&panel);
            Ok(())
        }
        PagesCommands::Move { id, to } => move_page(&mut panel, PageId(id), to).await,
        PagesCommands::Toggle { id } => toggle_page(&mut panel, PageId(id)).await,
    };
    panel.dispose();
    result
}

fn print_pages(panel: &AdminPanel) {
    let rows = panel.rows();
    if rows.is_empty() {
        println!("No pages configured.");
        return;
    }

    println!();
    println!("{}", console::style("Dashboard Pages").bold().cyan());
    println!();
    for row in rows {
        let state = if row.active {
            console::style("active").green()
        } else {
            console::style("inactive").dim()
        };
        let incomplete = if row.missing_fields.is_empty() {
            String::new()
        } else {
            format!(
                "  {}",
                console::style(format!("missing: {}", row.missing_fields.join(", "))).yellow()
            )
        };
        println!(
            "  {:>4}  {:<32} {:<10} {:<10} {}{}",
            row.id, row.title, row.page_type, row.order_label, state, incomplete
        );
    }
    println!();
}

async fn move_page(panel: &mut AdminPanel, id: PageId, to: usize) -> Result<()> {
    let from = panel
        .pages()
        .iter()
        .position(|p| p.id == id)
        .with_context(|| format!("No page with id {}", id))?;
    if to == 0 || to > panel.pages().len() {
        anyhow::bail!(
            "Position {} is out of range (1-{})",
            to,
            panel.pages().len()
        );
    }

    if !panel.move_page(from, to - 1) {
        println!("Page {} is already at position {}.", id, to);
        return Ok(());
    }

    let saved = panel.next_save().await.unwrap_or(false);
    report(panel.notifier().current());
    if !saved {
        anyhow::bail!("Page order was not saved");
    }
    print_pages(panel);
    Ok(())
}

async fn toggle_page(panel: &mut AdminPanel, id: PageId) -> Result<()> {
    let toggled = panel.toggle(id).await?;
    report(panel.notifier().current());
    if !toggled {
        anyhow::bail!("Page {} was not toggled", id);
    }
    Ok(())
}

fn report(toast: Option<Toast>) {
    let Some(toast) = toast else {
        return;
    };
    match toast.level {
        ToastLevel::Success => println!("{}", console::style(toast.message).green()),
        ToastLevel::Error => eprintln!("{}", console::style(toast.message).red()),
        ToastLevel::Info => println!("{}", toast.message),
    }
}
