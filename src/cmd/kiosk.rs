//! Kiosk display server command: `pdashboard kiosk`.

use anyhow::Result;
use pdashboard::app::AppContext;
use pdashboard::config::DashboardConfig;
use pdashboard::kiosk;

pub async fn cmd_kiosk(
    config: DashboardConfig,
    port: Option<u16>,
    open: bool,
    lan: bool,
) -> Result<()> {
    let port = port.unwrap_or(config.kiosk.port);
    let lan = lan || config.kiosk.lan;
    let ctx = AppContext::new(config)?;
    let listener = kiosk::bind(port, lan).await?;
    let url = format!("http://localhost:{}", listener.local_addr()?.port());

    println!();
    println!("{}", console::style("Production Dashboard Kiosk").bold().cyan());
    println!("  Backend: {}", ctx.config().api.base_url);
    println!("  Display: {}", console::style(&url).underlined());
    if lan {
        println!(
            "  {}",
            console::style("Listening on all interfaces (LAN displays enabled)").yellow()
        );
    }
    println!();
    println!("Press Ctrl+C to stop.");

    if open {
        tokio::spawn(async move {
            // Small delay to let the server start accepting
            tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;
            if let Err(e) = open::that(&url) {
                eprintln!("Failed to open browser: {}", e);
            }
        });
    }

    kiosk::serve(ctx, listener, lan).await
}
