use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use super::ws::{self, KioskMessage};
use crate::app::{AppContext, KioskSession};
use crate::carousel::CarouselCommand;
use crate::watcher::WatcherEvent;

const WS_CAPACITY: usize = 256;

/// Shared state of the display server.
pub struct KioskState {
    pub ws_tx: broadcast::Sender<String>,
    commands: mpsc::UnboundedSender<CarouselCommand>,
    latest: Mutex<Snapshot>,
}

/// What a display needs on connect, before the next broadcast arrives.
#[derive(Default)]
struct Snapshot {
    screen: Option<String>,
    version: Option<String>,
}

impl KioskState {
    pub fn new(commands: mpsc::UnboundedSender<CarouselCommand>) -> Self {
        let (ws_tx, _) = broadcast::channel(WS_CAPACITY);
        Self {
            ws_tx,
            commands,
            latest: Mutex::new(Snapshot::default()),
        }
    }

    /// Broadcast to connected displays and remember what a new one must see.
    pub fn publish(&self, msg: &KioskMessage) {
        let Some(json) = ws::encode(msg) else {
            return;
        };
        if let Ok(mut latest) = self.latest.lock() {
            match msg {
                KioskMessage::SlideShown(_) | KioskMessage::Idle => latest.screen = Some(json.clone()),
                KioskMessage::Version { .. } => latest.version = Some(json.clone()),
                KioskMessage::Reload | KioskMessage::Clock { .. } => {}
            }
        }
        let _ = self.ws_tx.send(json);
    }

    /// Messages replayed to a display when it connects.
    pub fn snapshot(&self) -> Vec<String> {
        match self.latest.lock() {
            Ok(latest) => latest
                .version
                .iter()
                .chain(latest.screen.iter())
                .cloned()
                .collect(),
            Err(_) => Vec::new(),
        }
    }

    fn command(&self, command: CarouselCommand) -> StatusCode {
        match self.commands.send(command) {
            Ok(()) => StatusCode::ACCEPTED,
            Err(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

pub fn build_router(state: Arc<KioskState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/ws", get(ws::ws_handler))
        .route("/visibility", post(set_visibility))
        .route("/slides/{index}", post(jump_to_slide))
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
struct VisibilityRequest {
    hidden: bool,
}

async fn set_visibility(
    State(state): State<Arc<KioskState>>,
    Json(req): Json<VisibilityRequest>,
) -> StatusCode {
    state.command(CarouselCommand::Visibility { hidden: req.hidden })
}

async fn jump_to_slide(
    State(state): State<Arc<KioskState>>,
    Path(index): Path<usize>,
) -> StatusCode {
    state.command(CarouselCommand::Jump(index))
}

/// Pump carousel and watcher events to the displays and display input to the
/// carousel until the command channel closes.
pub async fn supervise(
    mut session: KioskSession,
    state: Arc<KioskState>,
    mut commands: mpsc::UnboundedReceiver<CarouselCommand>,
) {
    let mut events = session.subscribe();

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => state.publish(&KioskMessage::from(event)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "kiosk supervisor lagged behind the carousel");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            event = session.next_watcher_event() => match event {
                Some(WatcherEvent::Reload) => {
                    if session.reload().await {
                        state.publish(&KioskMessage::Reload);
                    }
                }
                Some(WatcherEvent::Version(version)) => {
                    state.publish(&KioskMessage::Version { version });
                }
                None => break,
            },
            command = commands.recv() => match command {
                Some(command) => session.send(command),
                None => break,
            },
        }
    }

    session.dispose();
}

/// Bind the display server to `127.0.0.1:{port}`, or every interface when
/// `lan` is set.
pub async fn bind(port: u16, lan: bool) -> Result<TcpListener> {
    let host = if lan { "0.0.0.0" } else { "127.0.0.1" };
    let addr = format!("{}:{}", host, port);
    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))
}

/// Run the kiosk until Ctrl+C.
pub async fn serve(ctx: AppContext, listener: TcpListener, lan: bool) -> Result<()> {
    let session = ctx
        .start_kiosk()
        .await
        .context("Failed to load pages for the kiosk")?;

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let state = Arc::new(KioskState::new(cmd_tx));
    let supervisor = tokio::spawn(supervise(session, state.clone(), cmd_rx));

    let local_addr = listener.local_addr()?;
    info!(addr = %local_addr, "kiosk display server running");

    let mut app = build_router(state);
    if lan {
        app = app.layer(CorsLayer::permissive());
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    supervisor.abort();
    info!("kiosk display server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to install Ctrl+C handler; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="pt">
<head>
<meta charset="utf-8">
<title>Production Dashboard</title>
</head>
<body>
<header><span id="current-date"></span> <span id="current-time"></span></header>
<main id="slide"></main>
<footer><span id="footer-version"></span></footer>
<script>
const slide = document.getElementById("slide");
const socket = new WebSocket(`ws://${location.host}/ws`);
socket.onmessage = (event) => {
  const msg = JSON.parse(event.data);
  switch (msg.type) {
    case "slide_shown": slide.innerHTML = msg.data.html; break;
    case "idle": slide.textContent = "No active pages"; break;
    case "reload": location.reload(); break;
    case "version": document.getElementById("footer-version").textContent = msg.data.version; break;
    case "clock":
      document.getElementById("current-date").textContent = msg.data.date;
      document.getElementById("current-time").textContent = msg.data.time;
      break;
  }
};
socket.onclose = () => setTimeout(() => location.reload(), 5000);
document.addEventListener("visibilitychange", () => {
  fetch("/visibility", {
    method: "POST",
    headers: {"Content-Type": "application/json"},
    body: JSON.stringify({hidden: document.hidden}),
  });
});
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::testing::{FakeRegistry, pages};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_router() -> (Router, mpsc::UnboundedReceiver<CarouselCommand>, Arc<KioskState>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let state = Arc::new(KioskState::new(tx));
        (build_router(state.clone()), rx, state)
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _rx, _) = test_router();
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"ok");
    }

    #[tokio::test]
    async fn test_index_serves_display_shell() {
        let (app, _rx, _) = test_router();
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body = String::from_utf8_lossy(&bytes);
        assert!(body.contains("/ws"));
        assert!(body.contains("footer-version"));
    }

    #[tokio::test]
    async fn test_jump_forwards_command() {
        let (app, mut rx, _) = test_router();
        let req = Request::builder()
            .method("POST")
            .uri("/slides/2")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(rx.recv().await, Some(CarouselCommand::Jump(2)));
    }

    #[tokio::test]
    async fn test_non_numeric_slide_index_is_rejected() {
        let (app, _rx, _) = test_router();
        let req = Request::builder()
            .method("POST")
            .uri("/slides/next")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_visibility_forwards_command() {
        let (app, mut rx, _) = test_router();
        let req = Request::builder()
            .method("POST")
            .uri("/visibility")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"hidden": true}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(
            rx.recv().await,
            Some(CarouselCommand::Visibility { hidden: true })
        );
    }

    #[tokio::test]
    async fn test_command_after_supervisor_stopped() {
        let (app, rx, _) = test_router();
        drop(rx);
        let req = Request::builder()
            .method("POST")
            .uri("/slides/0")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_snapshot_keeps_latest_screen_and_version() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let state = KioskState::new(tx);
        assert!(state.snapshot().is_empty());

        state.publish(&KioskMessage::Version {
            version: "v1.4.2".into(),
        });
        state.publish(&KioskMessage::Idle);
        state.publish(&KioskMessage::Clock {
            date: "d".into(),
            time: "t".into(),
        });
        let snapshot = state.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[0].contains("v1.4.2"));
        assert!(snapshot[1].contains("idle"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_supervisor_publishes_slides_and_version() {
        let registry = Arc::new(FakeRegistry::with_pages(pages(2)));
        let ctx = AppContext::with_registry(DashboardConfig::default(), registry);
        let session = ctx.start_kiosk().await.unwrap();

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let state = Arc::new(KioskState::new(cmd_tx.clone()));
        let mut display = state.ws_tx.subscribe();
        let supervisor = tokio::spawn(supervise(session, state.clone(), cmd_rx));

        let mut saw_slide = false;
        let mut saw_version = false;
        while !(saw_slide && saw_version) {
            let msg: KioskMessage = serde_json::from_str(&display.recv().await.unwrap()).unwrap();
            match msg {
                KioskMessage::SlideShown(slide) => {
                    assert_eq!(slide.index, 0);
                    saw_slide = true;
                }
                KioskMessage::Version { version } => {
                    assert_eq!(version, "v1.4.2");
                    saw_version = true;
                }
                _ => {}
            }
        }

        cmd_tx.send(CarouselCommand::Jump(1)).unwrap();
        loop {
            let msg: KioskMessage = serde_json::from_str(&display.recv().await.unwrap()).unwrap();
            if let KioskMessage::SlideShown(slide) = msg {
                assert_eq!(slide.index, 1);
                break;
            }
        }

        supervisor.abort();
    }
}
