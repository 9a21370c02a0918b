use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink, stream::SplitStream};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::Instant;
use tracing::{debug, error};

use super::server::KioskState;
use crate::carousel::{CarouselEvent, ShownSlide};

/// How often to send WebSocket Ping frames.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// How long to wait for a Pong response before considering the connection dead.
const PONG_TIMEOUT: Duration = Duration::from_secs(60);

/// Messages pushed to kiosk displays.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum KioskMessage {
    SlideShown(ShownSlide),
    Idle,
    /// Page configuration changed; the display should reload.
    Reload,
    Version { version: String },
    Clock { date: String, time: String },
}

impl From<CarouselEvent> for KioskMessage {
    fn from(event: CarouselEvent) -> Self {
        match event {
            CarouselEvent::SlideShown(slide) => Self::SlideShown(slide),
            CarouselEvent::Idle => Self::Idle,
            CarouselEvent::Clock { date, time } => Self::Clock { date, time },
        }
    }
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<KioskState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<KioskState>) {
    let (mut sender, receiver) = socket.split();
    // Subscribe before reading the snapshot so nothing falls in between.
    let rx = state.ws_tx.subscribe();
    for msg in state.snapshot() {
        if sender.send(Message::Text(msg.into())).await.is_err() {
            return;
        }
    }
    debug!("kiosk display connected");
    run_socket_loop(sender, receiver, rx).await;
    debug!("kiosk display disconnected");
}

/// Forward broadcasts to one display, with ping/pong keepalive.
///
/// If no Pong arrives within [`PONG_TIMEOUT`] after a Ping the connection is
/// considered dead and the loop exits.
async fn run_socket_loop(
    mut sender: SplitSink<WebSocket, Message>,
    mut receiver: SplitStream<WebSocket>,
    mut rx: broadcast::Receiver<String>,
) {
    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    // The first tick completes immediately.
    ping_interval.tick().await;

    let mut last_pong = Instant::now();
    let mut awaiting_pong = false;

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if awaiting_pong && last_pong.elapsed() > PONG_TIMEOUT {
                    break;
                }
                if sender.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
                awaiting_pong = true;
            }

            result = rx.recv() => {
                match result {
                    Ok(msg) => {
                        if sender.send(Message::Text(msg.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    // A slow display skips ahead; the next slide replaces the screen anyway.
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Pong(_))) => {
                        last_pong = Instant::now();
                        awaiting_pong = false;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    let _ = sender.send(Message::Close(None)).await;
}

/// Serialize a message for the broadcast channel.
pub fn encode(msg: &KioskMessage) -> Option<String> {
    match serde_json::to_string(msg) {
        Ok(json) => Some(json),
        Err(e) => {
            error!(error = %e, "failed to serialize kiosk message");
            None
        }
    }
}

/// Serialize and broadcast to every connected display.
/// Returns silently when no display is connected.
pub fn broadcast_message(tx: &broadcast::Sender<String>, msg: &KioskMessage) {
    if let Some(json) = encode(msg) {
        let _ = tx.send(json);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdashboard_common::PageId;

    fn slide() -> ShownSlide {
        ShownSlide {
            index: 1,
            total: 3,
            page_id: PageId(7),
            title: "Produção".into(),
            html: "<div></div>".into(),
        }
    }

    #[test]
    fn test_slide_shown_serialization() {
        let msg = KioskMessage::from(CarouselEvent::SlideShown(slide()));
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"slide_shown\""));
        assert!(json.contains("\"page_id\":7"));
        assert!(json.contains("\"index\":1"));
    }

    #[test]
    fn test_reload_and_idle_have_no_data() {
        let reload = serde_json::to_value(KioskMessage::Reload).unwrap();
        assert_eq!(reload, serde_json::json!({"type": "reload"}));
        let idle = serde_json::to_value(KioskMessage::Idle).unwrap();
        assert_eq!(idle["type"], "idle");
    }

    #[test]
    fn test_version_serialization() {
        let msg = KioskMessage::Version {
            version: "v1.4.2".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"version\""));
        assert!(json.contains("\"version\":\"v1.4.2\""));
    }

    #[test]
    fn test_roundtrip_deserialization() {
        let msg = KioskMessage::Clock {
            date: "2026-10-17".into(),
            time: "08:00:00".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: KioskMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, msg);
    }

    #[tokio::test]
    async fn test_broadcast_channel_delivers_to_subscribers() {
        let (tx, mut rx) = broadcast::channel(16);
        broadcast_message(&tx, &KioskMessage::Reload);
        let received = rx.recv().await.unwrap();
        assert!(received.contains("reload"));
    }

    #[tokio::test]
    async fn test_broadcast_no_receivers_does_not_panic() {
        let (tx, _) = broadcast::channel::<String>(16);
        broadcast_message(&tx, &KioskMessage::Idle);
    }

    #[test]
    fn test_keepalive_constants() {
        assert!(PONG_TIMEOUT > PING_INTERVAL);
    }
}
