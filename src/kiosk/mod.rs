//! Kiosk display server.
//!
//! Runs the carousel and the config watcher in-process and pushes what they
//! produce to thin browser displays over a WebSocket.
//!
//! | Route                  | Purpose                                   |
//! |------------------------|-------------------------------------------|
//! | `GET /`                | display shell                             |
//! | `GET /health`          | liveness, returns `ok`                    |
//! | `GET /ws`              | slide, clock, version and reload stream   |
//! | `POST /visibility`     | `{"hidden": bool}` pauses or restarts     |
//! | `POST /slides/{index}` | manual jump                               |

pub mod server;
pub mod ws;

pub use server::{KioskState, bind, build_router, serve, supervise};
pub use ws::KioskMessage;
