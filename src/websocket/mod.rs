//! WebSocket transport adapter: axum routes, the upgrade handler, and the
//! per-socket send/receive tasks.

mod connection;
pub mod handler;
pub mod routes;
mod sending;

pub use routes::create_router;
