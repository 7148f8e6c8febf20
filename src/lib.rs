#![cfg_attr(not(test), deny(clippy::panic))]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::struct_excessive_bools
)]

//! # Drawdash Server
//!
//! An in-memory WebSocket server for a real-time, multi-lobby
//! drawing-and-voting party game. No database, no cloud services —
//! just run the binary and connect via WebSocket.

/// Server configuration and environment variables
pub mod config;

/// Per-lobby game state machine (pure, no I/O)
pub mod lobby;

/// Structured logging configuration
pub mod logging;

/// WebSocket message protocol definitions
pub mod protocol;

/// Main server orchestration
pub mod server;

/// WebSocket connection handling
pub mod websocket;
