//! Real-time chat room of the Agora forum backend.
//!
//! This library provides the chat subsystem: a WebSocket endpoint that fans out
//! every message to all open connections, a history endpoint, and a background
//! retention sweep.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
