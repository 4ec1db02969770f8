//! UI layer: HTTP / WebSocket entry points of the chat server.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use signal::shutdown_signal;
