//! Infrastructure layer: concrete implementations of the domain interfaces
//! and the long-lived background tasks.

pub mod auth;
pub mod connection_registry;
pub mod dispatcher;
pub mod dto;
pub mod repository;
pub mod sweeper;
