//! Utilities shared by the Agora binaries.

pub mod logger;
pub mod time;
