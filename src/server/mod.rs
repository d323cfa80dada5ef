// src/server/mod.rs
mod handler;
mod status_server;

pub use handler::{status_code, StatusHandler};
pub use status_server::StatusServer;
