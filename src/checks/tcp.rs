// src/checks/tcp.rs
use crate::check::Check;
use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::net::TcpStream;

/// TCP connect probe: a successful connect counts as up. Covers the
/// "database ping / broker aliveness" shape without a driver dependency.
pub struct TcpCheck {
    addr: String,
}

impl TcpCheck {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl Check for TcpCheck {
    async fn check(&self) -> Result<()> {
        TcpStream::connect(&self.addr)
            .await
            .map(drop)
            .with_context(|| format!("failed to connect to {}", self.addr))
    }
}
