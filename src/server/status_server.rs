// src/server/status_server.rs
use anyhow::Result;
use hyper::server::conn::Http;
use hyper::{Body, Request, Response};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower::Service;
use tracing::{info, warn};

/// Accept loop for the status endpoint: one tokio task per connection,
/// stopped by the supplied shutdown future. Plain TCP; TLS termination
/// belongs in front of this process.
pub struct StatusServer {
    addr: SocketAddr,
}

impl StatusServer {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }

    pub async fn serve<H>(self, handler: H, shutdown: impl Future<Output = ()>) -> Result<()>
    where
        H: Service<Request<Body>, Response = Response<Body>> + Send + Clone + 'static,
        H::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
        H::Future: Send + 'static,
    {
        let listener = TcpListener::bind(self.addr).await?;
        info!("status server listening on {}", self.addr);

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer) = accepted?;
                    let svc = handler.clone();
                    tokio::spawn(async move {
                        if let Err(err) = Http::new().serve_connection(stream, svc).await {
                            warn!(%peer, %err, "connection error");
                        }
                    });
                }
                _ = &mut shutdown => {
                    info!("shutdown signal received, stopping status server");
                    break;
                }
            }
        }
        Ok(())
    }
}
