// src/main.rs
use anyhow::Result;
use hyper::{Body, Request, Response, Server, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

use rust_health_check::{
    check::CheckConfig,
    checks::{HttpCheck, TcpCheck},
    config::{Config, ProbeConfig},
    metrics::MetricsRegistry,
    registry::Registry,
    runner::Runner,
    server::{StatusHandler, StatusServer},
    service::HealthService,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rust_health_check=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());

    info!("Loading configuration from: {}", config_path);
    let config = Config::load(&config_path).await?;

    // Initialize metrics
    let metrics_registry = MetricsRegistry::new()?;
    let metrics = metrics_registry.collector();

    // Register configured probes
    let registry = Arc::new(Registry::new());
    for probe in &config.checks {
        registry.register(materialize(probe))?;
    }
    info!("{} health checks registered", registry.len());

    let mut runner = Runner::new(config.health.default_timeout());
    if let Some(max_wait) = config.health.max_wait() {
        runner = runner.with_max_wait(max_wait);
    }

    let mut service = HealthService::new(registry, runner).with_metrics(metrics);
    if let Some(interval) = config.health.min_refresh_interval() {
        service = service.with_min_refresh_interval(interval);
    }

    // Start metrics server if enabled
    if config.metrics.enabled {
        let metrics_addr: SocketAddr = ([0, 0, 0, 0], config.metrics.port).into();
        start_metrics_server(metrics_addr, metrics_registry, config.metrics.path.clone());
    }

    // Start status server
    let handler = StatusHandler::new(Arc::new(service), &config.server.status_path);
    let addr: SocketAddr = ([0, 0, 0, 0], config.server.port).into();
    info!(
        "Serving health status on http://{}{}",
        addr, config.server.status_path
    );

    StatusServer::new(addr)
        .serve(handler, shutdown_signal())
        .await?;

    Ok(())
}

fn materialize(probe: &ProbeConfig) -> CheckConfig {
    let (config, timeout_secs) = match probe {
        ProbeConfig::Http {
            name,
            url,
            timeout_secs,
            skip_on_err,
        } => (
            CheckConfig::new(name.as_str(), HttpCheck::new(url.clone())).skip_on_err(*skip_on_err),
            *timeout_secs,
        ),
        ProbeConfig::Tcp {
            name,
            addr,
            timeout_secs,
            skip_on_err,
        } => (
            CheckConfig::new(name.as_str(), TcpCheck::new(addr.clone())).skip_on_err(*skip_on_err),
            *timeout_secs,
        ),
    };

    match timeout_secs {
        Some(secs) => config.with_timeout(Duration::from_secs(secs)),
        None => config,
    }
}

fn start_metrics_server(addr: SocketAddr, registry: MetricsRegistry, path: String) {
    let registry = Arc::new(registry);
    let path = Arc::new(path);

    let make_service = hyper::service::make_service_fn(move |_| {
        let registry = registry.clone();
        let path = path.clone();

        async move {
            Ok::<_, Infallible>(hyper::service::service_fn(move |req: Request<Body>| {
                let registry = registry.clone();
                let path = path.clone();

                async move {
                    let response = if req.uri().path() == path.as_str() {
                        Response::builder()
                            .status(StatusCode::OK)
                            .header("Content-Type", "text/plain; version=0.0.4")
                            .body(Body::from(registry.gather()))
                            .unwrap()
                    } else {
                        Response::builder()
                            .status(StatusCode::NOT_FOUND)
                            .body(Body::from("Not Found"))
                            .unwrap()
                    };
                    Ok::<_, Infallible>(response)
                }
            }))
        }
    });

    info!("Metrics server listening on http://{}", addr);
    tokio::spawn(async move {
        if let Err(e) = Server::bind(&addr).serve(make_service).await {
            error!("Metrics server error: {}", e);
        }
    });
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
