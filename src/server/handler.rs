// src/server/handler.rs
use crate::report::Status;
use crate::service::HealthService;
use hyper::{Body, Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

/// Maps the aggregate status to a response code. Monitoring systems act on
/// the code alone: a partially unhealthy service still counts as available,
/// only a hard failure flips to 503. A down dependency is never a 500.
pub fn status_code(status: Status) -> StatusCode {
    match status {
        Status::Healthy | Status::PartiallyUnhealthy => StatusCode::OK,
        Status::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[derive(Clone)]
pub struct StatusHandler {
    service: Arc<HealthService>,
    status_path: Arc<str>,
}

impl StatusHandler {
    pub fn new(service: Arc<HealthService>, status_path: impl AsRef<str>) -> Self {
        Self {
            service,
            status_path: Arc::from(status_path.as_ref()),
        }
    }
}

impl Service<Request<Body>> for StatusHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = futures::future::BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let service = self.service.clone();
        let status_path = self.status_path.clone();

        Box::pin(async move {
            if req.uri().path() != status_path.as_ref() {
                return Ok(plain(StatusCode::NOT_FOUND, "Not Found"));
            }
            if req.method() != Method::GET {
                return Ok(plain(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed"));
            }

            let report = service.report().await;
            let body = serde_json::to_vec(&report).expect("report is serializable");
            Ok(Response::builder()
                .status(status_code(report.status))
                .header("Content-Type", "application/json")
                .body(Body::from(body))
                .unwrap())
        })
    }
}

fn plain(status: StatusCode, message: &'static str) -> Response<Body> {
    Response::builder()
        .status(status)
        .body(Body::from(message))
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{check_fn, CheckConfig};
    use crate::registry::Registry;
    use crate::runner::Runner;

    fn handler(registry: Registry) -> StatusHandler {
        let service = HealthService::new(Arc::new(registry), Runner::default());
        StatusHandler::new(Arc::new(service), "/status")
    }

    async fn get(handler: &mut StatusHandler, path: &str) -> Response<Body> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .unwrap();
        handler.call(req).await.unwrap()
    }

    #[test]
    fn status_code_mapping_is_the_documented_policy() {
        assert_eq!(status_code(Status::Healthy), StatusCode::OK);
        assert_eq!(status_code(Status::PartiallyUnhealthy), StatusCode::OK);
        assert_eq!(status_code(Status::Unhealthy), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn empty_registry_serves_200_with_empty_details() {
        let mut handler = handler(Registry::new());
        let res = get(&mut handler, "/status").await;
        assert_eq!(res.status(), StatusCode::OK);

        let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert!(json["details"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn hard_failure_serves_503_with_populated_details() {
        let registry = Registry::new();
        registry
            .register(CheckConfig::new(
                "down",
                check_fn(|| async { Err(anyhow::anyhow!("boom")) }),
            ))
            .unwrap();

        let mut handler = handler(registry);
        let res = get(&mut handler, "/status").await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = hyper::body::to_bytes(res.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["details"]["down"]["error"], "boom");
    }

    #[tokio::test]
    async fn off_path_is_404_and_non_get_is_405() {
        let mut handler = handler(Registry::new());

        let res = get(&mut handler, "/other").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/status")
            .body(Body::empty())
            .unwrap();
        let res = handler.call(req).await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
