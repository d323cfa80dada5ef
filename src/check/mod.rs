// src/check/mod.rs
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// A single probe. The runner wraps every invocation in its own deadline and
/// drops the future once that deadline expires, so implementations must not
/// block the executor; anything that ignores cancellation keeps running on
/// its own until its wrapper elapses.
#[async_trait]
pub trait Check: Send + Sync {
    async fn check(&self) -> anyhow::Result<()>;
}

/// Adapter that turns an async closure into a [`Check`], the same way
/// `tower::service_fn` lifts closures into services.
pub struct CheckFn<F>(F);

pub fn check_fn<F, Fut>(f: F) -> CheckFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    CheckFn(f)
}

#[async_trait]
impl<F, Fut> Check for CheckFn<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn check(&self) -> anyhow::Result<()> {
        (self.0)().await
    }
}

/// One registered probe: a unique name, an optional per-check deadline, the
/// skip policy applied when it fails, and the probe itself. Immutable once
/// handed to the registry.
#[derive(Clone)]
pub struct CheckConfig {
    pub name: String,
    pub timeout: Option<Duration>,
    pub skip_on_err: bool,
    pub check: Arc<dyn Check>,
}

impl CheckConfig {
    pub fn new(name: impl Into<String>, check: impl Check + 'static) -> Self {
        Self {
            name: name.into(),
            timeout: None,
            skip_on_err: false,
            check: Arc::new(check),
        }
    }

    /// Deadline for this check alone; unset means the runner's default.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// A failing check with this flag set degrades the aggregate to
    /// partially unhealthy instead of unhealthy.
    pub fn skip_on_err(mut self, skip: bool) -> Self {
        self.skip_on_err = skip;
        self
    }
}
