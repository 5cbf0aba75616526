use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use super::error::SwapError;

/// Shared deadline for every remote call made on behalf of one swap.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self {
            at: Instant::now() + timeout,
        }
    }

    pub async fn run<T, F>(&self, step: &'static str, fut: F) -> Result<T, SwapError>
    where
        F: Future<Output = Result<T, SwapError>>,
    {
        match tokio::time::timeout_at(self.at, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(step, "swap deadline expired");
                Err(SwapError::Timeout { step })
            }
        }
    }
}
