use std::time::Duration;

use jobharvest_core::error::AppError;
use jobharvest_core::pacing::{pause, random_between};
use jobharvest_core::traits::Fetcher;
use jobharvest_core::validate::PageValidator;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::extract::sites::Site;

#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Bounds of the random pause between strategy attempts.
    pub pause_min: Duration,
    pub pause_max: Duration,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            pause_min: Duration::from_millis(500),
            pause_max: Duration::from_millis(1500),
        }
    }
}

impl ChainConfig {
    /// No pause between strategies. Used by tests.
    pub fn immediate() -> Self {
        Self {
            pause_min: Duration::ZERO,
            pause_max: Duration::ZERO,
        }
    }
}

/// Ordered fallback over fetch strategies: plain HTTP, then the primary
/// browser, then the secondary browser.
///
/// The first strategy whose page passes the [`PageValidator`] wins. Sites
/// known to need JavaScript skip plain HTTP. Cancelling the token given to
/// [`FetchChain::with_cancel`] cuts the pause before the next strategy short.
#[derive(Clone)]
pub struct FetchChain<H, P, S> {
    http: H,
    primary: Option<P>,
    secondary: Option<S>,
    validator: PageValidator,
    config: ChainConfig,
    cancel: CancellationToken,
}

impl<H, P, S> FetchChain<H, P, S>
where
    H: Fetcher,
    P: Fetcher,
    S: Fetcher,
{
    pub fn new(http: H, primary: Option<P>, secondary: Option<S>) -> Self {
        Self {
            http,
            primary,
            secondary,
            validator: PageValidator::default(),
            config: ChainConfig::default(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_validator(mut self, validator: PageValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_config(mut self, config: ChainConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    async fn attempt<F: Fetcher>(&self, strategy: &F, url: &str) -> Result<String, AppError> {
        debug!(%url, strategy = strategy.name(), "Trying strategy");
        let html = strategy.fetch(url).await?;
        match self.validator.check(&html) {
            Ok(()) => Ok(html),
            Err(reason) => Err(AppError::Blocked {
                url: url.to_string(),
                reason: reason.to_string(),
            }),
        }
    }

    async fn pause_between(&self, url: &str) -> Result<(), AppError> {
        let duration = random_between(self.config.pause_min, self.config.pause_max);
        if pause(duration, &self.cancel).await {
            Ok(())
        } else {
            debug!(%url, "Fallback interrupted");
            Err(AppError::Cancelled)
        }
    }
}

/// Pick the error the caller's retry policy should see.
///
/// Any transient failure wins so the whole chain is retried; otherwise a
/// block is reported; otherwise the last error.
fn summarize(url: &str, failures: Vec<(&'static str, AppError)>) -> AppError {
    if let Some(pos) = failures.iter().position(|(_, e)| e.is_retryable()) {
        let mut failures = failures;
        return failures.swap_remove(pos).1;
    }
    let blocks: Vec<String> = failures
        .iter()
        .filter(|(_, e)| e.is_block())
        .map(|(name, e)| format!("{name}: {e}"))
        .collect();
    if !blocks.is_empty() {
        return AppError::Blocked {
            url: url.to_string(),
            reason: blocks.join("; "),
        };
    }
    failures
        .into_iter()
        .last()
        .map(|(_, e)| e)
        .unwrap_or_else(|| AppError::ConfigError(format!("No fetch strategy available for {url}")))
}

impl<H, P, S> Fetcher for FetchChain<H, P, S>
where
    H: Fetcher,
    P: Fetcher,
    S: Fetcher,
{
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let mut failures: Vec<(&'static str, AppError)> = Vec::new();

        if Site::detect(url).requires_browser() {
            debug!(%url, "Skipping plain HTTP for JavaScript-heavy site");
        } else {
            match self.attempt(&self.http, url).await {
                Ok(html) => {
                    info!(%url, strategy = self.http.name(), bytes = html.len(), "Fetched");
                    return Ok(html);
                }
                Err(e) => {
                    warn!(%url, strategy = self.http.name(), error = %e, "Strategy failed");
                    failures.push((self.http.name(), e));
                }
            }
        }

        if let Some(primary) = &self.primary {
            if !failures.is_empty() {
                self.pause_between(url).await?;
            }
            match self.attempt(primary, url).await {
                Ok(html) => {
                    info!(%url, strategy = primary.name(), bytes = html.len(), "Fetched");
                    return Ok(html);
                }
                Err(e) => {
                    warn!(%url, strategy = primary.name(), error = %e, "Strategy failed");
                    failures.push((primary.name(), e));
                }
            }
        }

        if let Some(secondary) = &self.secondary {
            if !failures.is_empty() {
                self.pause_between(url).await?;
            }
            match self.attempt(secondary, url).await {
                Ok(html) => {
                    info!(%url, strategy = secondary.name(), bytes = html.len(), "Fetched");
                    return Ok(html);
                }
                Err(e) => {
                    warn!(%url, strategy = secondary.name(), error = %e, "Strategy failed");
                    failures.push((secondary.name(), e));
                }
            }
        }

        Err(summarize(url, failures))
    }

    async fn close(&self) {
        self.http.close().await;
        if let Some(primary) = &self.primary {
            primary.close().await;
        }
        if let Some(secondary) = &self.secondary {
            secondary.close().await;
        }
    }

    fn name(&self) -> &'static str {
        "chain"
    }
}
