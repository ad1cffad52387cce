//! Primary headless browser: Chromium driven over CDP with chromiumoxide.
//!
//! One Chromium process is launched lazily and kept warm for the batch.
//! Every URL gets its own browser context (separate cookie jar and storage)
//! and a randomized identity. Images, stylesheets, fonts and media are
//! intercepted by resource type and failed. The context is disposed before
//! `fetch` returns.

use jobharvest_core::error::AppError;
use jobharvest_core::traits::Fetcher;

use crate::chrome::BrowserSettings;
use crate::identity::IdentityPool;

#[cfg(feature = "browser")]
mod imp {
    use std::sync::Arc;

    use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
    use chromiumoxide::cdp::browser_protocol::emulation::{
        SetDeviceMetricsOverrideParams, SetLocaleOverrideParams, SetTimezoneOverrideParams,
    };
    use chromiumoxide::cdp::browser_protocol::fetch::{
        ContinueRequestParams, EnableParams as InterceptParams, EventRequestPaused,
        FailRequestParams, RequestPattern,
    };
    use chromiumoxide::cdp::browser_protocol::network::{
        ErrorReason, ResourceType, SetUserAgentOverrideParams,
    };
    use chromiumoxide::cdp::browser_protocol::page::AddScriptToEvaluateOnNewDocumentParams;
    use chromiumoxide::cdp::browser_protocol::target::{
        CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
    };
    use chromiumoxide::{Browser, BrowserConfig, Page};
    use futures::StreamExt;
    use jobharvest_core::pacing::random_between;
    use tokio::sync::Mutex;
    use tokio::task::JoinHandle;
    use tracing::{debug, info, warn};

    use super::*;
    use crate::identity::BrowserIdentity;

    /// Resource types the browser never loads.
    pub(super) const BLOCKED_RESOURCE_TYPES: [ResourceType; 4] = [
        ResourceType::Image,
        ResourceType::Stylesheet,
        ResourceType::Font,
        ResourceType::Media,
    ];

    pub(super) fn is_blocked(kind: &ResourceType) -> bool {
        BLOCKED_RESOURCE_TYPES.contains(kind)
    }

    /// Interception patterns: any URL, keyed on resource type only.
    pub(super) fn blocked_patterns() -> Vec<RequestPattern> {
        BLOCKED_RESOURCE_TYPES
            .iter()
            .map(|kind| RequestPattern {
                url_pattern: Some("*".into()),
                resource_type: Some(kind.clone()),
                request_stage: None,
            })
            .collect()
    }

    /// Forget a browser whose connection is gone so the next fetch relaunches.
    pub(super) fn reap<T>(slot: &mut Option<T>, connected: impl Fn(&T) -> bool) -> bool {
        if slot.as_ref().is_some_and(|running| !connected(running)) {
            *slot = None;
            return true;
        }
        false
    }

    struct RunningBrowser {
        browser: Browser,
        handler: JoinHandle<()>,
    }

    impl RunningBrowser {
        fn is_connected(&self) -> bool {
            !self.handler.is_finished()
        }
    }

    /// Headless-browser fetcher using Chromium via the Chrome DevTools Protocol.
    ///
    /// Clones share the same browser process.
    #[derive(Clone)]
    pub struct BrowserFetcher {
        settings: BrowserSettings,
        identities: IdentityPool,
        state: Arc<Mutex<Option<RunningBrowser>>>,
    }

    impl BrowserFetcher {
        pub fn new(settings: BrowserSettings, identities: IdentityPool) -> Self {
            Self {
                settings,
                identities,
                state: Arc::new(Mutex::new(None)),
            }
        }

        async fn launch(&self) -> Result<RunningBrowser, AppError> {
            let mut builder = BrowserConfig::builder().no_sandbox().disable_default_args();
            if let Some(bin) = self.settings.executable() {
                info!(path = %bin.display(), "Using Chrome binary");
                builder = builder.chrome_executable(bin);
            }

            let config = builder
                .arg("--headless=new")
                .arg("--disable-gpu")
                .arg("--disable-dev-shm-usage")
                .arg("--disable-extensions")
                .arg("--disable-popup-blocking")
                .arg("--disable-blink-features=AutomationControlled")
                .arg("--no-first-run")
                .build()
                .map_err(|e| AppError::BrowserError(format!("Browser config error: {e}")))?;

            let (browser, mut handler) = Browser::launch(config)
                .await
                .map_err(|e| AppError::BrowserError(format!("Failed to launch browser: {e}")))?;

            // The CDP handler must be polled continuously for the connection to work.
            let handler = tokio::spawn(async move {
                while let Some(event) = handler.next().await {
                    if event.is_err() {
                        warn!("Browser CDP handler error: {event:?}");
                        break;
                    }
                }
            });

            info!("Primary browser launched");
            Ok(RunningBrowser { browser, handler })
        }

        async fn open_context(browser: &Browser) -> Result<BrowserContextId, AppError> {
            let response = browser
                .execute(CreateBrowserContextParams::default())
                .await
                .map_err(|e| AppError::BrowserError(format!("Failed to create context: {e}")))?;
            Ok(response.result.browser_context_id.clone())
        }

        async fn render_in_context(
            &self,
            browser: &Browser,
            context_id: &BrowserContextId,
            url: &str,
        ) -> Result<String, AppError> {
            let target = CreateTargetParams::builder()
                .url("about:blank")
                .browser_context_id(context_id.clone())
                .build()
                .map_err(AppError::BrowserError)?;
            let page = browser
                .new_page(target)
                .await
                .map_err(|e| AppError::BrowserError(format!("Failed to open page: {e}")))?;

            let identity = self.identities.browser_identity();
            let result = match Self::block_heavy_resources(&page).await {
                Ok(interceptor) => {
                    let rendered = match tokio::time::timeout(
                        self.settings.timeout,
                        self.render(&page, &identity, url),
                    )
                    .await
                    {
                        Ok(inner) => inner,
                        Err(_) => Err(AppError::Timeout(self.settings.timeout.as_secs())),
                    };
                    interceptor.abort();
                    rendered
                }
                Err(e) => Err(e),
            };

            if let Err(e) = page.close().await {
                debug!(%url, error = %e, "Failed to close page");
            }
            result
        }

        /// Pause every image, stylesheet, font and media request and fail it.
        /// Returns the task answering the paused requests.
        async fn block_heavy_resources(page: &Page) -> Result<JoinHandle<()>, AppError> {
            let cdp = |e: chromiumoxide::error::CdpError| {
                AppError::BrowserError(format!("Request interception failed: {e}"))
            };
            let mut paused = page
                .event_listener::<EventRequestPaused>()
                .await
                .map_err(cdp)?;

            let interceptor = page.clone();
            let task = tokio::spawn(async move {
                while let Some(event) = paused.next().await {
                    let request_id = event.request_id.clone();
                    let answered = if is_blocked(&event.resource_type) {
                        interceptor
                            .execute(FailRequestParams::new(
                                request_id,
                                ErrorReason::BlockedByClient,
                            ))
                            .await
                            .map(|_| ())
                    } else {
                        interceptor
                            .execute(ContinueRequestParams::new(request_id))
                            .await
                            .map(|_| ())
                    };
                    if let Err(e) = answered {
                        debug!(error = %e, "Paused request not answered");
                    }
                }
            });

            let enable = InterceptParams {
                patterns: Some(blocked_patterns()),
                handle_auth_requests: None,
            };
            if let Err(e) = page.execute(enable).await {
                task.abort();
                return Err(cdp(e));
            }
            Ok(task)
        }

        async fn prepare(page: &Page, identity: &BrowserIdentity) -> Result<(), AppError> {
            let cdp = |e: chromiumoxide::error::CdpError| {
                AppError::BrowserError(format!("Page setup failed: {e}"))
            };

            let user_agent = SetUserAgentOverrideParams::builder()
                .user_agent(identity.user_agent.clone())
                .accept_language(identity.accept_language())
                .build()
                .map_err(AppError::BrowserError)?;
            page.execute(user_agent).await.map_err(cdp)?;

            page.execute(SetDeviceMetricsOverrideParams::new(
                i64::from(identity.viewport_width),
                i64::from(identity.viewport_height),
                1.0,
                false,
            ))
            .await
            .map_err(cdp)?;
            page.execute(SetTimezoneOverrideParams::new(identity.timezone.clone()))
                .await
                .map_err(cdp)?;
            page.execute(SetLocaleOverrideParams {
                locale: Some(identity.locale.clone()),
            })
            .await
            .map_err(cdp)?;

            page.execute(AddScriptToEvaluateOnNewDocumentParams::new(
                identity.stealth_script(),
            ))
            .await
            .map_err(cdp)?;
            Ok(())
        }

        async fn render(
            &self,
            page: &Page,
            identity: &BrowserIdentity,
            url: &str,
        ) -> Result<String, AppError> {
            Self::prepare(page, identity).await?;

            page.goto(url)
                .await
                .map_err(|e| AppError::BrowserError(format!("Failed to navigate to {url}: {e}")))?;

            // Wait until <body> is present: a minimal signal that the DOM is ready.
            page.find_element("body")
                .await
                .map_err(|e| AppError::BrowserError(format!("Page did not render body: {e}")))?;

            tokio::time::sleep(random_between(
                self.settings.pause_min,
                self.settings.pause_max,
            ))
            .await;

            page.content()
                .await
                .map_err(|e| AppError::BrowserError(format!("Failed to read page content: {e}")))
        }
    }

    impl Fetcher for BrowserFetcher {
        async fn fetch(&self, url: &str) -> Result<String, AppError> {
            let mut state = self.state.lock().await;
            if reap(&mut *state, RunningBrowser::is_connected) {
                warn!("Primary browser connection lost, relaunching");
            }
            if state.is_none() {
                *state = Some(self.launch().await?);
            }
            let Some(running) = state.as_ref() else {
                return Err(AppError::BrowserError("Browser is not running".into()));
            };
            let browser = &running.browser;

            let context_id = Self::open_context(browser).await?;
            let result = self.render_in_context(browser, &context_id, url).await;

            if let Err(e) = browser
                .execute(DisposeBrowserContextParams::new(context_id))
                .await
            {
                debug!(%url, error = %e, "Failed to dispose browser context");
            }
            result
        }

        async fn close(&self) {
            let Some(mut running) = self.state.lock().await.take() else {
                return;
            };
            if let Err(e) = running.browser.close().await {
                debug!(error = %e, "Browser close failed");
            }
            let _ = running.browser.wait().await;
            running.handler.abort();
            info!("Primary browser closed");
        }

        fn name(&self) -> &'static str {
            "browser"
        }
    }
}

#[cfg(not(feature = "browser"))]
mod imp {
    use super::*;

    /// Stub used when the `browser` feature is disabled.
    #[derive(Clone)]
    pub struct BrowserFetcher {
        _settings: BrowserSettings,
        _identities: IdentityPool,
    }

    impl BrowserFetcher {
        pub fn new(settings: BrowserSettings, identities: IdentityPool) -> Self {
            Self {
                _settings: settings,
                _identities: identities,
            }
        }
    }

    impl Fetcher for BrowserFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, AppError> {
            Err(AppError::BrowserError(
                "Browser support not compiled. Rebuild with: cargo build --features browser".into(),
            ))
        }

        fn name(&self) -> &'static str {
            "browser"
        }
    }
}

pub use imp::BrowserFetcher;
