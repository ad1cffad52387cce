//! Secondary headless browser (headless_chrome), used when the HTTP and
//! primary browser strategies both fail.
//!
//! headless_chrome is synchronous, so every call runs on the blocking pool.

use std::time::Duration;

use jobharvest_core::error::AppError;
use jobharvest_core::traits::Fetcher;

use crate::chrome::BrowserSettings;
use crate::identity::IdentityPool;

/// Extra time given to client-side rendering after navigation completes.
pub const SETTLE_DELAY: Duration = Duration::from_secs(3);

#[cfg(feature = "heavy-browser")]
mod imp {
    use std::ffi::OsStr;
    use std::sync::{Arc, Mutex};

    use anyhow::Context as _;
    use headless_chrome::protocol::cdp::{Emulation, Page, Target};
    use headless_chrome::{Browser, LaunchOptions};
    use jobharvest_core::pacing::random_between;
    use tracing::{debug, info};

    use super::*;
    use crate::identity::BrowserIdentity;

    /// Headless-browser fetcher using the headless_chrome engine.
    ///
    /// Clones share the same browser process.
    #[derive(Clone)]
    pub struct HeavyBrowserFetcher {
        settings: BrowserSettings,
        identities: IdentityPool,
        browser: Arc<Mutex<Option<Arc<Browser>>>>,
    }

    impl HeavyBrowserFetcher {
        pub fn new(settings: BrowserSettings, identities: IdentityPool) -> Self {
            Self {
                settings,
                identities,
                browser: Arc::new(Mutex::new(None)),
            }
        }

        fn ensure_browser(&self) -> anyhow::Result<Arc<Browser>> {
            let mut slot = self
                .browser
                .lock()
                .map_err(|_| anyhow::anyhow!("browser lock poisoned"))?;
            if let Some(browser) = slot.as_ref() {
                return Ok(browser.clone());
            }

            let options = LaunchOptions::default_builder()
                .headless(true)
                .sandbox(false)
                .window_size(Some((1920, 1080)))
                .path(self.settings.executable())
                .idle_browser_timeout(Duration::from_secs(30 * 60))
                .args(vec![
                    OsStr::new("--disable-gpu"),
                    OsStr::new("--disable-dev-shm-usage"),
                    OsStr::new("--disable-blink-features=AutomationControlled"),
                ])
                .build()
                .map_err(|e| anyhow::anyhow!("Invalid launch options: {e}"))?;

            let browser = Arc::new(Browser::new(options).context("Failed to launch browser")?);
            info!("Secondary browser launched");
            *slot = Some(browser.clone());
            Ok(browser)
        }

        fn fetch_blocking(
            &self,
            url: &str,
            identity: &BrowserIdentity,
            pause: Duration,
        ) -> anyhow::Result<String> {
            let browser = self.ensure_browser()?;
            let context = browser.new_context().context("Failed to create context")?;
            let context_id = context.get_id().to_string();
            let tab = match context.new_tab() {
                Ok(tab) => tab,
                Err(e) => {
                    dispose_context(&browser, url, context_id);
                    return Err(e.context("Failed to open tab"));
                }
            };
            tab.set_default_timeout(self.settings.timeout);

            let rendered = (|| -> anyhow::Result<String> {
                tab.set_user_agent(
                    &identity.user_agent,
                    Some(identity.accept_language().as_str()),
                    None,
                )?;
                tab.call_method(Emulation::SetTimezoneOverride {
                    timezone_id: identity.timezone.clone(),
                })?;
                tab.call_method(Emulation::SetLocaleOverride {
                    locale: Some(identity.locale.clone()),
                })?;
                tab.enable_stealth_mode()?;
                tab.call_method(Page::AddScriptToEvaluateOnNewDocument {
                    source: identity.stealth_script(),
                    world_name: None,
                    include_command_line_api: None,
                    run_immediately: None,
                })?;

                tab.navigate_to(url)?.wait_until_navigated()?;
                tab.wait_for_element("body")?;
                std::thread::sleep(pause + SETTLE_DELAY);
                tab.get_content()
            })();

            if let Err(e) = tab.close(true) {
                debug!(%url, error = %e, "Failed to close tab");
            }
            dispose_context(&browser, url, context_id);
            rendered
        }

        /// Browser contexts still open, apart from the default one.
        #[cfg(test)]
        pub(super) fn open_contexts(&self) -> anyhow::Result<usize> {
            let browser = self.ensure_browser()?;
            let contexts = browser.call_method(Target::GetBrowserContexts(None))?;
            Ok(contexts.browser_context_ids.len())
        }
    }

    fn dispose_context(browser: &Browser, url: &str, browser_context_id: String) {
        if let Err(e) = browser.call_method(Target::DisposeBrowserContext { browser_context_id }) {
            debug!(%url, error = %e, "Failed to dispose browser context");
        }
    }

    impl Fetcher for HeavyBrowserFetcher {
        async fn fetch(&self, url: &str) -> Result<String, AppError> {
            let this = self.clone();
            let target = url.to_string();
            let identity = self.identities.browser_identity();
            let pause = random_between(self.settings.pause_min, self.settings.pause_max);

            tokio::task::spawn_blocking(move || this.fetch_blocking(&target, &identity, pause))
                .await
                .map_err(|e| AppError::BrowserError(format!("Browser task failed: {e}")))?
                .map_err(|e| AppError::BrowserError(format!("{e:#}")))
        }

        async fn close(&self) {
            let browser = match self.browser.lock() {
                Ok(mut slot) => slot.take(),
                Err(_) => None,
            };
            if browser.is_some() {
                // Dropping the last handle kills the process.
                let _ = tokio::task::spawn_blocking(move || drop(browser)).await;
                info!("Secondary browser closed");
            }
        }

        fn name(&self) -> &'static str {
            "heavy-browser"
        }
    }
}

#[cfg(not(feature = "heavy-browser"))]
mod imp {
    use super::*;

    /// Stub used when the `heavy-browser` feature is disabled.
    #[derive(Clone)]
    pub struct HeavyBrowserFetcher {
        _settings: BrowserSettings,
        _identities: IdentityPool,
    }

    impl HeavyBrowserFetcher {
        pub fn new(settings: BrowserSettings, identities: IdentityPool) -> Self {
            Self {
                _settings: settings,
                _identities: identities,
            }
        }
    }

    impl Fetcher for HeavyBrowserFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, AppError> {
            Err(AppError::BrowserError(
                "Secondary browser not compiled. Rebuild with: cargo build --features heavy-browser"
                    .into(),
            ))
        }

        fn name(&self) -> &'static str {
            "heavy-browser"
        }
    }
}

pub use imp::HeavyBrowserFetcher;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "needs a local Chrome/Chromium"]
    async fn renders_a_live_page() {
        let fetcher = HeavyBrowserFetcher::new(BrowserSettings::default(), IdentityPool::default());
        let html = fetcher.fetch("https://example.com").await.unwrap();
        assert!(html.contains("Example Domain"));
        fetcher.close().await;
    }

    #[cfg(feature = "heavy-browser")]
    #[tokio::test]
    #[ignore = "needs a local Chrome/Chromium"]
    async fn contexts_are_disposed_after_each_fetch() {
        let fetcher = HeavyBrowserFetcher::new(BrowserSettings::default(), IdentityPool::default());
        for _ in 0..2 {
            fetcher.fetch("https://example.com").await.unwrap();
        }
        let inspector = fetcher.clone();
        let open = tokio::task::spawn_blocking(move || inspector.open_contexts())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(open, 0);
        fetcher.close().await;
    }
}
