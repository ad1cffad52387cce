pub mod browser_fetcher;
pub mod chain;
pub mod chrome;
pub mod discover;
pub mod extract;
pub mod fetcher;
pub mod heavy_browser;
pub mod identity;

pub use browser_fetcher::BrowserFetcher;
pub use chain::{ChainConfig, FetchChain};
pub use chrome::{BrowserSettings, find_chrome_binary};
pub use discover::discover_job_urls;
pub use extract::SelectorExtractor;
pub use extract::sites::Site;
pub use fetcher::{HttpFetcher, HttpFetcherConfig};
pub use heavy_browser::HeavyBrowserFetcher;
pub use identity::{BrowserIdentity, IdentityPool};
