//! Rotating request identity: user agents, browser-like headers and
//! randomized viewport/locale/timezone for browser contexts.

use std::sync::Arc;

/// Current desktop browser user agents.
pub const USER_AGENTS: &[&str] = &[
    // Chrome on Windows
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/130.0.0.0 Safari/537.36",
    // Chrome on Mac
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Chrome on Linux
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    // Firefox
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
    // Safari
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    // Edge
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

/// Search engines used as the spoofed referer.
pub const REFERERS: &[&str] = &[
    "https://www.google.com/",
    "https://www.bing.com/",
    "https://duckduckgo.com/",
];

const VIEWPORTS: &[(u32, u32)] = &[
    (1920, 1080),
    (1366, 768),
    (1536, 864),
    (1440, 900),
    (1280, 800),
];

/// Locale and a timezone that plausibly goes with it.
const LOCALES: &[(&str, &str)] = &[
    ("en-US", "America/New_York"),
    ("en-US", "America/Chicago"),
    ("en-US", "America/Los_Angeles"),
    ("en-GB", "Europe/London"),
    ("en-CA", "America/Toronto"),
];

fn pick<T: Copy>(items: &[T]) -> T {
    items[fastrand::usize(..items.len())]
}

/// Random user agent from the built-in pool.
pub fn random_user_agent() -> &'static str {
    pick(USER_AGENTS)
}

fn accept_language(locale: &str) -> String {
    let lang = locale.split('-').next().unwrap_or(locale);
    format!("{locale},{lang};q=0.9")
}

/// Headers a desktop browser sends on a top-level navigation.
///
/// `Accept-Encoding` is left to the HTTP client so bodies are decoded.
pub fn browser_headers(user_agent: &str) -> Vec<(&'static str, String)> {
    vec![
        ("User-Agent", user_agent.to_string()),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8"
                .to_string(),
        ),
        ("Accept-Language", accept_language(pick(LOCALES).0)),
        ("DNT", "1".to_string()),
        ("Upgrade-Insecure-Requests", "1".to_string()),
        ("Sec-Fetch-Dest", "document".to_string()),
        ("Sec-Fetch-Mode", "navigate".to_string()),
        ("Sec-Fetch-Site", "cross-site".to_string()),
        ("Sec-Fetch-User", "?1".to_string()),
        ("Cache-Control", "max-age=0".to_string()),
        ("Referer", pick(REFERERS).to_string()),
    ]
}

/// Fingerprint applied to one isolated browser context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserIdentity {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub locale: String,
    pub timezone: String,
}

impl BrowserIdentity {
    pub fn random() -> Self {
        IdentityPool::default().browser_identity()
    }

    pub fn accept_language(&self) -> String {
        accept_language(&self.locale)
    }

    /// Script run before any page script in the context.
    ///
    /// Hides `navigator.webdriver` and reports languages and plugins a
    /// regular desktop browser would.
    pub fn stealth_script(&self) -> String {
        let lang = self.locale.split('-').next().unwrap_or(&self.locale);
        format!(
            r#"
Object.defineProperty(navigator, 'webdriver', {{ get: () => undefined, configurable: true }});
Object.defineProperty(navigator, 'languages', {{ get: () => ['{locale}', '{lang}'], configurable: true }});
Object.defineProperty(navigator, 'plugins', {{
    get: () => [
        {{ name: 'Chrome PDF Plugin', filename: 'internal-pdf-viewer', description: 'Portable Document Format' }},
        {{ name: 'Chrome PDF Viewer', filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai', description: '' }},
        {{ name: 'Native Client', filename: 'internal-nacl-plugin', description: '' }}
    ],
    configurable: true
}});
window.chrome = window.chrome || {{ runtime: {{}}, loadTimes: function() {{}}, csi: function() {{}}, app: {{}} }};
"#,
            locale = self.locale,
        )
    }
}

/// User-agent pool, either the built-in list or one supplied by the caller.
#[derive(Debug, Clone)]
pub struct IdentityPool {
    user_agents: Arc<Vec<String>>,
}

impl Default for IdentityPool {
    fn default() -> Self {
        Self {
            user_agents: Arc::new(USER_AGENTS.iter().map(|ua| ua.to_string()).collect()),
        }
    }
}

impl IdentityPool {
    /// Use the given user agents; an empty list falls back to the built-in pool.
    pub fn with_user_agents(user_agents: Vec<String>) -> Self {
        let user_agents: Vec<String> = user_agents
            .into_iter()
            .map(|ua| ua.trim().to_string())
            .filter(|ua| !ua.is_empty())
            .collect();
        if user_agents.is_empty() {
            return Self::default();
        }
        Self {
            user_agents: Arc::new(user_agents),
        }
    }

    pub fn len(&self) -> usize {
        self.user_agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.user_agents.is_empty()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agents[fastrand::usize(..self.user_agents.len())]
    }

    pub fn headers(&self) -> Vec<(&'static str, String)> {
        browser_headers(self.user_agent())
    }

    pub fn browser_identity(&self) -> BrowserIdentity {
        let (viewport_width, viewport_height) = pick(VIEWPORTS);
        let (locale, timezone) = pick(LOCALES);
        BrowserIdentity {
            user_agent: self.user_agent().to_string(),
            viewport_width,
            viewport_height,
            locale: locale.to_string(),
            timezone: timezone.to_string(),
        }
    }
}
