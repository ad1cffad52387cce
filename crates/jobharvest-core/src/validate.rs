//! Heuristic detection of block pages, challenges and error shells.

use std::fmt;

use tracing::warn;

/// Phrases that mark a page as a block, challenge or error page.
pub const BLOCKING_INDICATORS: &[&str] = &[
    "access denied",
    "captcha",
    "robot check",
    "cloudflare",
    "security check",
    "distil",
    "unusual traffic",
    "please verify you are human",
    "enable javascript",
    "403 forbidden",
    "404 not found",
    "this page isn't working",
    "rate limited",
    "too many requests",
];

#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Pages shorter than this (in characters) are rejected.
    pub min_length: usize,
    pub indicators: Vec<&'static str>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            min_length: 1000,
            indicators: BLOCKING_INDICATORS.to_vec(),
        }
    }
}

/// Why a page was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    TooShort { len: usize },
    Indicator(&'static str),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooShort { len } => write!(f, "content too short ({len} chars)"),
            Rejection::Indicator(phrase) => write!(f, "blocking indicator '{phrase}'"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageValidator {
    config: ValidatorConfig,
}

impl PageValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn check(&self, html: &str) -> Result<(), Rejection> {
        let len = html.chars().count();
        if len < self.config.min_length {
            return Err(Rejection::TooShort { len });
        }
        let lowered = html.to_lowercase();
        match self
            .config
            .indicators
            .iter()
            .find(|phrase| lowered.contains(**phrase))
        {
            Some(phrase) => Err(Rejection::Indicator(phrase)),
            None => Ok(()),
        }
    }

    /// True when the page looks like real content; logs the reason otherwise.
    pub fn is_usable(&self, html: &str, url: &str) -> bool {
        match self.check(html) {
            Ok(()) => true,
            Err(reason) => {
                warn!(url = %url, reason = %reason, "Page rejected");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn padded(body: &str) -> String {
        let filler = "<p>We are hiring engineers to build reliable systems.</p>".repeat(100);
        format!("<html><body>{body}{filler}</body></html>")
    }

    #[test]
    fn rejects_short_content() {
        let v = PageValidator::default();
        let html = "x".repeat(50);
        assert!(!v.is_usable(&html, "https://example.com"));
        assert_eq!(v.check(&html), Err(Rejection::TooShort { len: 50 }));
    }

    #[test]
    fn rejects_human_verification_page() {
        let v = PageValidator::default();
        let html = padded("<h1>Please verify you are human</h1>");
        assert!(html.len() >= 5000);
        assert_eq!(
            v.check(&html),
            Err(Rejection::Indicator("please verify you are human"))
        );
    }

    #[test]
    fn accepts_ordinary_job_page() {
        let v = PageValidator::default();
        let html = padded("<h1>Senior Engineer</h1><div class=\"company\">Acme</div>");
        assert!(html.len() >= 5000);
        assert!(v.is_usable(&html, "https://example.com/jobs/1"));
    }

    #[test]
    fn indicator_match_is_case_insensitive() {
        let v = PageValidator::default();
        let html = padded("<title>ACCESS DENIED</title>");
        assert_eq!(v.check(&html), Err(Rejection::Indicator("access denied")));
    }

    #[test]
    fn custom_min_length() {
        let v = PageValidator::new(ValidatorConfig {
            min_length: 10,
            ..Default::default()
        });
        assert!(v.is_usable("<h1>Engineer</h1>", "https://example.com"));
    }
}
