use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings shared by both headless browser fetchers.
#[derive(Debug, Clone)]
pub struct BrowserSettings {
    /// Per-URL budget for navigation and rendering.
    pub timeout: Duration,
    /// Bounds of the random pause after the DOM is ready.
    pub pause_min: Duration,
    pub pause_max: Duration,
    pub chrome_path: Option<PathBuf>,
}

impl Default for BrowserSettings {
    /// 30s timeout, 2-4s pause, binary auto-detected.
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            pause_min: Duration::from_secs(2),
            pause_max: Duration::from_secs(4),
            chrome_path: None,
        }
    }
}

impl BrowserSettings {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_pause(mut self, min: Duration, max: Duration) -> Self {
        self.pause_min = min;
        self.pause_max = max;
        self
    }

    pub fn with_chrome_path(mut self, path: Option<PathBuf>) -> Self {
        self.chrome_path = path;
        self
    }

    /// Binary to launch: the configured path, else auto-detection.
    pub fn executable(&self) -> Option<PathBuf> {
        find_chrome_binary(self.chrome_path.as_deref())
    }
}

/// Well-known Chrome/Chromium install locations, checked in order.
const CANDIDATES: &[&str] = &[
    // Snap wraps the real binary and strips headless flags
    "/snap/chromium/current/usr/lib/chromium-browser/chrome",
    "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/google-chrome",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
];

/// Locate a Chrome/Chromium binary.
///
/// An explicit `override_path` (normally `CHROME_BIN`) wins when it exists.
/// Returns `None` to let the browser library do its own lookup.
pub fn find_chrome_binary(override_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = override_path
        && path.exists()
    {
        return Some(path.to_path_buf());
    }
    if let Ok(p) = std::env::var("CHROME_BIN") {
        let path = PathBuf::from(p);
        if path.exists() {
            return Some(path);
        }
    }

    CANDIDATES.iter().map(PathBuf::from).find(|p| p.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_override_wins() {
        let dir = std::env::temp_dir();
        assert_eq!(find_chrome_binary(Some(&dir)), Some(dir.clone()));
    }

    #[test]
    fn missing_override_is_ignored() {
        let missing = Path::new("/definitely/not/a/chrome/binary");
        assert_ne!(find_chrome_binary(Some(missing)), Some(missing.to_path_buf()));
    }
}
