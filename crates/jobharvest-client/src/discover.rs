//! Job-detail link discovery on search results pages.

use std::collections::HashSet;

use scraper::Html;
use tracing::debug;

use crate::extract::generic::{parse_selector, resolve_url};
use crate::extract::sites::Site;

/// At most this many links are taken from one results page.
pub const MAX_LINKS_PER_PAGE: usize = 10;

/// Card links on LinkedIn results; only `/jobs/view/` targets are postings.
const LINKEDIN_CARDS: &str = "a.base-card__full-link, a.job-card-container__link";
const LINKEDIN_DETAIL_PATH: &str = "/jobs/view/";

const INDEED_CARDS: &str = "a.jcs-JobTitle, a.jobTitle";

#[derive(Default)]
struct Links {
    urls: Vec<String>,
    seen: HashSet<String>,
}

impl Links {
    fn collect(&mut self, document: &Html, page_url: &str, selector: &str, keep: fn(&str) -> bool) {
        let Some(parsed) = parse_selector(selector) else {
            return;
        };
        for href in document.select(&parsed).filter_map(|el| el.value().attr("href")) {
            if self.urls.len() >= MAX_LINKS_PER_PAGE {
                return;
            }
            if let Some(url) = resolve_url(page_url, href)
                && keep(&url)
                && self.seen.insert(url.clone())
            {
                self.urls.push(url);
            }
        }
    }
}

/// Collect absolute job-detail URLs from a results page, in document order,
/// deduplicated and capped at [`MAX_LINKS_PER_PAGE`].
pub fn discover_job_urls(html: &str, page_url: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Links::default();

    links.collect(&document, page_url, LINKEDIN_CARDS, |url| {
        url.contains(LINKEDIN_DETAIL_PATH)
    });
    links.collect(&document, page_url, INDEED_CARDS, |_| true);

    if links.urls.is_empty()
        && let Some(profile) = Site::detect(page_url).profile()
    {
        links.collect(&document, page_url, profile.link, |_| true);
    }

    debug!(url = %page_url, found = links.urls.len(), "Discovered job links");
    links.urls
}
