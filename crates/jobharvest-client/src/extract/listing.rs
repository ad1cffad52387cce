//! Detection of search/listing pages, which must never become job records.

use scraper::Html;
use url::Url;

use super::generic::parse_selector;

/// Class fragments used by repeated job cards on results pages.
const CARD_MARKERS: &[&str] = &[
    "job-card",
    "jobcard",
    "job_card",
    "job-listing",
    "listing-item",
    "result-card",
    "search-result",
    "base-card",
];

const PAGINATION: &[&str] = &[r#"[class*="pagination"]"#, r#"a[rel="next"]"#];

/// Path fragments of single-posting URLs. These pages often carry a
/// "similar jobs" rail, so their content is not used as listing evidence.
const DETAIL_PATH_MARKERS: &[&str] = &[
    "/jobs/view/",
    "/viewjob",
    "/job/",
    "/job-listing",
    "/position/",
    "/vacancy/",
    "/remote-jobs/",
];

/// More than this many job cards means a results page.
const MAX_CARDS: usize = 3;

const PAGING_PARAMS: &[&str] = &["start", "page"];

/// URL shape of a results page: "search"/"results" in the URL, or a numeric
/// `start`/`page` query parameter.
pub fn is_listing_url(url: &str) -> bool {
    let lowered = url.to_lowercase();
    if lowered.contains("search") || lowered.contains("results") {
        return true;
    }
    Url::parse(&lowered)
        .map(|u| {
            u.query_pairs().any(|(key, value)| {
                PAGING_PARAMS.contains(&key.as_ref())
                    && !value.is_empty()
                    && value.chars().all(|c| c.is_ascii_digit())
            })
        })
        .unwrap_or(false)
}

fn is_detail_url(url: &str) -> bool {
    let lowered = url.to_lowercase();
    DETAIL_PATH_MARKERS.iter().any(|m| lowered.contains(m))
}

/// Content shape of a results page: repeated job cards or pagination controls.
pub fn is_listing_document(document: &Html) -> bool {
    let card_count = parse_selector("[class]")
        .map(|any_class| {
            document
                .select(&any_class)
                .filter(|el| {
                    el.value().classes().any(|class| {
                        let class = class.to_lowercase();
                        CARD_MARKERS.iter().any(|m| class.contains(m))
                    })
                })
                .count()
        })
        .unwrap_or(0);
    if card_count > MAX_CARDS {
        return true;
    }

    PAGINATION
        .iter()
        .filter_map(|s| parse_selector(s))
        .any(|selector| document.select(&selector).next().is_some())
}

/// True when the page is a listing rather than a single posting.
pub fn is_listing_page(document: &Html, url: &str) -> bool {
    is_listing_url(url) || (!is_detail_url(url) && is_listing_document(document))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cards(n: usize) -> String {
        let cards: String = (0..n)
            .map(|i| format!(r#"<div class="job-card">Job {i}</div>"#))
            .collect();
        format!("<html><body><h1>Jobs</h1>{cards}</body></html>")
    }

    #[test]
    fn listing_urls() {
        assert!(is_listing_url("https://www.linkedin.com/jobs/search/?keywords=rust"));
        assert!(is_listing_url("https://example.com/results?q=rust"));
        assert!(is_listing_url("https://www.indeed.com/jobs?q=rust&start=10"));
        assert!(is_listing_url("https://example.com/careers?page=2"));
        assert!(!is_listing_url("https://example.com/careers?page=about"));
    }

    #[test]
    fn detail_urls_are_not_listings() {
        assert!(!is_listing_url("https://www.linkedin.com/jobs/view/3812345678"));
        assert!(!is_listing_url("https://www.acme.com/jobs/backend-engineer"));
    }

    #[test]
    fn repeated_cards_mark_a_listing() {
        let url = "https://careers.acme.com/openings";
        assert!(!is_listing_page(&Html::parse_document(&cards(3)), url));
        assert!(is_listing_page(&Html::parse_document(&cards(4)), url));
    }

    #[test]
    fn pagination_marks_a_listing() {
        let html = r#"<html><body><h1>Jobs</h1><nav class="pagination"><a href="?p=2">2</a></nav></body></html>"#;
        assert!(is_listing_document(&Html::parse_document(html)));
        let html = r#"<html><body><a rel="next" href="/p/2">Next</a></body></html>"#;
        assert!(is_listing_document(&Html::parse_document(html)));
    }

    #[test]
    fn class_names_with_page_are_not_pagination() {
        let html = r#"<html><body><div class="page-wrapper"><h1>Engineer</h1></div></body></html>"#;
        assert!(!is_listing_document(&Html::parse_document(html)));
    }

    #[test]
    fn detail_page_with_similar_jobs_rail_is_not_a_listing() {
        let document = Html::parse_document(&cards(6));
        assert!(!is_listing_page(
            &document,
            "https://www.linkedin.com/jobs/view/3812345678"
        ));
    }
}
