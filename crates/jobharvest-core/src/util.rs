use url::Url;

/// Substrings of a lower-cased query key that mark a tracking parameter.
const TRACKING_PARAMS: &[&str] = &["utm_", "fbclid", "gclid", "msclkid"];

/// Strip tracking query parameters, keeping path and the remaining params in order.
///
/// Input that does not parse as a URL is returned trimmed and otherwise untouched.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };
    if url.query().is_none() {
        return url.to_string();
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| {
            let key = key.to_lowercase();
            !TRACKING_PARAMS.iter().any(|t| key.contains(t))
        })
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url.to_string()
}

/// Seed URLs that point at a search results page rather than a single job.
pub fn is_search_url(url: &str) -> bool {
    let lowered = url.to_lowercase();
    lowered.contains("search") || lowered.contains("results")
}
