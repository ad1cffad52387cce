//! Site-agnostic selector chains, tried in order until one yields text.

use jobharvest_core::classify::collapse_whitespace;
use jobharvest_core::models::JobRecord;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

pub const TITLE: &[&str] = &[
    "h1",
    "h2",
    r#"meta[property="og:title"]"#,
    r#"meta[name="title"]"#,
    r#"[class*="job"][class*="title"]"#,
    r#"[class*="position"][class*="title"]"#,
    ".job-title",
    ".job_title",
    ".position-title",
    "title",
];

pub const COMPANY: &[&str] = &[
    r#"[class*="company"][class*="name"]"#,
    r#"[class*="employer"][class*="name"]"#,
    ".company",
    ".employer",
    ".company-name",
    r#"[itemprop="hiringOrganization"]"#,
    r#"meta[property="og:company"]"#,
    r#"meta[name="company"]"#,
];

pub const LOCATION: &[&str] = &[
    r#"[class*="location"]"#,
    r#"[class*="address"]"#,
    ".job-location",
    r#"[itemprop="jobLocation"]"#,
    r#"meta[property="og:location"]"#,
    r#"meta[name="location"]"#,
];

pub const DESCRIPTION: &[&str] = &[
    r#"[class*="description"]"#,
    r#"[class*="desc"]"#,
    ".job-description",
    r#"[itemprop="description"]"#,
    "main",
    "article",
    ".content",
];

pub const DATE_POSTED: &[&str] = &[
    r#"[itemprop="datePosted"]"#,
    ".date-posted",
    ".post-date",
    r#"[class*="posted"]"#,
    "time",
    "[datetime]",
    r#"[class*="date"]"#,
];

pub const REQUIREMENTS: &[&str] = &[
    r#"[class*="requirements"]"#,
    ".job-requirements",
    "section.requirements",
    r#"[class*="qualifications"]"#,
];

/// Elements whose `content`/`src` attribute points at the company logo.
pub const LOGO: &[&str] = &[
    r#"meta[property="og:image"]"#,
    r#"img[alt*="logo"]"#,
    r#"img[class*="logo"]"#,
    ".company-logo img",
];

pub const APPLY_LINK: &[&str] = &[r#"a[class*="apply"]"#, r#"a[href*="apply"]"#];

/// Parse a selector, treating invalid ones as "no match".
pub fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            debug!(%selector, error = ?e, "Skipping invalid selector");
            None
        }
    }
}

/// Visible text of an element, or the `content` attribute of a `<meta>`.
pub fn element_text(element: ElementRef<'_>) -> String {
    if element.value().name() == "meta" {
        return collapse_whitespace(element.value().attr("content").unwrap_or_default());
    }
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of the first element matching `selector` that has any text.
pub fn select_text(document: &Html, selector: &str) -> Option<String> {
    let parsed = parse_selector(selector)?;
    document
        .select(&parsed)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// First non-empty text across an ordered selector chain.
pub fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .find_map(|selector| select_text(document, selector))
}

/// Absolute URL from the first element carrying `attr`.
pub fn select_url(document: &Html, selector: &str, attr: &str, base: &str) -> Option<String> {
    let parsed = parse_selector(selector)?;
    document
        .select(&parsed)
        .filter_map(|el| el.value().attr(attr))
        .find_map(|raw| resolve_url(base, raw))
}

/// Resolve `href` against the page URL; only http(s) results are kept.
pub fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let resolved = match Url::parse(base) {
        Ok(base) => base.join(href).ok()?,
        Err(_) => Url::parse(href).ok()?,
    };
    matches!(resolved.scheme(), "http" | "https").then(|| resolved.to_string())
}

fn fill(field: &mut String, document: &Html, selectors: &[&str]) {
    if field.trim().is_empty()
        && let Some(text) = first_text(document, selectors)
    {
        *field = text;
    }
}

/// Fill every field still empty on `record` from the generic chains.
pub fn fill_missing(document: &Html, url: &str, record: &mut JobRecord) {
    fill(&mut record.job_title, document, TITLE);
    fill(&mut record.company, document, COMPANY);
    fill(&mut record.location, document, LOCATION);
    fill(&mut record.job_description, document, DESCRIPTION);
    fill(&mut record.date_posted, document, DATE_POSTED);
    fill(&mut record.requirements, document, REQUIREMENTS);

    if record.company_logo.is_none() {
        record.company_logo = LOGO.iter().find_map(|selector| {
            select_url(document, selector, "content", url)
                .or_else(|| select_url(document, selector, "src", url))
        });
    }

    if record.application_url == record.source_url
        && let Some(apply) = APPLY_LINK
            .iter()
            .find_map(|selector| select_url(document, selector, "href", url))
    {
        record.application_url = apply;
    }
}
