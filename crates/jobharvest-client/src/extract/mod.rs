//! HTML → [`JobRecord`] extraction.
//!
//! A known board's selector profile is tried first; anything it leaves
//! empty falls through to the generic chains. Listing pages short-circuit
//! to an empty-title record so they are never stored as jobs.

pub mod generic;
pub mod listing;
pub mod sites;

use jobharvest_core::classify::collapse_whitespace;
use jobharvest_core::models::JobRecord;
use jobharvest_core::traits::Extractor;
use scraper::Html;
use tracing::{debug, info};

use crate::discover::discover_job_urls;
use generic::{select_text, select_url};
pub use listing::is_listing_page;
use sites::{SelectorProfile, Site};

/// Extractor driven by CSS selectors (scraper).
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectorExtractor;

impl SelectorExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn apply_profile(document: &Html, url: &str, profile: &SelectorProfile, record: &mut JobRecord) {
    let fields: [(&mut String, &str); 5] = [
        (&mut record.job_title, profile.title),
        (&mut record.company, profile.company),
        (&mut record.location, profile.location),
        (&mut record.job_description, profile.description),
        (&mut record.date_posted, profile.date_posted),
    ];
    for (field, selector) in fields {
        if let Some(text) = select_text(document, selector) {
            *field = text;
        }
    }
    if let Some(link) = select_url(document, profile.link, "href", url) {
        record.application_url = link;
    }
}

impl Extractor for SelectorExtractor {
    fn extract(&self, html: &str, url: &str) -> JobRecord {
        let document = Html::parse_document(html);
        let mut record = JobRecord::new(url);

        if is_listing_page(&document, url) {
            info!(%url, "Listing page, not a single job");
            return record;
        }

        let site = Site::detect(url);
        if let Some(profile) = site.profile() {
            debug!(%url, ?site, "Using site selectors");
            apply_profile(&document, url, profile, &mut record);
        }
        generic::fill_missing(&document, url, &mut record);

        for field in [
            &mut record.job_title,
            &mut record.company,
            &mut record.location,
            &mut record.job_description,
            &mut record.requirements,
            &mut record.date_posted,
        ] {
            *field = collapse_whitespace(field);
        }
        record
    }

    fn job_links(&self, html: &str, url: &str) -> Vec<String> {
        discover_job_urls(html, url)
    }
}
