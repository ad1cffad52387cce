//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing
//! test assertions on recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::JobRecord;
use crate::traits::{Extractor, Fetcher, RecordStore};

/// Long enough to pass the page validator.
pub fn job_page_html(title: &str) -> String {
    let filler = "<p>Join our team and help us ship dependable software every week.</p>".repeat(30);
    format!("<html><body><h1>{title}</h1>{filler}</body></html>")
}

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher that returns queued responses.
#[derive(Clone)]
pub struct MockFetcher {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns a default job page.
    responses: Arc<Mutex<Vec<Result<String, AppError>>>>,
    /// URLs requested, in call order.
    pub calls: Arc<Mutex<Vec<String>>>,
    pub closed: Arc<Mutex<u32>>,
}

impl MockFetcher {
    pub fn new(html: &str) -> Self {
        Self::with_responses(vec![Ok(html.to_string())])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<String, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            calls: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(Mutex::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn close_count(&self) -> u32 {
        *self.closed.lock().unwrap()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        self.calls.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(job_page_html("Default Job"))
        } else {
            responses.remove(0)
        }
    }

    async fn close(&self) {
        *self.closed.lock().unwrap() += 1;
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// MockExtractor
// ---------------------------------------------------------------------------

/// Mock extractor that hands out queued titles.
///
/// An empty string in the queue produces a failed (title-less) candidate.
#[derive(Clone, Default)]
pub struct MockExtractor {
    titles: Arc<Mutex<Vec<String>>>,
    links: Arc<Mutex<HashMap<String, Vec<String>>>>,
}

impl MockExtractor {
    pub fn with_titles(titles: &[&str]) -> Self {
        Self {
            titles: Arc::new(Mutex::new(titles.iter().map(|t| t.to_string()).collect())),
            links: Arc::default(),
        }
    }

    /// Links returned by `job_links` for the given page URL.
    pub fn with_links(self, page_url: &str, links: &[&str]) -> Self {
        self.links.lock().unwrap().insert(
            page_url.to_string(),
            links.iter().map(|l| l.to_string()).collect(),
        );
        self
    }
}

impl Extractor for MockExtractor {
    fn extract(&self, _html: &str, url: &str) -> JobRecord {
        let mut titles = self.titles.lock().unwrap();
        let title = if titles.is_empty() {
            format!("Job at {url}")
        } else {
            titles.remove(0)
        };
        JobRecord {
            job_title: title,
            company: "Acme".into(),
            location: "Remote".into(),
            job_description: "Full-time role".into(),
            ..JobRecord::new(url)
        }
    }

    fn job_links(&self, _html: &str, url: &str) -> Vec<String> {
        self.links
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// MockStore
// ---------------------------------------------------------------------------

/// In-memory record store.
#[derive(Clone, Default)]
pub struct MockStore {
    pub records: Arc<Mutex<Vec<JobRecord>>>,
    /// Number of `save` calls.
    pub saves: Arc<Mutex<u32>>,
    fail_load: bool,
    fail_save: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<JobRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Default::default()
        }
    }

    pub fn with_load_error(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn with_save_error(mut self) -> Self {
        self.fail_save = true;
        self
    }

    pub fn stored(&self) -> Vec<JobRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> u32 {
        *self.saves.lock().unwrap()
    }
}

impl RecordStore for MockStore {
    fn load(&self) -> Result<Vec<JobRecord>, AppError> {
        if self.fail_load {
            return Err(AppError::StorageError("mock load failure".into()));
        }
        Ok(self.stored())
    }

    fn save(&self, records: &[JobRecord]) -> Result<usize, AppError> {
        *self.saves.lock().unwrap() += 1;
        if self.fail_save {
            return Err(AppError::StorageError("mock save failure".into()));
        }
        self.records.lock().unwrap().extend_from_slice(records);
        Ok(records.len())
    }

    fn name(&self) -> &str {
        "mock"
    }
}
