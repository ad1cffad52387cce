use std::future::Future;

use crate::error::AppError;
use crate::models::JobRecord;

/// Fetches raw HTML content from a URL.
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, AppError>> + Send;

    /// Release any long-lived resources (sessions, browser processes).
    ///
    /// Called once per batch on every exit path. Default is a no-op.
    fn close(&self) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Short strategy name used in logs.
    fn name(&self) -> &'static str;
}

/// Converts fetched HTML into a candidate job record.
///
/// Extraction never fails: selector problems surface as empty fields, and an
/// empty `job_title` marks the candidate as unusable.
pub trait Extractor: Send + Sync + Clone {
    fn extract(&self, html: &str, url: &str) -> JobRecord;

    /// Job-detail links found on a search results page.
    fn job_links(&self, _html: &str, _url: &str) -> Vec<String> {
        Vec::new()
    }
}

/// A single persisted encoding of the job collection.
///
/// Object-safe so the output layer can fan out over `Box<dyn RecordStore>`.
pub trait RecordStore: Send + Sync {
    /// Read every persisted record. A missing file is an empty collection.
    fn load(&self) -> Result<Vec<JobRecord>, AppError>;

    /// Merge `records` after the existing contents and rewrite the file.
    /// Returns the number of records appended.
    fn save(&self, records: &[JobRecord]) -> Result<usize, AppError>;

    fn name(&self) -> &str;
}
