use std::collections::HashSet;

use tracing::{info, warn};

use crate::models::JobRecord;
use crate::traits::RecordStore;

/// In-memory set of content hashes already collected.
///
/// Seeded from persisted output at startup and grown as records are
/// accepted. Never written to disk on its own.
#[derive(Debug, Clone, Default)]
pub struct DedupRegistry {
    seen: HashSet<String>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry from every given source.
    ///
    /// A source that cannot be read is logged and skipped.
    pub fn bootstrap(sources: &[&dyn RecordStore]) -> Self {
        let mut registry = Self::new();
        for source in sources {
            match source.load() {
                Ok(records) => {
                    for record in &records {
                        registry.register(record);
                    }
                }
                Err(e) => {
                    warn!(store = source.name(), error = %e, "Could not read existing jobs");
                }
            }
        }
        info!(count = registry.len(), "Loaded existing job hashes");
        registry
    }

    pub fn is_duplicate(&self, record: &JobRecord) -> bool {
        self.seen.contains(&record.content_hash())
    }

    /// Returns true when the hash was not already present.
    pub fn register(&mut self, record: &JobRecord) -> bool {
        self.seen.insert(record.content_hash())
    }

    /// Keep records not seen before, registering each as it is accepted.
    ///
    /// Order is preserved; within the batch the first occurrence wins.
    pub fn filter_unique(&mut self, records: Vec<JobRecord>) -> Vec<JobRecord> {
        let total = records.len();
        let unique: Vec<JobRecord> = records
            .into_iter()
            .filter(|record| self.register(record))
            .collect();
        let dropped = total - unique.len();
        if dropped > 0 {
            info!(dropped, kept = unique.len(), "Filtered duplicate jobs");
        }
        unique
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockStore;

    fn job(title: &str, company: &str) -> JobRecord {
        JobRecord {
            job_title: title.into(),
            company: company.into(),
            location: "Remote".into(),
            ..JobRecord::new("https://example.com/jobs/1")
        }
    }

    #[test]
    fn filter_unique_twice() {
        let mut registry = DedupRegistry::new();
        let batch = vec![job("A", "X"), job("B", "X"), job("C", "Y")];
        assert_eq!(registry.filter_unique(batch.clone()).len(), 3);
        assert!(registry.filter_unique(batch).is_empty());
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn intra_batch_duplicates_keep_first() {
        let mut registry = DedupRegistry::new();
        let mut first = job("A", "X");
        first.source_url = "https://example.com/first".into();
        let mut second = job("A", "X");
        second.source_url = "https://example.com/second".into();

        let kept = registry.filter_unique(vec![first, job("B", "X"), second]);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].source_url, "https://example.com/first");
        assert_eq!(kept[1].job_title, "B");
    }

    #[test]
    fn is_duplicate_does_not_mutate() {
        let registry = DedupRegistry::new();
        let r = job("A", "X");
        assert!(!registry.is_duplicate(&r));
        assert!(!registry.is_duplicate(&r));
        assert!(registry.is_empty());
    }

    #[test]
    fn register_is_idempotent() {
        let mut registry = DedupRegistry::new();
        let r = job("A", "X");
        assert!(registry.register(&r));
        assert!(!registry.register(&r));
        assert_eq!(registry.len(), 1);
        assert!(registry.is_duplicate(&r));
    }

    #[test]
    fn bootstrap_skips_unreadable_sources() {
        let good = MockStore::with_records(vec![job("A", "X"), job("B", "X")]);
        let bad = MockStore::new().with_load_error();
        let registry = DedupRegistry::bootstrap(&[&good, &bad]);
        assert_eq!(registry.len(), 2);
        assert!(registry.is_duplicate(&job("A", "X")));
    }
}
