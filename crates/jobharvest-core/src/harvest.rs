use std::collections::HashSet;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::dedup::DedupRegistry;
use crate::error::AppError;
use crate::models::JobRecord;
use crate::pacing::{PacingConfig, pause};
use crate::retry::RetryPolicy;
use crate::traits::{Extractor, Fetcher, RecordStore};
use crate::util::{is_search_url, normalize_url};

/// Events emitted by the harvest pipeline for monitoring/logging.
#[derive(Debug, Clone)]
pub enum HarvestEvent<'a> {
    CycleStarted {
        seeds: usize,
    },
    SearchExpanded {
        url: &'a str,
        found: usize,
    },
    UrlStarted {
        index: usize,
        total: usize,
        url: &'a str,
    },
    UrlFailed {
        url: &'a str,
        error: &'a str,
    },
    RecordExtracted {
        url: &'a str,
        title: &'a str,
    },
    ExtractionEmpty {
        url: &'a str,
    },
    Interrupted {
        remaining: usize,
    },
    CycleFinished {
        summary: &'a CycleSummary,
    },
}

/// Trait for receiving harvest events (decoupled logging).
pub trait HarvestReporter: Send + Sync {
    fn report(&self, event: HarvestEvent<'_>) {
        let _ = event;
    }
}

/// Reporter that uses the `tracing` crate.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingHarvestReporter;

impl HarvestReporter for TracingHarvestReporter {
    fn report(&self, event: HarvestEvent<'_>) {
        match event {
            HarvestEvent::CycleStarted { seeds } => {
                tracing::info!(%seeds, "Harvest cycle started");
            }
            HarvestEvent::SearchExpanded { url, found } => {
                tracing::info!(%url, %found, "Collected job links from search page");
            }
            HarvestEvent::UrlStarted { index, total, url } => {
                tracing::info!(%index, %total, %url, "Scraping job");
            }
            HarvestEvent::UrlFailed { url, error } => {
                tracing::warn!(%url, %error, "Could not scrape URL");
            }
            HarvestEvent::RecordExtracted { url, title } => {
                tracing::info!(%url, %title, "Extracted job");
            }
            HarvestEvent::ExtractionEmpty { url } => {
                tracing::warn!(%url, "No job title found, skipping");
            }
            HarvestEvent::Interrupted { remaining } => {
                tracing::warn!(%remaining, "Harvest interrupted");
            }
            HarvestEvent::CycleFinished { summary } => {
                tracing::info!(
                    targets = summary.targets,
                    attempted = summary.attempted,
                    extracted = summary.extracted,
                    unique = summary.unique,
                    saved = summary.saved,
                    unscraped = summary.unscraped.len(),
                    cancelled = summary.cancelled,
                    elapsed_ms = summary.elapsed.as_millis() as u64,
                    "Harvest cycle finished"
                );
                if !summary.unscraped.is_empty() {
                    tracing::warn!(urls = ?summary.unscraped, "Unscraped URLs");
                }
            }
        }
    }
}

/// Records produced by one pass over a URL list.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub records: Vec<JobRecord>,
    pub unscraped: Vec<String>,
    pub attempted: usize,
    pub cancelled: bool,
}

/// Counters for one harvest cycle.
#[derive(Debug, Clone, Default)]
pub struct CycleSummary {
    pub targets: usize,
    pub attempted: usize,
    pub extracted: usize,
    pub unique: usize,
    pub saved: usize,
    pub unscraped: Vec<String>,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl CycleSummary {
    /// A cycle succeeds when at least one job was extracted.
    pub fn is_success(&self) -> bool {
        self.extracted > 0
    }
}

/// Sequential fetch → extract → classify pipeline.
///
/// URLs are processed one at a time in input order; each fetch goes through
/// the retry policy, and a pacing delay separates consecutive URLs.
pub struct HarvestService<F, E>
where
    F: Fetcher,
    E: Extractor,
{
    fetcher: F,
    extractor: E,
    retry: RetryPolicy,
    pacing: PacingConfig,
}

impl<F, E> HarvestService<F, E>
where
    F: Fetcher,
    E: Extractor,
{
    pub fn new(fetcher: F, extractor: E) -> Self {
        Self {
            fetcher,
            extractor,
            retry: RetryPolicy::default(),
            pacing: PacingConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingConfig) -> Self {
        self.pacing = pacing;
        self
    }

    /// Expand seeds into the list of job URLs to scrape.
    ///
    /// Search pages are fetched and replaced, in place, by the job links
    /// found on them. Explicit and discovered URLs are normalized and
    /// deduplicated, first occurrence kept.
    pub async fn resolve_targets<R: HarvestReporter>(
        &self,
        seeds: &[String],
        cancel: &CancellationToken,
        reporter: &R,
    ) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        let mut push = |url: String, targets: &mut Vec<String>| {
            if seen.insert(url.clone()) {
                targets.push(url);
            }
        };

        let seeds: Vec<String> = seeds
            .iter()
            .map(|seed| normalize_url(seed))
            .filter(|seed| !seed.is_empty())
            .collect();
        let searches = seeds.iter().filter(|s| is_search_url(s)).count();
        let mut fetched = 0;

        for seed in seeds {
            if !is_search_url(&seed) {
                push(seed, &mut targets);
                continue;
            }
            if cancel.is_cancelled() {
                break;
            }

            match self
                .retry
                .run(&seed, cancel, || self.fetcher.fetch(&seed))
                .await
            {
                Ok(html) => {
                    let links = self.extractor.job_links(&html, &seed);
                    reporter.report(HarvestEvent::SearchExpanded {
                        url: &seed,
                        found: links.len(),
                    });
                    for link in links {
                        push(normalize_url(&link), &mut targets);
                    }
                }
                Err(AppError::Cancelled) => break,
                Err(e) => {
                    reporter.report(HarvestEvent::UrlFailed {
                        url: &seed,
                        error: &e.to_string(),
                    });
                }
            }

            fetched += 1;
            if fetched < searches && !pause(self.pacing.delay_for(fetched), cancel).await {
                break;
            }
        }
        targets
    }

    /// Scrape every URL in order.
    ///
    /// Failures are recorded as unscraped and never abort the batch. A
    /// cancellation stops the batch between URLs; records gathered so far
    /// are kept.
    pub async fn collect<R: HarvestReporter>(
        &self,
        urls: &[String],
        cancel: &CancellationToken,
        reporter: &R,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let total = urls.len();

        for (index, url) in urls.iter().enumerate() {
            if cancel.is_cancelled() {
                reporter.report(HarvestEvent::Interrupted {
                    remaining: total - index,
                });
                outcome.cancelled = true;
                break;
            }

            reporter.report(HarvestEvent::UrlStarted {
                index: index + 1,
                total,
                url,
            });
            outcome.attempted += 1;

            match self.retry.run(url, cancel, || self.fetcher.fetch(url)).await {
                Ok(html) => {
                    let record = self.extractor.extract(&html, url).classify();
                    if record.has_title() {
                        reporter.report(HarvestEvent::RecordExtracted {
                            url,
                            title: &record.job_title,
                        });
                        outcome.records.push(record);
                    } else {
                        reporter.report(HarvestEvent::ExtractionEmpty { url });
                        outcome.unscraped.push(url.clone());
                    }
                }
                Err(AppError::Cancelled) => {
                    outcome.unscraped.push(url.clone());
                    reporter.report(HarvestEvent::Interrupted {
                        remaining: total - index,
                    });
                    outcome.cancelled = true;
                    break;
                }
                Err(e) => {
                    reporter.report(HarvestEvent::UrlFailed {
                        url,
                        error: &e.to_string(),
                    });
                    outcome.unscraped.push(url.clone());
                }
            }

            if index + 1 < total && !pause(self.pacing.delay_for(index), cancel).await {
                reporter.report(HarvestEvent::Interrupted {
                    remaining: total - index - 1,
                });
                outcome.cancelled = true;
                break;
            }
        }

        outcome
    }

    /// One full cycle: expand seeds, scrape, drop duplicates, persist.
    ///
    /// The fetcher is closed on every exit path.
    pub async fn run_cycle<S, R>(
        &self,
        seeds: &[String],
        registry: &mut DedupRegistry,
        store: &S,
        cancel: &CancellationToken,
        reporter: &R,
    ) -> Result<CycleSummary, AppError>
    where
        S: RecordStore + ?Sized,
        R: HarvestReporter,
    {
        if seeds.is_empty() {
            return Err(AppError::ConfigError("No URLs to scrape".into()));
        }

        let result = self
            .cycle_inner(seeds, registry, store, cancel, reporter)
            .await;
        self.fetcher.close().await;
        result
    }

    async fn cycle_inner<S, R>(
        &self,
        seeds: &[String],
        registry: &mut DedupRegistry,
        store: &S,
        cancel: &CancellationToken,
        reporter: &R,
    ) -> Result<CycleSummary, AppError>
    where
        S: RecordStore + ?Sized,
        R: HarvestReporter,
    {
        let start = Instant::now();
        reporter.report(HarvestEvent::CycleStarted { seeds: seeds.len() });

        let targets = self.resolve_targets(seeds, cancel, reporter).await;
        let outcome = self.collect(&targets, cancel, reporter).await;
        let extracted = outcome.records.len();

        let unique = registry.filter_unique(outcome.records);
        let saved = if unique.is_empty() {
            0
        } else {
            store.save(&unique)?
        };

        let summary = CycleSummary {
            targets: targets.len(),
            attempted: outcome.attempted,
            extracted,
            unique: unique.len(),
            saved,
            unscraped: outcome.unscraped,
            cancelled: outcome.cancelled || cancel.is_cancelled(),
            elapsed: start.elapsed(),
        };
        reporter.report(HarvestEvent::CycleFinished { summary: &summary });
        Ok(summary)
    }
}
