pub mod classify;
pub mod dedup;
pub mod error;
pub mod harvest;
pub mod models;
pub mod pacing;
pub mod retry;
pub mod schedule;
pub mod traits;
pub mod util;
pub mod validate;

#[cfg(any(test, feature = "testutil"))]
pub mod testutil;

pub use classify::{classify_job_type, classify_work_setting, collapse_whitespace};
pub use dedup::DedupRegistry;
pub use error::AppError;
pub use harvest::{
    BatchOutcome, CycleSummary, HarvestEvent, HarvestReporter, HarvestService,
    TracingHarvestReporter,
};
pub use models::{COLUMNS, JobRecord, JobType, OutputFormat, WorkSetting, compute_hash};
pub use pacing::{PacingConfig, pause, random_between};
pub use retry::RetryPolicy;
pub use schedule::{ScheduleConfig, Scheduler};
pub use traits::{Extractor, Fetcher, RecordStore};
pub use util::{is_search_url, normalize_url};
pub use validate::{PageValidator, Rejection, ValidatorConfig};
