use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sha2::{Digest, Sha256};

use crate::error::AppError;

/// Fixed column order shared by every tabular encoding.
pub const COLUMNS: [&str; 12] = [
    "job_title",
    "company",
    "location",
    "work_setting",
    "job_type",
    "company_logo",
    "job_description",
    "requirements",
    "application_url",
    "date_posted",
    "date_collected",
    "source_url",
];

/// Separator between the identifying fields fed to the content hash.
const HASH_SEPARATOR: &str = "\u{1f}";

/// Where the job is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkSetting {
    Remote,
    Hybrid,
    #[default]
    InPerson,
}

impl WorkSetting {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkSetting::Remote => "remote",
            WorkSetting::Hybrid => "hybrid",
            WorkSetting::InPerson => "in-person",
        }
    }
}

impl fmt::Display for WorkSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WorkSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remote" => Ok(WorkSetting::Remote),
            "hybrid" => Ok(WorkSetting::Hybrid),
            "in-person" | "" => Ok(WorkSetting::InPerson),
            _ => Err(format!("Unknown work setting: {s}")),
        }
    }
}

/// Employment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
    #[default]
    Unknown,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "full-time",
            JobType::PartTime => "part-time",
            JobType::Contract => "contract",
            JobType::Internship => "internship",
            JobType::Temporary => "temporary",
            JobType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for JobType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full-time" => Ok(JobType::FullTime),
            "part-time" => Ok(JobType::PartTime),
            "contract" => Ok(JobType::Contract),
            "internship" => Ok(JobType::Internship),
            "temporary" => Ok(JobType::Temporary),
            "unknown" | "" => Ok(JobType::Unknown),
            _ => Err(format!("Unknown job type: {s}")),
        }
    }
}

/// Output encodings the store can maintain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    Csv,
    Json,
    Excel,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Excel => "excel",
        }
    }

    pub fn all() -> Vec<OutputFormat> {
        vec![OutputFormat::Csv, OutputFormat::Json, OutputFormat::Excel]
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "excel" | "xlsx" => Ok(OutputFormat::Excel),
            other => Err(format!(
                "Unknown output format '{other}' (expected csv, json or excel)"
            )),
        }
    }
}

/// One normalized job posting.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JobRecord {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub work_setting: WorkSetting,
    pub job_type: JobType,
    #[serde(deserialize_with = "empty_as_none")]
    pub company_logo: Option<String>,
    pub job_description: String,
    pub requirements: String,
    pub application_url: String,
    pub date_posted: String,
    #[serde(with = "timestamp")]
    pub date_collected: DateTime<Utc>,
    pub source_url: String,
}

impl JobRecord {
    /// Empty candidate for a fetched URL, stamped with the capture time.
    ///
    /// `application_url` starts out as the fetched URL so it is populated
    /// even when nothing else extracts.
    pub fn new(source_url: &str) -> Self {
        Self {
            application_url: source_url.to_string(),
            source_url: source_url.to_string(),
            date_collected: Utc::now().trunc_subsecs(0),
            ..Default::default()
        }
    }

    /// A candidate without a title is an extraction failure.
    pub fn has_title(&self) -> bool {
        !self.job_title.trim().is_empty()
    }

    /// Content hash over the identifying fields only.
    pub fn content_hash(&self) -> String {
        compute_hash(
            &[
                self.job_title.as_str(),
                self.company.as_str(),
                self.location.as_str(),
                self.date_posted.as_str(),
            ]
            .join(HASH_SEPARATOR),
        )
    }

    /// Cells in [`COLUMNS`] order.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.job_title.clone(),
            self.company.clone(),
            self.location.clone(),
            self.work_setting.to_string(),
            self.job_type.to_string(),
            self.company_logo.clone().unwrap_or_default(),
            self.job_description.clone(),
            self.requirements.clone(),
            self.application_url.clone(),
            self.date_posted.clone(),
            timestamp::format(&self.date_collected),
            self.source_url.clone(),
        ]
    }

    /// Rebuild a record from a header row and matching cells.
    ///
    /// Columns are matched by name, so reordered or missing columns are
    /// tolerated; missing ones fall back to defaults.
    pub fn from_row(headers: &[String], cells: &[String]) -> Result<Self, AppError> {
        let fields: HashMap<&str, &str> = headers
            .iter()
            .map(String::as_str)
            .zip(cells.iter().map(String::as_str))
            .collect();
        let get = |name: &str| fields.get(name).copied().unwrap_or_default().to_string();

        let work_setting = get("work_setting")
            .parse()
            .map_err(AppError::StorageError)?;
        let job_type = get("job_type").parse().map_err(AppError::StorageError)?;
        let date_collected = match fields.get("date_collected") {
            Some(raw) if !raw.trim().is_empty() => {
                timestamp::parse(raw).map_err(AppError::StorageError)?
            }
            _ => DateTime::<Utc>::default(),
        };
        let logo = get("company_logo");

        Ok(Self {
            job_title: get("job_title"),
            company: get("company"),
            location: get("location"),
            work_setting,
            job_type,
            company_logo: (!logo.is_empty()).then_some(logo),
            job_description: get("job_description"),
            requirements: get("requirements"),
            application_url: get("application_url"),
            date_posted: get("date_posted"),
            date_collected,
            source_url: get("source_url"),
        })
    }
}

/// Compute a SHA-256 hash of a string, returned as 64-char hex.
pub fn compute_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// `date_collected` encoding: RFC 3339 on write; RFC 3339 or
/// `YYYY-MM-DD HH:MM:SS` (treated as UTC) on read.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const LEGACY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn format(value: &DateTime<Utc>) -> String {
        value.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, String> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, LEGACY_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("Invalid date_collected '{raw}': {e}"))
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(value))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(DateTime::<Utc>::default());
        }
        parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_names() {
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("xlsx".parse::<OutputFormat>(), Ok(OutputFormat::Excel));
        assert!("parquet".parse::<OutputFormat>().is_err());
    }

    fn sample() -> JobRecord {
        JobRecord {
            job_title: "Senior Engineer".into(),
            company: "Acme".into(),
            location: "Berlin".into(),
            date_posted: "2 days ago".into(),
            job_description: "Build things".into(),
            ..JobRecord::new("https://example.com/jobs/1")
        }
    }

    #[test]
    fn test_compute_hash_consistency() {
        let h1 = compute_hash("hello world");
        let h2 = compute_hash("hello world");
        assert_eq!(h1, h2);
        assert_eq!(h1.len(), 64);
    }

    #[test]
    fn test_compute_hash_different_inputs() {
        assert_ne!(compute_hash("hello"), compute_hash("world"));
    }

    #[test]
    fn content_hash_ignores_non_identifying_fields() {
        let a = sample();
        let mut b = a.clone();
        b.job_description = "Something else entirely".into();
        b.requirements = "Rust".into();
        b.work_setting = WorkSetting::Remote;
        b.job_type = JobType::Contract;
        b.company_logo = Some("https://example.com/logo.png".into());
        b.application_url = "https://example.com/apply".into();
        b.source_url = "https://mirror.example.com/jobs/1".into();
        assert_eq!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn content_hash_tracks_identifying_fields() {
        let a = sample();
        for mutate in [
            |r: &mut JobRecord| r.job_title.push('!'),
            |r: &mut JobRecord| r.company.push('!'),
            |r: &mut JobRecord| r.location.push('!'),
            |r: &mut JobRecord| r.date_posted.push('!'),
        ] {
            let mut b = a.clone();
            mutate(&mut b);
            assert_ne!(a.content_hash(), b.content_hash());
        }
    }

    #[test]
    fn content_hash_is_case_sensitive() {
        let a = sample();
        let mut b = a.clone();
        b.company = "ACME".into();
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn content_hash_separator_prevents_field_bleed() {
        let mut a = sample();
        a.job_title = "ab".into();
        a.company = "c".into();
        let mut b = a.clone();
        b.job_title = "a".into();
        b.company = "bc".into();
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn new_record_falls_back_to_fetched_url() {
        let r = JobRecord::new("https://example.com/jobs/9");
        assert_eq!(r.application_url, "https://example.com/jobs/9");
        assert_eq!(r.source_url, "https://example.com/jobs/9");
        assert!(!r.has_title());
        assert_eq!(r.date_collected.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn enums_serialize_kebab_case() {
        let mut r = sample();
        r.work_setting = WorkSetting::InPerson;
        r.job_type = JobType::FullTime;
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["work_setting"], "in-person");
        assert_eq!(json["job_type"], "full-time");
    }

    #[test]
    fn json_roundtrip_preserves_record() {
        let r = sample();
        let json = serde_json::to_string(&r).unwrap();
        let back: JobRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn empty_logo_deserializes_as_none() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["company_logo"] = serde_json::json!("");
        let r: JobRecord = serde_json::from_value(json).unwrap();
        assert_eq!(r.company_logo, None);
    }

    #[test]
    fn legacy_timestamp_is_accepted() {
        let parsed = timestamp::parse("2024-05-01 13:45:00").unwrap();
        assert_eq!(timestamp::format(&parsed), "2024-05-01T13:45:00Z");
    }

    #[test]
    fn row_roundtrip_matches_columns() {
        let mut r = sample();
        r.company_logo = Some("https://example.com/logo.png".into());
        let headers: Vec<String> = COLUMNS.iter().map(|c| c.to_string()).collect();
        let row = r.to_row();
        assert_eq!(row.len(), COLUMNS.len());
        let back = JobRecord::from_row(&headers, &row).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn from_row_rejects_unknown_enum_value() {
        let headers = vec!["job_title".to_string(), "job_type".to_string()];
        let cells = vec!["Engineer".to_string(), "gig".to_string()];
        assert!(JobRecord::from_row(&headers, &cells).is_err());
    }
}
