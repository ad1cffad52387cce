//! Keyword classification of work setting and job type, plus text cleanup.
//!
//! Matching is case-insensitive substring search; the first rule that matches
//! wins.

use crate::models::{JobRecord, JobType, WorkSetting};

const REMOTE_KEYWORDS: &[&str] = &["remote", "work from home", "wfh", "virtual", "telecommute"];
const HYBRID_KEYWORDS: &[&str] = &["hybrid", "partially remote", "flexible", "part remote"];

const JOB_TYPE_RULES: &[(JobType, &[&str])] = &[
    (
        JobType::FullTime,
        &["full-time", "full time", "fulltime", "full.time"],
    ),
    (
        JobType::PartTime,
        &["part-time", "part time", "parttime", "part.time"],
    ),
    (
        JobType::Contract,
        &["contract", "freelance", "consultant", "contractor"],
    ),
    (JobType::Internship, &["internship", "intern", "trainee"]),
    (JobType::Temporary, &["temporary", "temp"]),
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn classify_work_setting(location: &str, description: &str) -> WorkSetting {
    let text = format!("{location} {description}").to_lowercase();
    if contains_any(&text, REMOTE_KEYWORDS) {
        WorkSetting::Remote
    } else if contains_any(&text, HYBRID_KEYWORDS) {
        WorkSetting::Hybrid
    } else {
        WorkSetting::InPerson
    }
}

pub fn classify_job_type(description: &str) -> JobType {
    let text = description.to_lowercase();
    JOB_TYPE_RULES
        .iter()
        .find(|(_, keywords)| contains_any(&text, keywords))
        .map(|(job_type, _)| *job_type)
        .unwrap_or(JobType::Unknown)
}

impl JobRecord {
    /// Clean every text field and derive `work_setting` / `job_type`.
    pub fn classify(mut self) -> Self {
        for field in [
            &mut self.job_title,
            &mut self.company,
            &mut self.location,
            &mut self.job_description,
            &mut self.requirements,
            &mut self.date_posted,
        ] {
            *field = collapse_whitespace(field);
        }
        self.application_url = self.application_url.trim().to_string();
        self.company_logo = self
            .company_logo
            .map(|logo| logo.trim().to_string())
            .filter(|logo| !logo.is_empty());

        self.work_setting = classify_work_setting(&self.location, &self.job_description);
        self.job_type = classify_job_type(&self.job_description);
        self
    }
}
