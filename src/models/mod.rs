//! Data models module
//!
//! Defines core data structures:
//! - LogRecord: one parsed access-log line
//! - HttpMethod: request verb with an UNKNOWN catch-all
//! - AnalysisReport: everything a finished run reports, ready for JSON
//! - RunSummary / ErrorCounts / CrawlerCounts: per-run bookkeeping

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;


/// HTTP request verbs recognised in the request line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Trace,
    Connect,
    /// Anything else, including a missing token
    Unknown,
}

impl HttpMethod {
    /// Exact, case-sensitive match against the verb token
    pub fn from_token(token: &str) -> Self {
        match token {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH" => Self::Patch,
            "TRACE" => Self::Trace,
            "CONNECT" => Self::Connect,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Trace => "TRACE",
            Self::Connect => "CONNECT",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single access-log line, parsed and classified.
///
/// Only [`crate::parser::parse_line`] builds these, so every instance came
/// from a line that matched the full grammar with a valid timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub(crate) client_address: String,
    pub(crate) timestamp: DateTime<FixedOffset>,
    pub(crate) method: HttpMethod,
    pub(crate) path: String,
    pub(crate) status_code: u16,
    pub(crate) response_size: u64,
    pub(crate) referer: String,
    pub(crate) user_agent_raw: String,
    pub(crate) os_family: String,
    pub(crate) browser_family: String,
}

impl LogRecord {
    pub fn client_address(&self) -> &str {
        &self.client_address
    }

    /// Timestamp as written in the log, offset preserved
    pub fn timestamp(&self) -> DateTime<FixedOffset> {
        self.timestamp
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn response_size(&self) -> u64 {
        self.response_size
    }

    pub fn referer(&self) -> &str {
        &self.referer
    }

    pub fn user_agent_raw(&self) -> &str {
        &self.user_agent_raw
    }

    pub fn os_family(&self) -> &str {
        &self.os_family
    }

    pub fn browser_family(&self) -> &str {
        &self.browser_family
    }
}

/// Rejected-line counts, one per failure kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCounts {
    pub malformed_line: u64,
    pub invalid_timestamp: u64,
    pub line_too_long: u64,
}

impl ErrorCounts {
    pub fn total(&self) -> u64 {
        self.malformed_line + self.invalid_timestamp + self.line_too_long
    }
}

/// Requests from well-known crawlers, detected from the user-agent text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlerCounts {
    pub googlebot: u64,
    pub yandexbot: u64,
}

/// Summary statistics for one analyzed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Total number of lines read, valid or not
    pub line_count: u64,
    /// Lines that became records
    pub parsed: u64,
    /// Lines rejected for any reason
    pub parse_errors: u64,
    /// Breakdown of `parse_errors`
    pub errors: ErrorCounts,
    /// Whether the run was stopped by a signal before end of input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interrupted: Option<bool>,
}

/// Crawler count with its share of all lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerShare {
    pub name: String,
    pub count: u64,
    pub percent: f64,
}

/// One histogram bucket; `percent` is relative to the total line count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub key: String,
    pub count: u64,
    pub percent: f64,
}

/// Byte volume metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficMetrics {
    pub total_bytes: u64,
    pub bytes_per_hour: f64,
}

/// Visit and client metrics; only human records count as visits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitMetrics {
    pub human_requests: u64,
    pub bot_requests: u64,
    pub error_requests: u64,
    pub visits_per_hour: f64,
    pub error_requests_per_hour: f64,
    pub visits_per_user: f64,
    pub peak_visits_per_second: u64,
    pub max_visits_by_user: u64,
}

/// Earliest and latest timestamps seen, absent for an empty run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRange {
    pub first: Option<DateTime<FixedOffset>>,
    pub last: Option<DateTime<FixedOffset>>,
}

/// Per-key distributions, sorted by key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distributions {
    pub os: Vec<DistributionEntry>,
    pub browser: Vec<DistributionEntry>,
    pub method: Vec<DistributionEntry>,
    pub status_code: Vec<DistributionEntry>,
    pub os_ratios: BTreeMap<String, f64>,
    pub browser_ratios: BTreeMap<String, f64>,
}

/// Distinct paths and domains, sorted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSets {
    pub existing_pages: Vec<String>,
    pub not_found_pages: Vec<String>,
    pub referer_domains: Vec<String>,
}

/// Complete output structure for one analyzed file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub file: String,
    pub summary: RunSummary,
    pub crawlers: Vec<CrawlerShare>,
    pub traffic: TrafficMetrics,
    pub visits: VisitMetrics,
    pub time_range: TimeRange,
    pub distributions: Distributions,
    pub pages: PageSets,
}
