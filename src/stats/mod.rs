//! Streaming statistics over parsed log records
//!
//! [`Statistics`] folds records in one at a time and answers derived-metric
//! queries at any point, including before the first record. Nothing about
//! individual records is retained beyond counters, extrema, histograms and
//! distinct-key sets.
//!
//! Timestamps are compared by their local wall-clock value as written in the
//! log; offsets are not normalised.

use chrono::{DateTime, FixedOffset, NaiveDateTime, Timelike};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::constants::{BOT_MARKER, EMPTY_FIELD_PLACEHOLDER};
use crate::models::{HttpMethod, LogRecord};
use crate::parser::extract_domain;

const SECONDS_PER_MINUTE: usize = 60;

/// Running aggregate for a single log file
#[derive(Debug, Clone)]
pub struct Statistics {
    total_traffic: u64,
    bot_requests: u64,
    human_requests: u64,
    error_requests: u64,
    min_time: Option<DateTime<FixedOffset>>,
    max_time: Option<DateTime<FixedOffset>>,
    os_usage: BTreeMap<String, u64>,
    browser_usage: BTreeMap<String, u64>,
    method_count: BTreeMap<HttpMethod, u64>,
    status_count: BTreeMap<u16, u64>,
    existing_pages: BTreeSet<String>,
    not_found_pages: BTreeSet<String>,
    referer_domains: BTreeSet<String>,
    /// Keys double as the set of distinct human client addresses
    visits_per_user: HashMap<String, u64>,
    /// Indexed by the seconds field of the timestamp, across all dates
    visits_per_second: [u64; SECONDS_PER_MINUTE],
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

impl Statistics {
    pub fn new() -> Self {
        Self {
            total_traffic: 0,
            bot_requests: 0,
            human_requests: 0,
            error_requests: 0,
            min_time: None,
            max_time: None,
            os_usage: BTreeMap::new(),
            browser_usage: BTreeMap::new(),
            method_count: BTreeMap::new(),
            status_count: BTreeMap::new(),
            existing_pages: BTreeSet::new(),
            not_found_pages: BTreeSet::new(),
            referer_domains: BTreeSet::new(),
            visits_per_user: HashMap::new(),
            visits_per_second: [0; SECONDS_PER_MINUTE],
        }
    }

    /// Fold one record into the aggregate.
    ///
    /// A referer of `-` is the combined-log placeholder for "no referer" and
    /// is skipped like an empty one, so it never lands in the domain set.
    pub fn add_entry(&mut self, record: &LogRecord) {
        self.total_traffic = self.total_traffic.saturating_add(record.response_size());

        let ts = record.timestamp();
        if self.min_time.map_or(true, |min| local(&ts) < local(&min)) {
            self.min_time = Some(ts);
        }
        if self.max_time.map_or(true, |max| local(&ts) > local(&max)) {
            self.max_time = Some(ts);
        }

        let referer = record.referer();
        if !referer.is_empty() && referer != EMPTY_FIELD_PLACEHOLDER {
            if let Some(domain) = extract_domain(referer) {
                self.referer_domains.insert(domain.to_string());
            }
        }

        match record.status_code() {
            200 => {
                self.existing_pages.insert(record.path().to_string());
            }
            404 => {
                self.not_found_pages.insert(record.path().to_string());
            }
            _ => {}
        }

        if (400..=599).contains(&record.status_code()) {
            self.error_requests += 1;
        }

        if is_bot(record) {
            self.bot_requests += 1;
        } else {
            self.human_requests += 1;
            *self
                .visits_per_user
                .entry(record.client_address().to_string())
                .or_insert(0) += 1;
            self.visits_per_second[ts.second() as usize % SECONDS_PER_MINUTE] += 1;
        }

        *self.os_usage.entry(record.os_family().to_string()).or_insert(0) += 1;
        *self
            .browser_usage
            .entry(record.browser_family().to_string())
            .or_insert(0) += 1;
        *self.method_count.entry(record.method()).or_insert(0) += 1;
        *self.status_count.entry(record.status_code()).or_insert(0) += 1;
    }

    /// Combine another file's aggregate into this one.
    ///
    /// Counters and histograms are summed key-wise, sets are unioned and
    /// extrema keep the wider range, so merging is associative and
    /// commutative.
    pub fn merge(&mut self, other: Statistics) {
        self.total_traffic = self.total_traffic.saturating_add(other.total_traffic);
        self.bot_requests += other.bot_requests;
        self.human_requests += other.human_requests;
        self.error_requests += other.error_requests;

        self.min_time = match (self.min_time, other.min_time) {
            (Some(a), Some(b)) => Some(if local(&b) < local(&a) { b } else { a }),
            (a, b) => a.or(b),
        };
        self.max_time = match (self.max_time, other.max_time) {
            (Some(a), Some(b)) => Some(if local(&b) > local(&a) { b } else { a }),
            (a, b) => a.or(b),
        };

        merge_counts(&mut self.os_usage, other.os_usage);
        merge_counts(&mut self.browser_usage, other.browser_usage);
        merge_counts(&mut self.method_count, other.method_count);
        merge_counts(&mut self.status_count, other.status_count);
        for (address, visits) in other.visits_per_user {
            *self.visits_per_user.entry(address).or_insert(0) += visits;
        }
        for (slot, visits) in self.visits_per_second.iter_mut().zip(other.visits_per_second) {
            *slot += visits;
        }

        self.existing_pages.extend(other.existing_pages);
        self.not_found_pages.extend(other.not_found_pages);
        self.referer_domains.extend(other.referer_domains);
    }

    /// Number of records folded in so far
    pub fn record_count(&self) -> u64 {
        self.bot_requests + self.human_requests
    }

    pub fn is_empty(&self) -> bool {
        self.record_count() == 0
    }

    pub fn total_traffic(&self) -> u64 {
        self.total_traffic
    }

    pub fn bot_requests(&self) -> u64 {
        self.bot_requests
    }

    pub fn human_requests(&self) -> u64 {
        self.human_requests
    }

    pub fn error_requests(&self) -> u64 {
        self.error_requests
    }

    pub fn min_time(&self) -> Option<DateTime<FixedOffset>> {
        self.min_time
    }

    pub fn max_time(&self) -> Option<DateTime<FixedOffset>> {
        self.max_time
    }

    /// Whole hours between the earliest and latest timestamp, truncated
    pub fn hours_spanned(&self) -> Option<i64> {
        let (min, max) = (self.min_time?, self.max_time?);
        Some((local(&max) - local(&min)).num_hours())
    }

    /// Bytes per hour of log span
    pub fn traffic_rate_per_hour(&self) -> f64 {
        self.per_hour(self.total_traffic)
    }

    /// Human requests per hour of log span
    pub fn average_visits_per_hour(&self) -> f64 {
        self.per_hour(self.human_requests)
    }

    /// 4xx/5xx responses per hour of log span
    pub fn average_error_requests_per_hour(&self) -> f64 {
        self.per_hour(self.error_requests)
    }

    /// Human requests per distinct human client address
    pub fn average_visits_per_user(&self) -> f64 {
        let users = self.visits_per_user.len();
        if users == 0 {
            return 0.0;
        }
        self.human_requests as f64 / users as f64
    }

    /// Largest bucket of the seconds-of-minute histogram
    pub fn peak_visits_per_second(&self) -> u64 {
        self.visits_per_second.iter().copied().max().unwrap_or(0)
    }

    /// Most requests made by a single human client address
    pub fn max_visits_by_user(&self) -> u64 {
        self.visits_per_user.values().copied().max().unwrap_or(0)
    }

    pub fn distinct_users(&self) -> usize {
        self.visits_per_user.len()
    }

    pub fn os_usage(&self) -> BTreeMap<String, u64> {
        self.os_usage.clone()
    }

    pub fn browser_usage(&self) -> BTreeMap<String, u64> {
        self.browser_usage.clone()
    }

    pub fn method_count(&self) -> BTreeMap<HttpMethod, u64> {
        self.method_count.clone()
    }

    pub fn status_code_count(&self) -> BTreeMap<u16, u64> {
        self.status_count.clone()
    }

    /// Share of each OS family among all records, in `0.0..=1.0`
    pub fn os_ratios(&self) -> BTreeMap<String, f64> {
        ratios(&self.os_usage)
    }

    /// Share of each browser family among all records, in `0.0..=1.0`
    pub fn browser_ratios(&self) -> BTreeMap<String, f64> {
        ratios(&self.browser_usage)
    }

    /// Paths answered with 200
    pub fn existing_pages(&self) -> BTreeSet<String> {
        self.existing_pages.clone()
    }

    /// Paths answered with 404
    pub fn not_found_pages(&self) -> BTreeSet<String> {
        self.not_found_pages.clone()
    }

    pub fn referer_domains(&self) -> BTreeSet<String> {
        self.referer_domains.clone()
    }

    fn per_hour(&self, numerator: u64) -> f64 {
        let Some(hours) = self.hours_spanned() else {
            return 0.0;
        };
        if numerator == 0 {
            return 0.0;
        }
        if hours == 0 {
            // Less than an hour of data: report the raw count
            numerator as f64
        } else {
            numerator as f64 / hours as f64
        }
    }
}

/// Bot heuristic: either classified family mentions "bot"
fn is_bot(record: &LogRecord) -> bool {
    record.browser_family().to_lowercase().contains(BOT_MARKER)
        || record.os_family().to_lowercase().contains(BOT_MARKER)
}

fn local(ts: &DateTime<FixedOffset>) -> NaiveDateTime {
    ts.naive_local()
}

fn merge_counts<K: Ord>(into: &mut BTreeMap<K, u64>, from: BTreeMap<K, u64>) {
    for (key, count) in from {
        *into.entry(key).or_insert(0) += count;
    }
}

fn ratios<K: Ord + Clone>(counts: &BTreeMap<K, u64>) -> BTreeMap<K, f64> {
    let total: u64 = counts.values().sum();
    counts
        .iter()
        .map(|(key, &count)| {
            let ratio = if total > 0 {
                count as f64 / total as f64
            } else {
                0.0
            };
            (key.clone(), ratio)
        })
        .collect()
}
