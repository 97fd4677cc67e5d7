//! Output formatting module
//!
//! Handles:
//! - Building the serializable report from a finished run
//! - Human-readable output
//! - JSON output
//! - Truncation of long page/domain listings

use anyhow::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Write};

use crate::ingest::IngestOutcome;
use crate::models::{
    AnalysisReport, CrawlerShare, DistributionEntry, Distributions, PageSets, RunSummary,
    TimeRange, TrafficMetrics, VisitMetrics,
};
use crate::parser::Crawler;

/// Share of `count` in `total`, in percent; 0 when `total` is 0
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

/// Assemble the report for one analyzed file.
///
/// `top` limits the page and domain lists; 0 keeps them whole.
pub fn build_report(file: &str, outcome: &IngestOutcome, top: usize) -> AnalysisReport {
    let stats = &outcome.statistics;
    let lines = outcome.line_count;

    AnalysisReport {
        file: file.to_string(),
        summary: RunSummary {
            line_count: lines,
            parsed: stats.record_count(),
            parse_errors: outcome.errors.total(),
            errors: outcome.errors,
            interrupted: if outcome.interrupted { Some(true) } else { None },
        },
        crawlers: [
            (Crawler::Googlebot, outcome.crawlers.googlebot),
            (Crawler::YandexBot, outcome.crawlers.yandexbot),
        ]
        .into_iter()
        .map(|(crawler, count)| CrawlerShare {
            name: crawler.name().to_string(),
            count,
            percent: percentage(count, lines),
        })
        .collect(),
        traffic: TrafficMetrics {
            total_bytes: stats.total_traffic(),
            bytes_per_hour: stats.traffic_rate_per_hour(),
        },
        visits: VisitMetrics {
            human_requests: stats.human_requests(),
            bot_requests: stats.bot_requests(),
            error_requests: stats.error_requests(),
            visits_per_hour: stats.average_visits_per_hour(),
            error_requests_per_hour: stats.average_error_requests_per_hour(),
            visits_per_user: stats.average_visits_per_user(),
            peak_visits_per_second: stats.peak_visits_per_second(),
            max_visits_by_user: stats.max_visits_by_user(),
        },
        time_range: TimeRange {
            first: stats.min_time(),
            last: stats.max_time(),
        },
        distributions: Distributions {
            os: distribution(stats.os_usage(), lines),
            browser: distribution(stats.browser_usage(), lines),
            method: distribution(stats.method_count(), lines),
            status_code: distribution(stats.status_code_count(), lines),
            os_ratios: stats.os_ratios(),
            browser_ratios: stats.browser_ratios(),
        },
        pages: PageSets {
            existing_pages: limited(stats.existing_pages(), top),
            not_found_pages: limited(stats.not_found_pages(), top),
            referer_domains: limited(stats.referer_domains(), top),
        },
    }
}

fn distribution<K: Display>(counts: BTreeMap<K, u64>, total: u64) -> Vec<DistributionEntry> {
    counts
        .into_iter()
        .map(|(key, count)| DistributionEntry {
            key: key.to_string(),
            count,
            percent: percentage(count, total),
        })
        .collect()
}

fn limited(set: BTreeSet<String>, top: usize) -> Vec<String> {
    let take = if top == 0 { set.len() } else { top };
    set.into_iter().take(take).collect()
}

/// Serialize a report as pretty-printed JSON
pub fn format_json(report: &AnalysisReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Print a report in human-readable format
pub fn format_human(report: &AnalysisReport) -> Result<()> {
    print!("{}", render_human(report)?);
    Ok(())
}

/// Render a report as human-readable text
pub fn render_human(report: &AnalysisReport) -> Result<String> {
    let mut out = String::new();
    let summary = &report.summary;

    writeln!(out, "Analysis Results: {}", report.file)?;
    writeln!(out, "  Total lines: {}", summary.line_count)?;
    writeln!(out, "  Parsed records: {}", summary.parsed)?;
    writeln!(out, "  Parse errors: {}", summary.parse_errors)?;
    if summary.parse_errors > 0 {
        writeln!(
            out,
            "    malformed: {}, invalid timestamp: {}, too long: {}",
            summary.errors.malformed_line,
            summary.errors.invalid_timestamp,
            summary.errors.line_too_long
        )?;
    }
    for crawler in &report.crawlers {
        writeln!(
            out,
            "  Requests from {}: {} ({:.2}%)",
            crawler.name, crawler.count, crawler.percent
        )?;
    }

    writeln!(out, "  Total traffic: {} bytes", report.traffic.total_bytes)?;
    writeln!(
        out,
        "  Average traffic per hour: {:.2} bytes/hour",
        report.traffic.bytes_per_hour
    )?;

    let visits = &report.visits;
    writeln!(out, "  Human requests: {}", visits.human_requests)?;
    writeln!(out, "  Bot requests: {}", visits.bot_requests)?;
    writeln!(out, "  Average visits per hour: {:.2}", visits.visits_per_hour)?;
    writeln!(
        out,
        "  Average error requests per hour: {:.2}",
        visits.error_requests_per_hour
    )?;
    writeln!(out, "  Average visits per user: {:.2}", visits.visits_per_user)?;
    writeln!(out, "  Peak visits per second: {}", visits.peak_visits_per_second)?;
    writeln!(out, "  Max visits by one user: {}", visits.max_visits_by_user)?;

    if let (Some(first), Some(last)) = (report.time_range.first, report.time_range.last) {
        writeln!(out, "  Time range: {} to {}", first, last)?;
    }
    if let Some(true) = summary.interrupted {
        writeln!(out, "  Status: Interrupted by user")?;
    }

    let dist = &report.distributions;
    write_distribution(&mut out, "OS", &dist.os)?;
    write_distribution(&mut out, "browser", &dist.browser)?;
    write_distribution(&mut out, "HTTP method", &dist.method)?;
    write_distribution(&mut out, "status code", &dist.status_code)?;

    write_listing(&mut out, "Referer domains", &report.pages.referer_domains)?;
    write_listing(&mut out, "Existing pages (200)", &report.pages.existing_pages)?;
    write_listing(&mut out, "Not found pages (404)", &report.pages.not_found_pages)?;

    Ok(out)
}

fn write_distribution(out: &mut String, title: &str, entries: &[DistributionEntry]) -> Result<()> {
    writeln!(out, "\nDistribution by {}:", title)?;
    if entries.is_empty() {
        writeln!(out, "  (none)")?;
    }
    for entry in entries {
        writeln!(
            out,
            "  {:<10}: {} ({:.1}%)",
            entry.key, entry.count, entry.percent
        )?;
    }
    Ok(())
}

fn write_listing(out: &mut String, title: &str, items: &[String]) -> Result<()> {
    writeln!(out, "\n{} ({}):", title, items.len())?;
    for item in items {
        writeln!(out, "  {}", item)?;
    }
    Ok(())
}
