//! Combined-log line parsing
//!
//! Turns one raw access-log line into a [`LogRecord`] or a typed
//! [`ParseError`]. The grammar is
//!
//! ```text
//! <ip> <ident> <user> [<dd/Mon/yyyy:HH:MM:SS ±zzzz>] "<method> <path> [<version>]" <status> <size> "<referer>" "<user-agent>"
//! ```
//!
//! - `user_agent.rs`: OS/browser classification and crawler detection
//! - `domain.rs`: host extraction from referer URLs
//!
//! The parser imposes no length limit; the ingest driver rejects
//! oversized lines before they get here.

pub mod domain;
pub mod user_agent;

use chrono::{DateTime, FixedOffset};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::constants::TIMESTAMP_FORMAT;
use crate::models::{HttpMethod, LogRecord};

pub use domain::extract_domain;
pub use user_agent::{classify, Crawler, UserAgentFamilies};

/// Reason attached to a grammar mismatch
pub const REASON_FORMAT: &str = "does not match expected format";
/// Reason attached to an unparsable status or size group
pub const REASON_NUMERIC: &str = "invalid numeric field";

static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(\S+) (\S+) (\S+) \[([\w:/]+\s[+\-]\d{4})\] "(.+?)" (\d{3}) (\d+) "([^"]*)" "([^"]*)""#,
    )
    .expect("line pattern is a valid regex")
});

/// Fixed-width `dd/Mon/yyyy:HH:MM:SS ±zzzz` with English month abbreviations.
/// chrono alone accepts single-digit fields and any month case.
static TIMESTAMP_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\d{2}/(?:Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)/\d{4}:\d{2}:\d{2}:\d{2} [+\-]\d{4}$",
    )
    .expect("timestamp shape is a valid regex")
});

/// Why a line could not become a record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{reason}: {line}")]
    MalformedLine { line: String, reason: &'static str },

    #[error("invalid date format: {value}")]
    InvalidTimestamp { line: String, value: String },
}

impl ParseError {
    /// The offending input line
    pub fn line(&self) -> &str {
        match self {
            Self::MalformedLine { line, .. } | Self::InvalidTimestamp { line, .. } => line,
        }
    }

    fn malformed(line: &str, reason: &'static str) -> Self {
        Self::MalformedLine {
            line: line.to_string(),
            reason,
        }
    }
}

/// Parse a combined-log line.
///
/// Construction is all-or-nothing: every field is extracted and validated
/// before the record is assembled.
pub fn parse_line(line: &str) -> Result<LogRecord, ParseError> {
    let caps = LINE_PATTERN
        .captures(line)
        .ok_or_else(|| ParseError::malformed(line, REASON_FORMAT))?;

    let mut request = caps[5].split(' ');
    let method = HttpMethod::from_token(request.next().unwrap_or(""));
    let path = request.next().unwrap_or("").to_string();

    let status_code: u16 = caps[6]
        .parse()
        .map_err(|_| ParseError::malformed(line, REASON_NUMERIC))?;
    let response_size: u64 = caps[7]
        .parse()
        .map_err(|_| ParseError::malformed(line, REASON_NUMERIC))?;

    let timestamp = parse_timestamp(&caps[4]).ok_or_else(|| ParseError::InvalidTimestamp {
        line: line.to_string(),
        value: caps[4].to_string(),
    })?;

    let user_agent_raw = caps[9].to_string();
    let families = classify(&user_agent_raw);

    Ok(LogRecord {
        client_address: caps[1].to_string(),
        timestamp,
        method,
        path,
        status_code,
        response_size,
        referer: caps[8].to_string(),
        user_agent_raw,
        os_family: families.os.to_string(),
        browser_family: families.browser.to_string(),
    })
}

/// Parse the bracketed timestamp, e.g. `10/Oct/2000:13:55:36 -0700`
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    if !TIMESTAMP_SHAPE.is_match(value) {
        return None;
    }
    DateTime::parse_from_str(value, TIMESTAMP_FORMAT).ok()
}

impl std::str::FromStr for LogRecord {
    type Err = ParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        parse_line(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    const CHROME_LINE: &str = r#"192.168.1.10 - - [10/Oct/2023:13:55:36 +0300] "GET /index.html HTTP/1.1" 200 2326 "https://example.com:8080/start" "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 Chrome/91.0""#;

    #[test]
    fn test_parse_combined_line() {
        let record = parse_line(CHROME_LINE).unwrap();
        assert_eq!(record.client_address(), "192.168.1.10");
        assert_eq!(record.method(), HttpMethod::Get);
        assert_eq!(record.path(), "/index.html");
        assert_eq!(record.status_code(), 200);
        assert_eq!(record.response_size(), 2326);
        assert_eq!(record.referer(), "https://example.com:8080/start");
        assert_eq!(record.os_family(), "Windows");
        assert_eq!(record.browser_family(), "Chrome");

        let ts = record.timestamp();
        assert_eq!((ts.day(), ts.month(), ts.year()), (10, 10, 2023));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (13, 55, 36));
        assert_eq!(ts.offset().local_minus_utc(), 3 * 3600);
    }

    #[test]
    fn test_not_a_log_line() {
        let err = parse_line("not a log line").unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedLine {
                line: "not a log line".to_string(),
                reason: REASON_FORMAT,
            }
        );
        assert_eq!(err.line(), "not a log line");
        assert!(err.to_string().starts_with("does not match expected format"));
    }

    #[test]
    fn test_invalid_timestamp() {
        let line = r#"10.0.0.1 - - [32/Foo/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 10 "" """#;
        match parse_line(line).unwrap_err() {
            ParseError::InvalidTimestamp { value, .. } => {
                assert_eq!(value, "32/Foo/2023:13:55:36 +0000")
            }
            other => panic!("expected InvalidTimestamp, got {:?}", other),
        }

        for value in [
            "10/oct/2023:13:55:36 +0000",
            "10/OCT/2023:13:55:36 +0000",
            "1/Oct/2023:13:55:36 +0000",
            "10/Oct/2023:3:5:6 +0000",
            "10/Oct/23:13:55:36 +0000",
        ] {
            let line = format!(r#"10.0.0.1 - - [{}] "GET / HTTP/1.1" 200 10 "" """#, value);
            assert!(
                matches!(parse_line(&line), Err(ParseError::InvalidTimestamp { .. })),
                "accepted {}",
                value
            );
        }
    }

    #[test]
    fn test_parse_timestamp_requires_fixed_width() {
        assert!(parse_timestamp("01/Jan/2024:00:00:00 -0700").is_some());
        assert!(parse_timestamp("31/Dec/1999:23:59:59 +1400").is_some());
        assert!(parse_timestamp("1/Jan/2024:00:00:00 -0700").is_none());
        assert!(parse_timestamp("01/jan/2024:00:00:00 -0700").is_none());
        assert!(parse_timestamp("01/Jan/2024:00:00:00 -0700 ").is_none());
        assert!(parse_timestamp("31/Feb/2024:00:00:00 +0000").is_none());
    }

    #[test]
    fn test_oversized_size_is_numeric_error() {
        let line = r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "GET / HTTP/1.1" 200 99999999999999999999999 "" """#;
        match parse_line(line).unwrap_err() {
            ParseError::MalformedLine { reason, .. } => assert_eq!(reason, REASON_NUMERIC),
            other => panic!("expected MalformedLine, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_referer_and_user_agent() {
        let line = r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "POST /api HTTP/1.1" 201 0 "" """#;
        let record = parse_line(line).unwrap();
        assert_eq!(record.referer(), "");
        assert_eq!(record.user_agent_raw(), "");
        assert_eq!(record.os_family(), "Unknown");
        assert_eq!(record.browser_family(), "Unknown");
        assert_eq!(record.response_size(), 0);
    }

    #[test]
    fn test_unknown_method_and_missing_path() {
        let line = r#"10.0.0.1 - - [10/Oct/2023:13:55:36 +0000] "get" 400 0 "-" "curl/8.0""#;
        let record = parse_line(line).unwrap();
        assert_eq!(record.method(), HttpMethod::Unknown);
        assert_eq!(record.path(), "");
    }

    #[test]
    fn test_non_numeric_address_token_is_accepted() {
        let line = r#"host.example - frank [10/Oct/2023:13:55:36 -0700] "DELETE /item/1 HTTP/1.1" 204 0 "-" "-""#;
        let record = parse_line(line).unwrap();
        assert_eq!(record.client_address(), "host.example");
        assert_eq!(record.method(), HttpMethod::Delete);
    }

    #[test]
    fn test_common_log_format_without_quoted_tail_is_rejected() {
        let line = r#"127.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326"#;
        assert!(matches!(
            parse_line(line),
            Err(ParseError::MalformedLine { .. })
        ));
    }

    #[test]
    fn test_from_str() {
        let record: LogRecord = CHROME_LINE.parse().unwrap();
        assert_eq!(record.path(), "/index.html");
    }
}
