//! Line-by-line ingestion of one access log
//!
//! Reads raw lines, enforces the line-length cap, parses, and folds each
//! valid record into a fresh [`Statistics`]. Bad lines are counted and
//! logged, never fatal. An interrupt flag is checked between lines so a
//! signal stops the run at a record boundary.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::models::{CrawlerCounts, ErrorCounts, LogRecord};
use crate::parser::{parse_line, Crawler, ParseError};
use crate::stats::Statistics;

/// Settings the driver needs per run
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Maximum accepted line length in characters
    pub max_line_length: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_line_length: crate::constants::DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// Kind of per-line failure, used for tallies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedLine,
    InvalidTimestamp,
    LineTooLong,
}

/// A rejected line, with its 1-based position in the input
#[derive(Debug, Error)]
pub enum LineError {
    #[error("line {line_number} exceeds the maximum length of {limit} characters ({length})")]
    TooLong {
        line_number: u64,
        length: usize,
        limit: usize,
    },

    #[error("line {line_number}: {source}")]
    Parse {
        line_number: u64,
        #[source]
        source: ParseError,
    },
}

impl LineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::TooLong { .. } => ErrorKind::LineTooLong,
            Self::Parse {
                source: ParseError::MalformedLine { .. },
                ..
            } => ErrorKind::MalformedLine,
            Self::Parse {
                source: ParseError::InvalidTimestamp { .. },
                ..
            } => ErrorKind::InvalidTimestamp,
        }
    }

    pub fn line_number(&self) -> u64 {
        match self {
            Self::TooLong { line_number, .. } | Self::Parse { line_number, .. } => *line_number,
        }
    }
}

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub statistics: Statistics,
    /// Every line read, valid or not
    pub line_count: u64,
    pub errors: ErrorCounts,
    pub crawlers: CrawlerCounts,
    pub interrupted: bool,
}

impl IngestOutcome {
    fn new() -> Self {
        Self {
            statistics: Statistics::new(),
            line_count: 0,
            errors: ErrorCounts::default(),
            crawlers: CrawlerCounts::default(),
            interrupted: false,
        }
    }

    fn record_error(&mut self, err: &LineError) {
        match err.kind() {
            ErrorKind::MalformedLine => self.errors.malformed_line += 1,
            ErrorKind::InvalidTimestamp => self.errors.invalid_timestamp += 1,
            ErrorKind::LineTooLong => self.errors.line_too_long += 1,
        }
    }

    fn record_crawler(&mut self, user_agent: &str) {
        match Crawler::detect(user_agent) {
            Some(Crawler::Googlebot) => self.crawlers.googlebot += 1,
            Some(Crawler::YandexBot) => self.crawlers.yandexbot += 1,
            None => {}
        }
    }
}

/// Check the length cap, then parse. Never touches any aggregate.
pub fn check_line(
    line: &str,
    line_number: u64,
    options: &IngestOptions,
) -> Result<LogRecord, LineError> {
    let length = line.chars().count();
    if length > options.max_line_length {
        return Err(LineError::TooLong {
            line_number,
            length,
            limit: options.max_line_length,
        });
    }

    parse_line(line).map_err(|source| LineError::Parse {
        line_number,
        source,
    })
}

/// Analyze every line of `reader`.
///
/// Only I/O failures on the reader itself are returned as errors; per-line
/// problems are counted in the outcome.
pub fn analyze_reader<R: BufRead>(
    mut reader: R,
    options: &IngestOptions,
    interrupted: Option<&AtomicBool>,
) -> Result<IngestOutcome> {
    let mut outcome = IngestOutcome::new();
    let mut buf = Vec::new();
    let byte_limit = line_byte_limit(options);

    loop {
        if interrupted.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            warn!(
                "Interrupted after {} lines; report covers the lines read so far",
                outcome.line_count
            );
            outcome.interrupted = true;
            break;
        }

        buf.clear();
        let line_number = outcome.line_count + 1;
        let read = reader
            .by_ref()
            .take(byte_limit)
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("Failed to read line {}", line_number))?;
        if read == 0 {
            break;
        }
        outcome.line_count = line_number;

        if read as u64 == byte_limit && buf.last() != Some(&b'\n') {
            // Longer than any line that could fit the cap; drop the rest unbuffered
            let rest = skip_to_line_end(&mut reader)
                .with_context(|| format!("Failed to read line {}", line_number))?;
            let err = LineError::TooLong {
                line_number,
                length: String::from_utf8_lossy(&buf).chars().count() + rest,
                limit: options.max_line_length,
            };
            warn!("{}", err);
            outcome.record_error(&err);
            continue;
        }

        let line = String::from_utf8_lossy(trim_line_ending(&buf));

        match check_line(&line, line_number, options) {
            Ok(record) => {
                outcome.record_crawler(record.user_agent_raw());
                outcome.statistics.add_entry(&record);
            }
            Err(err) => {
                warn!("{}", err);
                outcome.record_error(&err);
            }
        }
    }

    debug!(
        "Read {} lines, {} records, {} rejected",
        outcome.line_count,
        outcome.statistics.record_count(),
        outcome.errors.total()
    );
    Ok(outcome)
}

/// Open `path` and analyze it with [`analyze_reader`]
pub fn analyze_file(
    path: &Path,
    options: &IngestOptions,
    interrupted: Option<&AtomicBool>,
) -> Result<IngestOutcome> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    info!("Analyzing {}", path.display());
    let outcome = analyze_reader(BufReader::new(file), options, interrupted)
        .with_context(|| format!("Failed to read log file {}", path.display()))?;
    info!(
        "Finished {}: {} lines, {} parse errors",
        path.display(),
        outcome.line_count,
        outcome.errors.total()
    );

    Ok(outcome)
}

/// Most bytes a line within the cap can occupy: four per UTF-8 character
/// plus a `\r\n` terminator. Anything that fills this without a newline is
/// too long whatever its encoding.
fn line_byte_limit(options: &IngestOptions) -> u64 {
    (options.max_line_length as u64).saturating_mul(4).saturating_add(2)
}

/// Consume input up to and including the next `\n` without buffering it.
/// Returns the number of characters skipped, newline excluded.
fn skip_to_line_end<R: BufRead>(reader: &mut R) -> std::io::Result<usize> {
    let mut chars = 0;
    loop {
        let available = match reader.fill_buf() {
            Ok(available) => available,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if available.is_empty() {
            return Ok(chars);
        }

        let newline = available.iter().position(|&b| b == b'\n');
        let chunk = &available[..newline.unwrap_or(available.len())];
        // Count UTF-8 lead bytes, i.e. everything but continuation bytes
        chars += chunk.iter().filter(|&&b| b & 0xC0 != 0x80).count();
        let consumed = newline.map_or(available.len(), |pos| pos + 1);

        reader.consume(consumed);
        if newline.is_some() {
            return Ok(chars);
        }
    }
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
