//! logtally - combined access-log statistics library
//!
//! This library exposes the log-line parser, the streaming statistics
//! aggregator, the ingestion driver and the report builders used by the
//! `logtally` binary.

pub mod cli;
pub mod config;
pub mod constants;
pub mod ingest;
pub mod models;
pub mod output;
pub mod parser;
pub mod stats;

pub use ingest::{analyze_file, analyze_reader, IngestOptions, IngestOutcome, LineError};
pub use models::{HttpMethod, LogRecord};
pub use parser::{parse_line, ParseError};
pub use stats::Statistics;
