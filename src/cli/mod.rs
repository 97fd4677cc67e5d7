//! CLI argument parsing module
//!
//! Handles command-line interface using clap, including:
//! - Log files to analyze (positional; none means interactive prompt)
//! - Configuration file selection
//! - Output format and listing limits
//! - Line length cap override
//! - Verbosity and quiet modes

pub mod prompt;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

use crate::config::{AnalyzerConfig, OutputFormat};

/// Parsed command-line options, before merging with the config file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    /// Log files given on the command line
    pub files: Vec<PathBuf>,
    /// Explicit configuration file
    pub config_path: Option<PathBuf>,
    pub json_output: bool,
    pub max_line_length: Option<usize>,
    pub top: Option<usize>,
    /// Suppress per-line warnings
    pub quiet_mode: bool,
    pub verbose: bool,
}

impl CliOptions {
    /// Apply command-line overrides on top of file configuration
    pub fn apply_overrides(&self, config: &mut AnalyzerConfig) {
        if self.json_output {
            config.report.format = OutputFormat::Json;
        }
        if let Some(max) = self.max_line_length {
            config.ingest.max_line_length = max;
        }
        if let Some(top) = self.top {
            config.report.top = top;
        }
    }

    pub fn is_interactive(&self) -> bool {
        self.files.is_empty()
    }
}

/// Build the clap command definition
pub fn build_command() -> Command {
    Command::new("logtally")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Summarize Apache/Nginx combined access logs")
        .long_about(
            "Parses Apache/Nginx combined-format access logs in a single pass and reports \
             traffic volume, error rates, visit statistics, OS/browser/method/status \
             distributions and referer domains. With no FILE arguments, prompts for paths \
             until 'exit' is entered.",
        )
        .arg(
            Arg::new("file")
                .value_name("FILE")
                .help("Log file to analyze (repeatable; each file is reported separately)")
                .value_parser(value_parser!(PathBuf))
                .num_args(1..)
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .help("Configuration file (TOML)")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("json")
                .short('j')
                .long("json")
                .help("Output in JSON format")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-line-length")
                .long("max-line-length")
                .value_name("CHARS")
                .help("Reject lines longer than this many characters")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("top")
                .short('t')
                .long("top")
                .value_name("N")
                .help("List at most N pages and referer domains (0 lists all)")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Suppress warnings about unparsable lines")
                .action(ArgAction::SetTrue)
                .conflicts_with("verbose"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
}

/// Parse command line arguments
pub fn parse_args() -> CliOptions {
    from_matches(&build_command().get_matches())
}

/// Parse an explicit argument list; the first item is the program name
pub fn try_parse_from<I, T>(args: I) -> Result<CliOptions, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Ok(from_matches(&build_command().try_get_matches_from(args)?))
}

fn from_matches(matches: &ArgMatches) -> CliOptions {
    CliOptions {
        files: matches
            .get_many::<PathBuf>("file")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
        config_path: matches.get_one::<PathBuf>("config").cloned(),
        json_output: matches.get_flag("json"),
        max_line_length: matches.get_one::<usize>("max-line-length").copied(),
        top: matches.get_one::<usize>("top").copied(),
        quiet_mode: matches.get_flag("quiet"),
        verbose: matches.get_flag("verbose"),
    }
}
