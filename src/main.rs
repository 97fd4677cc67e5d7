#![forbid(unsafe_code)]

use anyhow::Result;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use logtally::cli::{self, prompt, prompt::Next, CliOptions};
use logtally::config::{AnalyzerConfig, OutputFormat};
use logtally::constants::DEFAULT_LOG_FILTER;
use logtally::{ingest, output};

fn main() -> Result<()> {
    let options = cli::parse_args();
    init_logging(&options);

    let mut config = AnalyzerConfig::resolve(options.config_path.as_deref())?;
    options.apply_overrides(&mut config);
    config.validate()?;

    // First signal stops the current file at a line boundary, a second one
    // terminates the process.
    let interrupted = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register_conditional_shutdown(signal, 1, Arc::clone(&interrupted))?;
        signal_hook::flag::register(signal, Arc::clone(&interrupted))?;
    }

    let interactive = options.is_interactive();
    let ingest_options = config.ingest_options();
    let analyze = |path: &Path, _file_number: usize| -> Result<Next> {
        if interactive {
            // A signal at the prompt only cancels the next file otherwise
            interrupted.store(false, Ordering::Relaxed);
        }

        let outcome = ingest::analyze_file(path, &ingest_options, Some(&*interrupted))?;
        let report = output::build_report(&path.display().to_string(), &outcome, config.report.top);

        match config.report.format {
            OutputFormat::Json => println!("{}", output::format_json(&report)?),
            OutputFormat::Human => output::format_human(&report)?,
        }

        if outcome.interrupted && !interactive {
            log::warn!("Interrupted; remaining files are skipped");
            return Ok(Next::Stop);
        }
        Ok(Next::Continue)
    };

    let mut status = io::stderr();
    if interactive {
        prompt::run_prompt_loop(io::stdin().lock(), &mut status, analyze)?;
    } else {
        prompt::run_paths(&options.files, &mut status, analyze)?;
    }

    Ok(())
}

fn init_logging(options: &CliOptions) {
    let default_filter = if options.verbose {
        "logtally=debug"
    } else if options.quiet_mode {
        "logtally=error"
    } else {
        DEFAULT_LOG_FILTER
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
