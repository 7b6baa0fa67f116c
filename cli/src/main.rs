//! slow - paced text emission at historical modem/terminal speeds.
//!
//! Reads characters from a file or stdin and writes each to stdout after a
//! fixed delay derived from the configured bits-per-second rate. SIGINT and
//! SIGTERM request a graceful stop that the pacing loop observes between
//! characters.
//!
//! Primary output goes to stdout only; verbose progress, summaries, and
//! errors go to stderr so paced text can be piped onward untouched.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use slow_engine::{Outcome, Pacer, PacerHandle};
use slow_types::{Bps, MODEM_PRESETS};

#[derive(Debug, Parser)]
#[command(
    name = "slow",
    about = "Simulates old terminal/modem speeds",
    after_help = presets_help(),
)]
struct Args {
    /// Speed in bits per second, or a preset name
    #[arg(short, long, default_value = "300", value_name = "SPEED")]
    bps: String,

    /// Read from a file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Show timing and statistics
    #[arg(short, long)]
    verbose: bool,
}

fn presets_help() -> String {
    let mut help = String::from("BPS presets (historical modems):\n");
    for preset in MODEM_PRESETS {
        let _ = writeln!(help, "  {:<8} {}", preset.name, preset.description);
    }
    help.push_str(
        "\nExamples:\n  \
         ls -al | slow\n  \
         slow -f text.txt -b 1200\n  \
         cat file.txt | slow -b dialup\n  \
         slow -f story.txt -b acoustic -v\n",
    );
    help
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();
}

/// Watch for SIGINT (and SIGTERM on unix), then set the stop flag and print
/// a best-effort summary. The pacing loop prints its own summary when it
/// observes the flag, so a verbose interrupt may report twice.
fn spawn_stop_watcher(handle: Arc<PacerHandle>, verbose: bool) {
    tokio::spawn(async move {
        wait_for_stop_signal().await;
        tracing::debug!("stop signal received");
        handle.request_stop();
        if verbose {
            eprintln!(
                "{}",
                interrupt_summary(handle.chars_written(), handle.elapsed_secs())
            );
        }
    });
}

/// Same line the pacing loop prints when it observes the stop flag, so the
/// accepted double report at least emits identical text.
fn interrupt_summary(chars: u64, secs: u64) -> String {
    format!("\nProcessed: {chars} characters in {secs} seconds")
}

#[cfg(unix)]
async fn wait_for_stop_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        Err(err) => {
            tracing::warn!("SIGTERM handler unavailable: {err}");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_stop_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn open_input(file: Option<&PathBuf>) -> Result<Box<dyn Read + Send>> {
    match file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening file '{}'", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let rate = Bps::resolve(&args.bps)?;

    if args.verbose {
        eprintln!("Simulating {rate} bps ({} bytes/sec)", rate.bytes_per_sec());
    }

    let input = open_input(args.file.as_ref())?;

    // Start timestamp is recorded by the handle; create it right before
    // the loop so interrupted runs report accurate elapsed time.
    let handle = PacerHandle::new();
    spawn_stop_watcher(Arc::clone(&handle), args.verbose);

    let pacer = Pacer::new(rate, args.verbose);
    let loop_handle = Arc::clone(&handle);
    let result = tokio::task::spawn_blocking(move || {
        pacer.run(input, io::stdout(), io::stderr(), &loop_handle)
    })
    .await
    .context("pacing task failed")?;

    let outcome = match result {
        Ok(outcome) => outcome,
        // Downstream closed the pipe; stop quietly like any well-behaved filter.
        Err(err) if err.kind() == io::ErrorKind::BrokenPipe => return Ok(ExitCode::SUCCESS),
        Err(err) => return Err(anyhow::Error::new(err).context("writing output")),
    };

    Ok(match outcome {
        Outcome::Completed | Outcome::Interrupted => ExitCode::SUCCESS,
        Outcome::ReadFailed => ExitCode::FAILURE,
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run(Args::parse()).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Args, interrupt_summary, presets_help};
    use clap::{CommandFactory, Parser};
    use std::path::Path;

    #[test]
    fn command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["slow"]).unwrap();
        assert_eq!(args.bps, "300");
        assert!(args.file.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn parses_short_and_long_flags() {
        let args =
            Args::try_parse_from(["slow", "-b", "dialup", "--file", "story.txt", "-v"]).unwrap();
        assert_eq!(args.bps, "dialup");
        assert_eq!(args.file.as_deref(), Some(Path::new("story.txt")));
        assert!(args.verbose);
    }

    #[test]
    fn watcher_summary_matches_loop_wording() {
        assert_eq!(
            interrupt_summary(3, 1),
            "\nProcessed: 3 characters in 1 seconds"
        );
    }

    #[test]
    fn help_lists_presets_and_examples() {
        let help = presets_help();
        assert!(help.contains("Teletype"));
        assert!(help.contains("V.90 (56k dialup)"));
        assert!(help.contains("Alias for 56000"));
        assert!(help.contains("cat file.txt | slow -b dialup"));
    }
}
