//! The pacing loop: timed character emission with graceful interruption.

use std::io::{self, Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use slow_types::Bps;

use crate::reader::{CHAR_BUF_LEN, CharReader};
use crate::sleep::sleep_interruptible;

/// Shared run state: the stop flag plus the counters a signal watcher needs
/// for a best-effort summary.
///
/// There is one writer per field in practice. The loop observes the stop
/// flag between iterations rather than synchronizing with the signal path,
/// so a verbose interrupt may be reported twice (once by the watcher, once
/// by the loop noticing afterward). That race is accepted, not eliminated.
#[derive(Debug)]
pub struct PacerHandle {
    stop: AtomicBool,
    chars: AtomicU64,
    started: Instant,
}

impl PacerHandle {
    /// Create a handle; the start timestamp is recorded here, so create it
    /// immediately before running the loop.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            stop: AtomicBool::new(false),
            chars: AtomicU64::new(0),
            started: Instant::now(),
        })
    }

    /// Ask the loop to stop before its next read.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Characters emitted so far. Monotonic, never reset mid-run.
    #[must_use]
    pub fn chars_written(&self) -> u64 {
        self.chars.load(Ordering::Relaxed)
    }

    /// Elapsed whole seconds since the handle was created.
    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Input exhausted normally.
    Completed,
    /// Stop flag observed before the input ended.
    Interrupted,
    /// A hard read error ended the run early.
    ReadFailed,
}

/// Drives paced emission: one character per iteration, fixed delay first,
/// write-and-flush second so each character is visible before the next
/// delay begins.
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    delay: Duration,
    verbose: bool,
}

impl Pacer {
    #[must_use]
    pub fn new(rate: Bps, verbose: bool) -> Self {
        Self {
            delay: rate.char_delay(),
            verbose,
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Run the loop to completion: until input ends, a hard read error
    /// occurs, or the stop flag is observed.
    ///
    /// Read errors are reported on `diag` and end the run cleanly with
    /// [`Outcome::ReadFailed`]; only output/diagnostic write failures
    /// propagate as `Err`.
    pub fn run<R, W, D>(
        &self,
        input: R,
        mut output: W,
        mut diag: D,
        handle: &PacerHandle,
    ) -> io::Result<Outcome>
    where
        R: Read,
        W: Write,
        D: Write,
    {
        let mut reader = CharReader::new(input);
        let mut buf = [0_u8; CHAR_BUF_LEN];

        tracing::debug!(delay_ns = self.delay.as_nanos() as u64, "pacing started");

        while !handle.stop_requested() {
            match reader.next_char(&mut buf) {
                Ok(None) => {
                    self.summarize(&mut diag, "Completed", handle)?;
                    return Ok(Outcome::Completed);
                }
                Ok(Some(len)) => {
                    sleep_interruptible(self.delay);
                    output.write_all(&buf[..len])?;
                    output.flush()?;
                    handle.chars.fetch_add(1, Ordering::Relaxed);
                }
                Err(err) => {
                    tracing::debug!("read error: {err}");
                    writeln!(diag, "Error reading character: {err}")?;
                    return Ok(Outcome::ReadFailed);
                }
            }
        }

        self.summarize(&mut diag, "Processed", handle)?;
        Ok(Outcome::Interrupted)
    }

    fn summarize<D: Write>(
        &self,
        diag: &mut D,
        verb: &str,
        handle: &PacerHandle,
    ) -> io::Result<()> {
        if self.verbose {
            writeln!(
                diag,
                "\n{verb}: {} characters in {} seconds",
                handle.chars_written(),
                handle.elapsed_secs()
            )?;
        }
        Ok(())
    }
}
