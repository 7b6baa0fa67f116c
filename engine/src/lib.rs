//! Pacing core for slow.
//!
//! This crate contains the synchronous pacing loop without any CLI or
//! signal-registration dependencies: a permissive UTF-8 character splitter,
//! an interruption-tolerant sleep, and the orchestrating loop with its
//! shared stop/statistics handle.

mod pacer;
mod reader;
mod sleep;

pub use pacer::{Outcome, Pacer, PacerHandle};
pub use reader::{CHAR_BUF_LEN, CharReader, ReadError};
pub use sleep::sleep_interruptible;
