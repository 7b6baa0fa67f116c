//! Core domain types for slow.
//!
//! This crate contains pure domain types with no IO and no async: the
//! validated transmission rate, the historical modem preset table, and the
//! per-character delay derivation.

mod rate;

pub use rate::{Bps, MODEM_PRESETS, ModemPreset, RateError, preset_names};
