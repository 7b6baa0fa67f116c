//! Transmission rate resolution and delay derivation.
//!
//! A rate specification is either a preset name from the historical modem
//! table or a decimal numeral. Resolution checks presets first; numerals that
//! collide with a preset name resolve to the same value either way.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// One entry in the historical modem speed table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModemPreset {
    pub name: &'static str,
    pub bps: u32,
    pub description: &'static str,
}

/// Historical modem speeds, in the order they appear in `--help`.
pub const MODEM_PRESETS: &[ModemPreset] = &[
    ModemPreset {
        name: "110",
        bps: 110,
        description: "Teletype",
    },
    ModemPreset {
        name: "300",
        bps: 300,
        description: "Acoustic coupler",
    },
    ModemPreset {
        name: "1200",
        bps: 1200,
        description: "Bell 212A",
    },
    ModemPreset {
        name: "2400",
        bps: 2400,
        description: "V.22bis",
    },
    ModemPreset {
        name: "4800",
        bps: 4800,
        description: "V.27",
    },
    ModemPreset {
        name: "9600",
        bps: 9600,
        description: "V.32",
    },
    ModemPreset {
        name: "14400",
        bps: 14400,
        description: "V.32bis",
    },
    ModemPreset {
        name: "19200",
        bps: 19200,
        description: "V.32fast",
    },
    ModemPreset {
        name: "28800",
        bps: 28800,
        description: "V.34",
    },
    ModemPreset {
        name: "33600",
        bps: 33600,
        description: "V.34+",
    },
    ModemPreset {
        name: "56000",
        bps: 56000,
        description: "V.90 (56k dialup)",
    },
    ModemPreset {
        name: "acoustic",
        bps: 300,
        description: "Alias for 300",
    },
    ModemPreset {
        name: "dialup",
        bps: 56000,
        description: "Alias for 56000",
    },
];

/// Comma-separated preset names, for operator guidance in error messages.
#[must_use]
pub fn preset_names() -> String {
    let names: Vec<&str> = MODEM_PRESETS.iter().map(|p| p.name).collect();
    names.join(", ")
}

/// Every variant carries the preset list: operator guidance accompanies all
/// rate violations, not just unparseable input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RateError {
    #[error("invalid BPS value '{input}'. Use a number or one of the presets: {}", preset_names())]
    Unparseable { input: String },
    #[error("BPS must be positive, got {value}. Use a number or one of the presets: {}", preset_names())]
    NotPositive { value: i64 },
    #[error("BPS too high (max {}), got {value}. Use a number or one of the presets: {}", Bps::MAX, preset_names())]
    TooHigh { value: i64 },
}

/// A validated transmission rate in bits per second.
///
/// Guaranteed positive and at most [`Bps::MAX`] by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bps(u32);

impl Bps {
    pub const MAX: u32 = 1_000_000;

    pub fn new(value: i64) -> Result<Self, RateError> {
        if value <= 0 {
            return Err(RateError::NotPositive { value });
        }
        if value > i64::from(Self::MAX) {
            return Err(RateError::TooHigh { value });
        }
        Ok(Self(value as u32))
    }

    /// Resolve a textual rate specification: preset name first
    /// (case-insensitive), then exact base-10 numeral.
    pub fn resolve(spec: &str) -> Result<Self, RateError> {
        if let Some(preset) = MODEM_PRESETS
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(spec))
        {
            return Ok(Self(preset.bps));
        }

        let value: i64 = spec
            .parse()
            .map_err(|_| RateError::Unparseable {
                input: spec.to_string(),
            })?;
        Self::new(value)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Throughput in bytes per second, for the verbose preamble.
    #[must_use]
    pub const fn bytes_per_sec(self) -> u32 {
        self.0 / 8
    }

    /// Fixed delay before each emitted character: `8e9 / rate` nanoseconds,
    /// truncating. Every character is charged 8 bits regardless of its
    /// encoded byte length.
    #[must_use]
    pub fn char_delay(self) -> Duration {
        Duration::from_nanos(8_000_000_000 / u64::from(self.0))
    }
}

impl Default for Bps {
    fn default() -> Self {
        Self(300)
    }
}

impl fmt::Display for Bps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
