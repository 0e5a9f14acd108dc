// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! Following the "Newtype" pattern in Rust to ensure valid state by construction.
//! All types validate their invariants at creation time.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of symbols in a report identifier.
pub const ID_LENGTH: usize = 8;

/// Symbols a report identifier is drawn from.
pub const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Default report lifetime: 3 hours.
pub const DEFAULT_TTL_SECS: u64 = 10_800;
/// Minimum report lifetime: 1 second.
const MIN_TTL_SECS: u64 = 1;
/// Maximum report lifetime: 30 days.
const MAX_TTL_SECS: u64 = 30 * 24 * 60 * 60;

/// System-assigned report identifier.
/// Exactly `ID_LENGTH` characters from `ID_ALPHABET`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    /// Parse an identifier, returning `None` if it does not have the generated shape.
    pub fn parse(id: &str) -> Option<Self> {
        if id.len() == ID_LENGTH && id.bytes().all(|b| ID_ALPHABET.contains(&b)) {
            Some(Self(id.to_string()))
        } else {
            None
        }
    }

    /// Build from symbols already drawn from the alphabet.
    pub(crate) fn from_symbols(symbols: String) -> Self {
        debug_assert_eq!(symbols.len(), ID_LENGTH);
        Self(symbols)
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReportId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<ReportId> for String {
    fn from(id: ReportId) -> Self {
        id.0
    }
}

/// Validated time-to-live for stored reports, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Ttl(u64);

impl Ttl {
    /// Create a new Ttl with bounds validation.
    pub fn from_secs(secs: u64) -> Result<Self, ConfigError> {
        if !(MIN_TTL_SECS..=MAX_TTL_SECS).contains(&secs) {
            return Err(ConfigError::InvalidFieldValue {
                field: "ttl_secs",
                value: secs.to_string(),
                reason: format!(
                    "TTL must be between {} and {} seconds",
                    MIN_TTL_SECS, MAX_TTL_SECS
                ),
            });
        }
        Ok(Self(secs))
    }

    /// Get the TTL in seconds.
    pub fn secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Self(DEFAULT_TTL_SECS)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

impl TryFrom<u64> for Ttl {
    type Error = ConfigError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::from_secs(value)
    }
}

impl From<Ttl> for u64 {
    fn from(ttl: Ttl) -> Self {
        ttl.0
    }
}

/// Validated network port.
/// Must be in range 1-65535 (0 is reserved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Create a new Port with validation.
    pub fn new(port: u16) -> Result<Self, ConfigError> {
        if port == 0 {
            return Err(ConfigError::InvalidFieldValue {
                field: "port",
                value: "0".to_string(),
                reason: "Port 0 is reserved and cannot be used".to_string(),
            });
        }
        Ok(Self(port))
    }

    /// Get the inner port value.
    pub fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = ConfigError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}
