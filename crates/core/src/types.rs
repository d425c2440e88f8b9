//! Core domain types
//!
//! - [`CompletionTime`]: a validated, finite, non-negative number of seconds
//! - [`ScoreEntry`]: one immutable (level, player, time) record
//!
//! Both types can only be built through constructors that validate their
//! input, so any value in circulation already satisfies the invariants the
//! stores rely on.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::error::ValidationError;
use crate::limits::Limits;

/// Completion time in seconds
///
/// Always finite and `>= 0.0`. Negative zero is normalised to `0.0` so equal
/// times compare and serialize identically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CompletionTime(f64);

impl CompletionTime {
    /// Validate a raw number of seconds
    pub fn new(seconds: f64) -> Result<Self, ValidationError> {
        if !seconds.is_finite() {
            return Err(ValidationError::NonFiniteTime);
        }
        if seconds < 0.0 {
            return Err(ValidationError::NegativeTime { value: seconds });
        }
        // -0.0 + 0.0 == +0.0
        Ok(CompletionTime(seconds + 0.0))
    }

    /// Parse a decimal string such as `"12.5"` or `"9"`
    ///
    /// Surrounding whitespace is not accepted.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let seconds: f64 = raw.parse().map_err(|_| ValidationError::InvalidTime {
            raw: raw.to_string(),
        })?;
        Self::new(seconds)
    }

    /// Seconds as a plain float
    #[inline]
    pub fn as_secs(&self) -> f64 {
        self.0
    }
}

impl Eq for CompletionTime {}

impl PartialOrd for CompletionTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CompletionTime {
    fn cmp(&self, other: &Self) -> Ordering {
        // NaN is excluded by construction, so total_cmp agrees with numeric order
        self.0.total_cmp(&other.0)
    }
}

impl<'de> Deserialize<'de> for CompletionTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seconds = f64::deserialize(deserializer)?;
        CompletionTime::new(seconds).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for CompletionTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single recorded completion of a level
///
/// Immutable once created. Construct with [`ScoreEntry::new`], which applies
/// the store's [`Limits`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    level_id: String,
    player_name: String,
    time_seconds: CompletionTime,
}

impl ScoreEntry {
    /// Validate and build an entry
    pub fn new(
        level_id: &str,
        player_name: &str,
        time_seconds: f64,
        limits: &Limits,
    ) -> Result<Self, ValidationError> {
        limits.validate_level_id(level_id)?;
        limits.validate_player_name(player_name)?;
        let time_seconds = CompletionTime::new(time_seconds)?;
        Ok(ScoreEntry {
            level_id: level_id.to_string(),
            player_name: player_name.to_string(),
            time_seconds,
        })
    }

    /// Assemble an entry from parts a backend already holds
    ///
    /// Skips the length limits: backends only hold entries they accepted
    /// through [`ScoreEntry::new`]. The time is already validated by its type.
    pub fn from_parts(
        level_id: impl Into<String>,
        player_name: impl Into<String>,
        time_seconds: CompletionTime,
    ) -> Self {
        ScoreEntry {
            level_id: level_id.into(),
            player_name: player_name.into(),
            time_seconds,
        }
    }

    /// Level this entry belongs to
    pub fn level_id(&self) -> &str {
        &self.level_id
    }

    /// Name the player submitted
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Completion time
    pub fn time(&self) -> CompletionTime {
        self.time_seconds
    }

    /// Completion time in seconds
    pub fn time_seconds(&self) -> f64 {
        self.time_seconds.as_secs()
    }
}
