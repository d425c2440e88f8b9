//! Size limits for level ids, player names and query limits
//!
//! Every store checks its inputs against a [`Limits`] value before touching
//! storage. Violations return [`ValidationError`] and leave the store unchanged.

use crate::error::ValidationError;

/// Default maximum level id length in bytes
pub const DEFAULT_MAX_LEVEL_ID_BYTES: usize = 128;

/// Default maximum player name length in bytes
pub const DEFAULT_MAX_PLAYER_NAME_BYTES: usize = 64;

/// Default upper bound on a single top-N request
pub const DEFAULT_MAX_TOP_LIMIT: usize = 100;

/// Number of entries a leaderboard query returns when no limit is given
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Input limits enforced by stores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum level id length in bytes (default: 128)
    pub max_level_id_bytes: usize,

    /// Maximum player name length in bytes (default: 64)
    pub max_player_name_bytes: usize,

    /// Maximum `limit` accepted by `top` (default: 100)
    pub max_top_limit: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_level_id_bytes: DEFAULT_MAX_LEVEL_ID_BYTES,
            max_player_name_bytes: DEFAULT_MAX_PLAYER_NAME_BYTES,
            max_top_limit: DEFAULT_MAX_TOP_LIMIT,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_level_id_bytes: 8,
            max_player_name_bytes: 8,
            max_top_limit: 5,
        }
    }

    /// Validate a level id
    ///
    /// Whitespace-only ids count as empty.
    pub fn validate_level_id(&self, level_id: &str) -> Result<(), ValidationError> {
        if level_id.trim().is_empty() {
            return Err(ValidationError::EmptyLevelId);
        }
        if level_id.len() > self.max_level_id_bytes {
            return Err(ValidationError::LevelIdTooLong {
                length: level_id.len(),
                max: self.max_level_id_bytes,
            });
        }
        Ok(())
    }

    /// Validate a player name
    pub fn validate_player_name(&self, name: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyPlayerName);
        }
        if name.len() > self.max_player_name_bytes {
            return Err(ValidationError::PlayerNameTooLong {
                length: name.len(),
                max: self.max_player_name_bytes,
            });
        }
        Ok(())
    }

    /// Validate a top-N limit
    pub fn validate_top_limit(&self, limit: usize) -> Result<(), ValidationError> {
        if limit == 0 || limit > self.max_top_limit {
            return Err(ValidationError::InvalidLimit {
                requested: limit,
                max: self.max_top_limit,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert_eq!(limits.max_level_id_bytes, 128);
        assert_eq!(limits.max_player_name_bytes, 64);
        assert_eq!(limits.max_top_limit, 100);
    }

    #[test]
    fn test_level_id_validation() {
        let limits = Limits::with_small_limits();
        assert!(limits.validate_level_id("lvl1").is_ok());
        assert!(limits.validate_level_id("12345678").is_ok());
        assert_eq!(
            limits.validate_level_id(""),
            Err(ValidationError::EmptyLevelId)
        );
        assert_eq!(
            limits.validate_level_id("   "),
            Err(ValidationError::EmptyLevelId)
        );
        assert_eq!(
            limits.validate_level_id("123456789"),
            Err(ValidationError::LevelIdTooLong { length: 9, max: 8 })
        );
    }

    #[test]
    fn test_player_name_validation() {
        let limits = Limits::with_small_limits();
        assert!(limits.validate_player_name("alice").is_ok());
        assert_eq!(
            limits.validate_player_name("\t"),
            Err(ValidationError::EmptyPlayerName)
        );
        // Multi-byte characters count by bytes, not chars
        assert!(matches!(
            limits.validate_player_name("ééééé"),
            Err(ValidationError::PlayerNameTooLong { length: 10, .. })
        ));
    }

    #[test]
    fn test_top_limit_validation() {
        let limits = Limits::with_small_limits();
        assert!(limits.validate_top_limit(1).is_ok());
        assert!(limits.validate_top_limit(5).is_ok());
        assert!(limits.validate_top_limit(0).is_err());
        assert_eq!(
            limits.validate_top_limit(6),
            Err(ValidationError::InvalidLimit {
                requested: 6,
                max: 5
            })
        );
    }
}
