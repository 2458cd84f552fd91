//! Log levels and threshold evaluation
//!
//! Levels form a fixed, totally ordered sequence. A level is enabled when it
//! is at or above the current threshold. The threshold lives in a shared cell
//! owned by [`LevelRegistry`] and is read every time a decision is made, so a
//! change made through any clone is seen by every producer and presenter.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Environment variable consulted by [`LevelRegistry::from_env`]
pub const LEVEL_ENV_VAR: &str = "BUILDLOG_LEVEL";

/// Threshold used when none is configured
pub const DEFAULT_LEVEL: Level = Level::Info;

/// Severity of a log message, ordered from most to least verbose
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Silly,
    Verbose,
    Perf,
    Info,
    Warn,
    Error,
    /// Only valid as a threshold; messages can never be submitted with it
    Silent,
}

impl Level {
    /// Every level in ascending order
    pub const ALL: [Level; 7] = [
        Level::Silly,
        Level::Verbose,
        Level::Perf,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Silent,
    ];

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Silly => "silly",
            Self::Verbose => "verbose",
            Self::Perf => "perf",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Silent => "silent",
        }
    }

    /// Whether a message at this level passes the given threshold
    pub fn is_enabled(self, threshold: Level) -> bool {
        self >= threshold
    }

    /// Whether messages can be submitted at this level
    pub fn accepts_messages(self) -> bool {
        self != Level::Silent
    }

    /// Comma separated list of all level names
    pub fn names() -> String {
        Self::ALL.iter().map(Level::as_str).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| Error::UnknownLevel(s.to_string()))
    }
}

/// Shared, mutable threshold
///
/// Cloning a registry shares the underlying cell. The raw value is kept as a
/// string so that an invalid value coming from the environment surfaces as
/// [`Error::UnknownLevel`] when it is evaluated, not when it is read.
#[derive(Debug, Clone, Default)]
pub struct LevelRegistry {
    threshold: Arc<RwLock<Option<String>>>,
}

impl LevelRegistry {
    /// Registry with no threshold set (evaluates to [`DEFAULT_LEVEL`])
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with a raw threshold string, validated on evaluation
    pub fn with_threshold(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        debug!(%raw, "LevelRegistry::with_threshold: called");
        Self {
            threshold: Arc::new(RwLock::new(Some(raw))),
        }
    }

    /// Registry seeded from [`LEVEL_ENV_VAR`], unset or empty meaning default
    pub fn from_env() -> Self {
        match std::env::var(LEVEL_ENV_VAR) {
            Ok(raw) if !raw.is_empty() => {
                debug!(%raw, "LevelRegistry::from_env: threshold from environment");
                Self::with_threshold(raw)
            }
            _ => {
                debug!("LevelRegistry::from_env: no threshold in environment");
                Self::new()
            }
        }
    }

    /// Current threshold
    pub fn level(&self) -> Result<Level> {
        let guard = self.threshold.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_deref() {
            Some(raw) => raw.parse(),
            None => Ok(DEFAULT_LEVEL),
        }
    }

    /// Replace the threshold
    pub fn set(&self, level: Level) {
        debug!(%level, "LevelRegistry::set: called");
        let mut guard = self.threshold.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(level.as_str().to_string());
    }

    /// Replace the threshold by name, rejecting unknown names
    pub fn set_level(&self, name: &str) -> Result<()> {
        let level: Level = name.parse()?;
        self.set(level);
        Ok(())
    }

    /// Whether a message at `level` passes the current threshold
    pub fn is_enabled(&self, level: Level) -> Result<bool> {
        Ok(level.is_enabled(self.level()?))
    }

    /// Like [`is_enabled`](Self::is_enabled) for a level given by name
    pub fn is_level_enabled(&self, name: &str) -> Result<bool> {
        let level: Level = name.parse()?;
        self.is_enabled(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_threshold_is_info() {
        let levels = LevelRegistry::new();
        assert_eq!(levels.level().unwrap(), Level::Info);
        assert!(levels.is_enabled(Level::Info).unwrap());
        assert!(levels.is_enabled(Level::Warn).unwrap());
        assert!(!levels.is_enabled(Level::Perf).unwrap());
        assert!(!levels.is_enabled(Level::Verbose).unwrap());
    }

    #[test]
    fn test_set_level_is_shared_between_clones() {
        let levels = LevelRegistry::new();
        let other = levels.clone();
        levels.set_level("verbose").unwrap();
        assert_eq!(other.level().unwrap(), Level::Verbose);
        assert!(other.is_level_enabled("verbose").unwrap());
        assert!(!other.is_level_enabled("silly").unwrap());
    }

    #[test]
    fn test_set_level_rejects_unknown_name() {
        let levels = LevelRegistry::new();
        let err = levels.set_level("chatty").unwrap_err();
        assert!(matches!(err, Error::UnknownLevel(ref name) if name == "chatty"));
        assert_eq!(levels.level().unwrap(), Level::Info);
    }

    #[test]
    fn test_is_level_enabled_rejects_unknown_name() {
        let levels = LevelRegistry::new();
        assert_eq!(
            levels.is_level_enabled("foo").unwrap_err().to_string(),
            "Unknown log level \"foo\""
        );
    }

    #[test]
    fn test_invalid_raw_threshold_fails_on_evaluation() {
        let levels = LevelRegistry::with_threshold("loud");
        assert!(matches!(levels.level(), Err(Error::UnknownLevel(_))));
        assert!(levels.is_enabled(Level::Error).is_err());

        levels.set(Level::Warn);
        assert!(levels.is_enabled(Level::Error).unwrap());
    }

    #[test]
    fn test_silent_threshold_suppresses_everything_but_silent() {
        let levels = LevelRegistry::with_threshold("silent");
        for level in Level::ALL {
            assert_eq!(levels.is_enabled(level).unwrap(), level == Level::Silent);
        }
        assert!(!Level::Silent.accepts_messages());
        assert!(Level::Error.accepts_messages());
    }

    #[test]
    fn test_names_are_in_order() {
        assert_eq!(Level::names(), "silly, verbose, perf, info, warn, error, silent");
    }

    proptest! {
        #[test]
        fn prop_enabled_iff_ordinal_at_least_threshold(l in 0usize..7, t in 0usize..7) {
            let levels = LevelRegistry::new();
            levels.set(Level::ALL[t]);
            prop_assert_eq!(levels.is_enabled(Level::ALL[l]).unwrap(), l >= t);
            prop_assert_eq!(levels.is_level_enabled(Level::ALL[l].as_str()).unwrap(), l >= t);
        }
    }
}
