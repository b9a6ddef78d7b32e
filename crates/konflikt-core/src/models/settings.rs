//! Conflict settings model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What happens to freshly detected conflicts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AutoResolveStrategy {
    /// Queue for an operator
    #[default]
    Manual,
    /// Keep the local copy immediately
    LocalWins,
    /// Keep the remote copy immediately
    RemoteWins,
}

impl AutoResolveStrategy {
    pub const ALL: [Self; 3] = [Self::Manual, Self::LocalWins, Self::RemoteWins];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::LocalWins => "local-wins",
            Self::RemoteWins => "remote-wins",
        }
    }

    /// Parse one of the fixed strategy names. Anything else is `None`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|strategy| strategy.as_str() == raw)
    }
}

impl fmt::Display for AutoResolveStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AutoResolveStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown auto-resolve strategy: {s}"))
    }
}

/// Persisted settings record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_resolve_strategy: Option<AutoResolveStrategy>,
}

impl ConflictSettings {
    /// Effective strategy, `manual` when unset
    #[must_use]
    pub fn strategy(&self) -> AutoResolveStrategy {
        self.auto_resolve_strategy.unwrap_or_default()
    }
}
