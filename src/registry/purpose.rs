//! Ban purposes
//!
//! A purpose names the activity a material can be banned from. Each purpose
//! owns exactly one registry and one persisted record.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Activity a material can be banned from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    /// Producing the material at a crafting grid
    Crafting,
    /// Placing the material in a furnace's smelting slot
    Smelting,
    /// Burning the material in a furnace's fuel slot
    SmeltFueling,
}

impl Purpose {
    /// Every purpose, in command-table order
    pub const ALL: [Self; 3] = [Self::Crafting, Self::Smelting, Self::SmeltFueling];

    /// Stable key used for storage and logs
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Crafting => "crafting",
            Self::Smelting => "smelting",
            Self::SmeltFueling => "smeltfueling",
        }
    }

    /// Past-tense phrase used in command replies ("cannot be <verb>")
    #[must_use]
    pub const fn report_verb(self) -> &'static str {
        match self {
            Self::Crafting => "crafted",
            Self::Smelting => "smelted",
            Self::SmeltFueling => "used as fuel for smelting",
        }
    }

    /// Imperative phrase used in violation reports ("you cannot <activity>")
    #[must_use]
    pub const fn activity(self) -> &'static str {
        match self {
            Self::Crafting => "craft",
            Self::Smelting => "smelt",
            Self::SmeltFueling => "fuel a furnace with",
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_match_storage_names() {
        assert_eq!(Purpose::Crafting.to_string(), "crafting");
        assert_eq!(Purpose::Smelting.to_string(), "smelting");
        assert_eq!(Purpose::SmeltFueling.to_string(), "smeltfueling");
    }

    #[test]
    fn test_serde_uses_storage_key() {
        let yaml = serde_yaml::to_string(&Purpose::SmeltFueling).expect("Failed to serialize");
        assert_eq!(yaml.trim(), "smeltfueling");
        let purpose: Purpose = serde_yaml::from_str("crafting").expect("Failed to deserialize");
        assert_eq!(purpose, Purpose::Crafting);
    }

    #[test]
    fn test_report_phrases() {
        assert_eq!(Purpose::Crafting.activity(), "craft");
        assert_eq!(Purpose::SmeltFueling.activity(), "fuel a furnace with");
        assert_eq!(Purpose::SmeltFueling.report_verb(), "used as fuel for smelting");
    }
}
