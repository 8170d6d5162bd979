use std::str::FromStr;

use serde::Deserialize;

/// How natural-key collisions in `author`, `reference` and `mesh_term` are
/// treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DimensionPolicy {
    /// Every row is inserted as-is; any duplicate key fails the batch.
    #[default]
    Strict,
    /// Duplicates within a batch are dropped (first wins) and rows whose key
    /// is already stored are ignored.
    Merge,
}

impl DimensionPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Merge => "merge",
        }
    }
}

impl std::fmt::Display for DimensionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DimensionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "merge" => Ok(Self::Merge),
            other => Err(format!("unknown dimension policy '{other}' (expected strict or merge)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_policy() {
        assert_eq!("strict".parse::<DimensionPolicy>(), Ok(DimensionPolicy::Strict));
        assert_eq!("Merge".parse::<DimensionPolicy>(), Ok(DimensionPolicy::Merge));
        assert!("upsert".parse::<DimensionPolicy>().is_err());
    }

    #[test]
    fn default_is_strict() {
        assert_eq!(DimensionPolicy::default(), DimensionPolicy::Strict);
    }
}
