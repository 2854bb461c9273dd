//! Publishing targets.
//!
//! A [`Target`] selects which [`RuleSet`](crate::RuleSet) applies to a piece of
//! generated content. The set is closed: one product marketplace and three
//! social platforms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RuleSetError;

/// Destination a content record is produced for.
///
/// # Examples
///
/// ```rust
/// use rules::Target;
///
/// let target: Target = "ig".parse().unwrap();
/// assert_eq!(target, Target::Instagram);
/// assert!(target.is_social());
/// assert!(!Target::Marketplace.is_social());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// Product listing on a handmade-goods marketplace.
    Marketplace,
    /// Instagram post caption.
    Instagram,
    /// Facebook page post.
    Facebook,
    /// Pinterest pin.
    Pinterest,
}

impl Target {
    /// Every target, in catalog order.
    pub const ALL: [Target; 4] = [
        Target::Marketplace,
        Target::Instagram,
        Target::Facebook,
        Target::Pinterest,
    ];

    /// Stable snake_case identifier, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Marketplace => "marketplace",
            Target::Instagram => "instagram",
            Target::Facebook => "facebook",
            Target::Pinterest => "pinterest",
        }
    }

    /// Social targets render tags as space-separated `#hashtags`; the
    /// marketplace keeps a plain comma-separated list.
    pub fn is_social(&self) -> bool {
        !matches!(self, Target::Marketplace)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = RuleSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "marketplace" | "etsy" | "listing" => Ok(Target::Marketplace),
            "instagram" | "ig" => Ok(Target::Instagram),
            "facebook" | "fb" => Ok(Target::Facebook),
            "pinterest" | "pin" => Ok(Target::Pinterest),
            _ => Err(RuleSetError::UnknownTarget(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_aliases_case_insensitively() {
        assert_eq!("Marketplace".parse::<Target>().unwrap(), Target::Marketplace);
        assert_eq!(" FB ".parse::<Target>().unwrap(), Target::Facebook);
        assert_eq!("pin".parse::<Target>().unwrap(), Target::Pinterest);
    }

    #[test]
    fn unknown_target_rejected() {
        let err = "tiktok".parse::<Target>().unwrap_err();
        assert_eq!(err, RuleSetError::UnknownTarget("tiktok".into()));
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for target in Target::ALL {
            assert_eq!(target.to_string().parse::<Target>().unwrap(), target);
        }
    }
}
