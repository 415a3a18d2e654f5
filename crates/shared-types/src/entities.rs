//! # Core Domain Entities
//!
//! Identity and profile types shared by the connection subsystem, the
//! gateway and any collaborator that renders connection data.
//!
//! ## Clusters
//!
//! - **Identity**: `UserId`
//! - **Presentation**: `UserProfile` (minimal profile: id, display name, avatar)

use crate::errors::IdError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// Numeric identifier of a user account.
///
/// Zero is reserved and never a valid account id. The type is totally
/// ordered so that callers can acquire per-user resources in a stable
/// order (lowest id first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct UserId(u64);

impl UserId {
    /// Create a user id, rejecting the reserved zero value.
    pub fn new(raw: u64) -> Result<Self, IdError> {
        if raw == 0 {
            return Err(IdError::Zero);
        }
        Ok(Self(raw))
    }

    /// The raw numeric id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for UserId {
    type Error = IdError;

    fn try_from(raw: u64) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl From<UserId> for u64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl FromStr for UserId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let raw = trimmed
            .parse::<u64>()
            .map_err(|_| IdError::Malformed(trimmed.to_string()))?;
        Self::new(raw)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// CLUSTER B: PRESENTATION
// =============================================================================

/// Minimal public profile of a user.
///
/// This is the only user data the connection subsystem ever exposes about
/// peers. Aggregate figures such as connection counts are deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Account id.
    pub id: UserId,
    /// Name shown next to the avatar.
    pub display_name: String,
    /// Avatar image URL, if the account has one.
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    /// Build a profile without an avatar.
    pub fn new(id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            avatar_url: None,
        }
    }

    /// Attach an avatar URL.
    #[must_use]
    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_id_rejected() {
        assert_eq!(UserId::new(0), Err(IdError::Zero));
        assert_eq!(UserId::new(7).unwrap().get(), 7);
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!("42".parse::<UserId>().unwrap().get(), 42);
        assert_eq!(" 9 ".parse::<UserId>().unwrap().get(), 9);
        assert!(matches!("abc".parse::<UserId>(), Err(IdError::Malformed(_))));
        assert!(matches!("-3".parse::<UserId>(), Err(IdError::Malformed(_))));
        assert_eq!("0".parse::<UserId>(), Err(IdError::Zero));
    }

    #[test]
    fn test_user_id_ordering() {
        let low = UserId::new(3).unwrap();
        let high = UserId::new(11).unwrap();
        assert!(low < high);
    }

    #[test]
    fn test_user_id_serde_rejects_zero() {
        let id: UserId = serde_json::from_str("12").unwrap();
        assert_eq!(id.get(), 12);
        assert!(serde_json::from_str::<UserId>("0").is_err());
        assert_eq!(serde_json::to_string(&id).unwrap(), "12");
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = UserProfile::new(UserId::new(5).unwrap(), "Ana")
            .with_avatar("https://cdn.example/a.png");
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["id"], 5);
        assert_eq!(json["displayName"], "Ana");
        assert_eq!(json["avatarUrl"], "https://cdn.example/a.png");
    }
}
