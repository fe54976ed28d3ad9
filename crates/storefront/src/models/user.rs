//! User domain types.

use serde::{Deserialize, Serialize};

use shopeasy_core::UserId;

/// The authenticated account, as reported by the `me/` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Unique user ID.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Email address (may be blank; the backend does not require one).
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    /// Staff members may use the product administration screens.
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl UserProfile {
    /// Whether the account may administer the catalog.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }

    /// Full name when set, otherwise the username.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_from_staff_or_superuser() {
        let json = r#"{"id": 1, "username": "ana", "is_staff": false, "is_superuser": true}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert!(profile.is_admin());

        let json = r#"{"id": 2, "username": "bia"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert!(!profile.is_admin());
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let json = r#"{"id": 1, "username": "ana", "first_name": "", "last_name": ""}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.display_name(), "ana");

        let json = r#"{"id": 1, "username": "ana", "first_name": "Ana", "last_name": "Lima"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.display_name(), "Ana Lima");
    }
}
