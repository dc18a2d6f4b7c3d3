//! Signed-in user identity.

use serde::{Deserialize, Serialize};

use super::UserId;

/// Profile of a marketplace user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    /// Backend role name (e.g., `"Member"`, `"Admin"`).
    #[serde(default)]
    pub role: String,
}

impl UserProfile {
    /// Name to show in the UI, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.email)
    }

    /// Whether the user may open the admin dashboard.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.eq_ignore_ascii_case("admin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_email() {
        let mut user = UserProfile {
            user_id: UserId::new(1),
            email: "an@example.vn".to_string(),
            full_name: Some("  ".to_string()),
            phone: None,
            role: "Admin".to_string(),
        };
        assert_eq!(user.display_name(), "an@example.vn");
        assert!(user.is_admin());

        user.full_name = Some("Nguyễn An".to_string());
        assert_eq!(user.display_name(), "Nguyễn An");
    }
}
