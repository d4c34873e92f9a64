//! Profile role enumeration.

use serde::{Deserialize, Serialize};

/// Roles a profile can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text")]
pub enum ProfileRole {
    #[serde(rename = "resident")]
    #[sqlx(rename = "resident")]
    Resident,
    #[serde(rename = "business")]
    #[sqlx(rename = "business")]
    Business,
    /// Administers exactly one community.
    #[serde(rename = "community admin")]
    #[sqlx(rename = "community admin")]
    CommunityAdmin,
    /// Administers every community.
    #[serde(rename = "superadmin")]
    #[sqlx(rename = "superadmin")]
    SuperAdmin,
}

text_enum!(ProfileRole {
    Resident => "resident",
    Business => "business",
    CommunityAdmin => "community admin",
    SuperAdmin => "superadmin",
});

impl ProfileRole {
    /// Whether the role can administer at least one community.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::CommunityAdmin | Self::SuperAdmin)
    }

    /// Whether the role is scoped to every community.
    pub fn is_superadmin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Whether new accounts with this role need admin approval.
    pub fn requires_approval(&self) -> bool {
        matches!(self, Self::Resident | Self::Business)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&ProfileRole::CommunityAdmin).unwrap();
        assert_eq!(json, "\"community admin\"");
        let role: ProfileRole = "Community Admin".parse().unwrap();
        assert_eq!(role, ProfileRole::CommunityAdmin);
    }

    #[test]
    fn test_role_predicates() {
        assert!(ProfileRole::SuperAdmin.is_admin());
        assert!(ProfileRole::CommunityAdmin.is_admin());
        assert!(!ProfileRole::Business.is_admin());
        assert!(ProfileRole::Resident.requires_approval());
        assert!(!ProfileRole::SuperAdmin.requires_approval());
    }
}
