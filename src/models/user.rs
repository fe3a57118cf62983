//! User, role and credential models.

use serde::{Deserialize, Serialize};
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Account role. Roles form a total order used for permission checks:
/// individual < professional < educator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum UserRole {
    Individual,
    Professional,
    Educator,
}

impl UserRole {
    /// Position in the role hierarchy (1-based).
    pub fn rank(self) -> u8 {
        match self {
            UserRole::Individual => 1,
            UserRole::Professional => 2,
            UserRole::Educator => 3,
        }
    }

    /// Whether this role meets a `required` role.
    pub fn satisfies(self, required: UserRole) -> bool {
        self.rank() >= required.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Individual => "individual",
            UserRole::Professional => "professional",
            UserRole::Educator => "educator",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "individual" => Ok(UserRole::Individual),
            "professional" => Ok(UserRole::Professional),
            "educator" => Ok(UserRole::Educator),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

/// An authenticated account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct User {
    pub id: String,
    /// Login identifier (username or email)
    #[serde(alias = "email")]
    pub identifier: String,
    /// Display name
    pub name: String,
    pub role: UserRole,
    #[serde(default)]
    pub profile_complete: bool,
    /// Last successful login (RFC3339)
    #[serde(default)]
    pub last_login: Option<String>,
}

/// Login attempt. Never persisted.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    #[serde(alias = "email")]
    pub identifier: String,
    #[serde(alias = "password")]
    pub secret: String,
    #[serde(default, alias = "rememberMe")]
    pub remember: bool,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .field("remember", &self.remember)
            .finish()
    }
}

/// Partial profile update. Absent fields are left unchanged.
///
/// `id` and `role` are not user-editable and have no counterpart here.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 254))]
    pub identifier: Option<String>,
    pub profile_complete: Option<bool>,
}

impl User {
    /// Shallow-merge the present fields of `update` into this user.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(identifier) = update.identifier {
            self.identifier = identifier;
        }
        if let Some(profile_complete) = update.profile_complete {
            self.profile_complete = profile_complete;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROLES: [UserRole; 3] = [
        UserRole::Individual,
        UserRole::Professional,
        UserRole::Educator,
    ];

    #[test]
    fn test_role_hierarchy_is_monotonic() {
        for held in ROLES {
            for required in ROLES {
                if held.satisfies(required) {
                    for lower in ROLES.iter().filter(|r| r.rank() <= required.rank()) {
                        assert!(held.satisfies(*lower), "{:?} should satisfy {:?}", held, lower);
                    }
                }
            }
        }
        assert!(UserRole::Educator.satisfies(UserRole::Individual));
        assert!(!UserRole::Individual.satisfies(UserRole::Professional));
    }

    #[test]
    fn test_role_parse_roundtrip() {
        for role in ROLES {
            assert_eq!(role.as_str().parse::<UserRole>().unwrap(), role);
        }
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_user_accepts_email_alias() {
        let json = r#"{"id":"1","email":"sarah@example.com","name":"Sarah Chen","role":"individual"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.identifier, "sarah@example.com");
        assert!(!user.profile_complete);
        assert!(user.last_login.is_none());
    }

    #[test]
    fn test_apply_is_shallow_merge() {
        let mut user = User {
            id: "6".to_string(),
            identifier: "user".to_string(),
            name: "Regular User".to_string(),
            role: UserRole::Individual,
            profile_complete: false,
            last_login: None,
        };

        user.apply(ProfileUpdate {
            profile_complete: Some(true),
            ..Default::default()
        });

        assert!(user.profile_complete);
        assert_eq!(user.name, "Regular User");
        assert_eq!(user.role, UserRole::Individual);
    }

    #[test]
    fn test_profile_update_validation() {
        let empty_name = ProfileUpdate {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(empty_name.validate().is_err());

        let ok = ProfileUpdate {
            name: Some("Sarah C.".to_string()),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials {
            identifier: "admin".to_string(),
            secret: "admin".to_string(),
            remember: true,
        };
        let debug = format!("{:?}", creds);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret: \"admin\""));
    }
}
