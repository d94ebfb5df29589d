use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Editor,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Editor => "editor",
        }
    }

    /// Admins may act wherever an editor may.
    pub fn satisfies(&self, required: UserRole) -> bool {
        *self == required || *self == UserRole::Admin
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub email: String,
    pub password: String, // Always hashed
    pub name: String,
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub active: bool,
    pub last_signin: Option<DateTime<Utc>>,
    pub failed_signins: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

/// A user as exposed over the API, without the password hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub active: bool,
    pub last_signin: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            email: user.email,
            name: user.name,
            role: user.role,
            active: user.active,
            last_signin: user.last_signin,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserInput {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserInput {
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub active: Option<bool>,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_satisfies_every_role() {
        assert!(UserRole::Admin.satisfies(UserRole::Editor));
        assert!(UserRole::Admin.satisfies(UserRole::Admin));
        assert!(UserRole::Editor.satisfies(UserRole::Editor));
        assert!(!UserRole::Editor.satisfies(UserRole::Admin));
    }

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&UserRole::Editor).unwrap(), "\"editor\"");
        let parsed: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, UserRole::Admin);
        assert!(serde_json::from_str::<UserRole>("\"root\"").is_err());
    }

    #[test]
    fn profile_drops_password() {
        let user = User {
            id: Some(ObjectId::new()),
            email: "ops@example.com".to_string(),
            password: "$2b$hash".to_string(),
            name: "Ops".to_string(),
            role: UserRole::Editor,
            active: true,
            last_signin: None,
            failed_signins: None,
            created_at: None,
            updated_at: None,
        };
        let json = serde_json::to_value(UserProfile::from(user)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["role"], "editor");
    }
}
