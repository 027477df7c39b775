//! User model - accounts and the identity derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

pub type UserId = i64;

/// Role codes. Stored as text in `users.role_code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// User entity.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub user_id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: String,
    pub role_code: String,
    pub created_utc: DateTime<Utc>,
}

impl User {
    /// Unknown role codes degrade to the least-privileged role.
    pub fn role(&self) -> Role {
        self.role_code.parse().unwrap_or(Role::User)
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.user_id,
            email: self.email.clone(),
            role: self.role(),
        }
    }

    /// Convert to sanitized response (no password hash).
    pub fn sanitized(&self) -> UserResponse {
        UserResponse::from(self.clone())
    }
}

/// Fields required to insert a user; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub display_name: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

/// Authenticated principal for the duration of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub role: Role,
}

/// User response for API (without sensitive fields).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub user_id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
    pub created_utc: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        let role = u.role();
        Self {
            user_id: u.user_id,
            email: u.email,
            display_name: u.display_name,
            role,
            created_utc: u.created_utc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role_code: &str) -> User {
        User {
            user_id: 5,
            email: "a@x.com".to_string(),
            display_name: None,
            password_hash: "$argon2id$...".to_string(),
            role_code: role_code.to_string(),
            created_utc: Utc::now(),
        }
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(user("admin").role(), Role::Admin);
        assert_eq!(user("USER").role(), Role::User);
        assert_eq!(user("superuser").role(), Role::User);
    }

    #[test]
    fn test_identity_from_user() {
        let identity = user("admin").identity();
        assert_eq!(identity.id, 5);
        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.role, Role::Admin);
    }
}
