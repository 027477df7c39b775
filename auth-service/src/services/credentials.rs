use std::sync::Arc;

use crate::models::{Identity, User};
use crate::services::store::UserStore;
use crate::services::ServiceError;
use crate::utils::{CredentialHasher, Password};

/// Trimmed, lowercased form used for every lookup and insert.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Email/password checks against stored users.
#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
}

impl CredentialVerifier {
    pub fn new(users: Arc<dyn UserStore>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    pub async fn verify_user(&self, email: &str, password: &Password) -> Result<User, ServiceError> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_user_by_email(&email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        let matches = self
            .hasher
            .compare(password, &user.password_hash)
            .unwrap_or_else(|e| {
                tracing::error!(user_id = %user.user_id, error = %e, "Stored password hash unreadable");
                false
            });

        if !matches {
            return Err(ServiceError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn verify(&self, email: &str, password: &Password) -> Result<Identity, ServiceError> {
        Ok(self.verify_user(email, password).await?.identity())
    }

    pub async fn check_available(&self, email: &str) -> Result<(), ServiceError> {
        match self.users.find_user_by_email(&normalize_email(email)).await? {
            Some(_) => Err(ServiceError::ConflictExists),
            None => Ok(()),
        }
    }

    pub fn hash(&self, password: &Password) -> Result<String, ServiceError> {
        Ok(self.hasher.hash(password)?)
    }
}
