//! Authentication and user lookup service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{User, UserClaims},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by e-mail and password, returning a JWT and the user
    pub fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        let user = self
            .repository
            .users
            .get_by_email(email)?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            tracing::warn!(email = %email, "Failed login attempt");
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!(user_id = %user.id, role = %user.role, "User logged in");
        Ok((token, user))
    }

    /// Issue a token carrying the user's role
    pub fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify user password
    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        if let Some(ref hash) = user.password {
            let parsed_hash = PasswordHash::new(hash)
                .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
            return Ok(Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok());
        }

        Ok(false)
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    pub fn get_user(&self, id: &str) -> AppResult<User> {
        self.repository.users.get_by_id(id)
    }

    pub fn list_users(&self) -> AppResult<Vec<User>> {
        self.repository.users.list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    fn service() -> AuthService {
        let service = AuthService::new(Repository::new(), AuthConfig::default());
        let hash = service.hash_password("password").unwrap();
        service
            .repository
            .users
            .insert(User {
                id: "mgmt-1".into(),
                email: "mgmt@example.com".into(),
                name: "Hanako Sato".into(),
                role: Role::Mgmt,
                building_id: None,
                tenant_id: None,
                password: Some(hash),
            })
            .unwrap();
        service
    }

    #[test]
    fn login_issues_token_with_role() {
        let service = service();
        let (token, user) = service.authenticate("MGMT@example.com", "password").unwrap();
        assert_eq!(user.id, "mgmt-1");
        let claims = UserClaims::from_token(&token, &AuthConfig::default().jwt_secret).unwrap();
        assert_eq!(claims.role, Role::Mgmt);
        assert_eq!(claims.user_id, "mgmt-1");
    }

    #[test]
    fn wrong_password_or_unknown_email_fail() {
        let service = service();
        assert!(matches!(
            service.authenticate("mgmt@example.com", "nope"),
            Err(AppError::Authentication(_))
        ));
        assert!(matches!(
            service.authenticate("ghost@example.com", "password"),
            Err(AppError::Authentication(_))
        ));
    }
}
