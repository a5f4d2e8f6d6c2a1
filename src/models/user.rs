//! User model, roles and JWT claims

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

use super::permission::{Permission, PermissionSet};

/// Portal role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Building owner
    Owner,
    /// Management company
    Mgmt,
    Tenant,
    Broker,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Owner, Role::Mgmt, Role::Tenant, Role::Broker];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Mgmt => "MGMT",
            Role::Tenant => "TENANT",
            Role::Broker => "BROKER",
        }
    }

    pub fn permissions(&self) -> PermissionSet {
        PermissionSet::for_role(*self)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Portal user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub building_id: Option<String>,
    pub tenant_id: Option<String>,
    /// Hashed password (argon2)
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
}

/// Short user representation for lists
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserShort {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl From<&User> for UserShort {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: String,
    pub name: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn permissions(&self) -> PermissionSet {
        self.role.permissions()
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.permissions().has_permission(permission)
    }

    // Authorization checks
    pub fn require(&self, permission: Permission) -> Result<(), AppError> {
        if self.has(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing permission {}",
                permission
            )))
        }
    }

    pub fn require_any(&self, permissions: &[Permission]) -> Result<(), AppError> {
        if self.permissions().has_any_permission(permissions) {
            Ok(())
        } else {
            let names: Vec<&str> = permissions.iter().map(|p| p.as_str()).collect();
            Err(AppError::Authorization(format!(
                "One of these permissions is required: {}",
                names.join(", ")
            )))
        }
    }

    /// Caller identity passed down to services
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id.clone(),
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// Who performs a workflow operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn has(&self, permission: Permission) -> bool {
        self.role.permissions().has_permission(permission)
    }
}
