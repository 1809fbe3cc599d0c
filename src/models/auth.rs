//! JWT claims and role gates
//!
//! Tokens are issued by the wider platform; this service only validates
//! them. There is no login endpoint here.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;

/// Platform role slug (string identifier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "viewer" => Ok(Role::Viewer),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: Uuid,
    /// Tenant the caller belongs to
    pub company_id: Uuid,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Build claims for a user, expiring `expiration_hours` from now
    pub fn new(user_id: Uuid, company_id: Uuid, role: Role, expiration_hours: u64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            user_id,
            company_id,
            role,
            exp: now + (expiration_hours as i64) * 3600,
            iat: now,
        }
    }

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

    // Authorization checks

    pub fn require_read_assets(&self) -> Result<(), AppError> {
        // every role can read its own tenant
        Ok(())
    }

    pub fn require_manage_assets(&self) -> Result<(), AppError> {
        match self.role {
            Role::Admin | Role::Manager => Ok(()),
            Role::Viewer => Err(AppError::Authorization(
                "Insufficient rights to manage assets".to_string(),
            )),
        }
    }

    /// Verify the caller may act on the given tenant
    pub fn require_company(&self, company_id: Uuid) -> Result<(), AppError> {
        if self.role == Role::Admin || self.company_id == company_id {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Company does not match caller's tenant".to_string(),
            ))
        }
    }

    /// Check if user is a platform admin
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Tenancy filter for data access. Admins see every company.
    pub fn company_scope(&self) -> Option<Uuid> {
        if self.is_admin() {
            None
        } else {
            Some(self.company_id)
        }
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization(
                "Administrator privileges required".to_string(),
            ))
        }
    }
}
