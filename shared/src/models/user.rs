//! User Model
//!
//! One table holds all three account kinds. Workers point at the company
//! that employs them through `parent_company_id`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "user_role", rename_all = "lowercase"))]
pub enum UserRole {
    Admin,
    Company,
    Worker,
}

impl UserRole {
    /// Parse from database string value (lowercase)
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Self::Admin),
            "company" => Some(Self::Company),
            "worker" => Some(Self::Worker),
            _ => None,
        }
    }

    /// Database string representation (lowercase)
    pub fn as_db(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Company => "company",
            Self::Worker => "worker",
        }
    }

    /// Company accounts and admins manage workplaces, shifts and workers
    pub fn is_manager(&self) -> bool {
        matches!(self, Self::Admin | Self::Company)
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role: UserRole,
    /// Employing company (workers only)
    pub parent_company_id: Option<i64>,
    pub company_name: Option<String>,
    pub company_ico: Option<String>,
    pub company_dic: Option<String>,
    pub company_address: Option<String>,
    pub hourly_rate: Option<Decimal>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// The company whose data this user works with: itself for a company
    /// account, the employer for a worker.
    pub fn company_scope(&self) -> Option<i64> {
        match self.role {
            UserRole::Company => Some(self.id),
            UserRole::Worker => self.parent_company_id,
            UserRole::Admin => None,
        }
    }
}

/// Register payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 100))]
    pub username: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub role: UserRole,
    pub parent_company_id: Option<i64>,
    #[validate(length(max = 200))]
    pub company_name: Option<String>,
    #[validate(length(max = 20))]
    pub company_ico: Option<String>,
    #[validate(length(max = 20))]
    pub company_dic: Option<String>,
    #[validate(length(max = 500))]
    pub company_address: Option<String>,
}

/// Login payload (`username` may also be an e-mail address)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Profile update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(email, length(max = 254))]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    #[validate(length(max = 200))]
    pub company_name: Option<String>,
    #[validate(length(max = 20))]
    pub company_ico: Option<String>,
    #[validate(length(max = 20))]
    pub company_dic: Option<String>,
    #[validate(length(max = 500))]
    pub company_address: Option<String>,
}

/// Change password payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Current user plus the CSRF token of the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: User,
    #[serde(rename = "csrfToken")]
    pub csrf_token: String,
}

/// Create worker payload (company only)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WorkerCreate {
    #[validate(length(min = 3, max = 100))]
    pub username: String,
    #[validate(email, length(max = 254))]
    pub email: String,
    #[validate(length(max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub hourly_rate: Option<Decimal>,
}

/// Update worker payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct WorkerUpdate {
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[validate(length(max = 50))]
    pub phone: Option<String>,
    pub hourly_rate: Option<Decimal>,
    pub is_active: Option<bool>,
}
