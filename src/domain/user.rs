//! Staff accounts: admins and delivery people

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Access role of a staff account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Deliveryman,
}

/// A staff account as persisted in the document store.
///
/// The bcrypt hash is serialized for storage but never leaves the API:
/// every response goes through [`UserView`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new account from a validated request.
    ///
    /// The password is hashed, the role defaults to `Deliveryman`, and the
    /// account starts active.
    pub fn new(req: CreateUserRequest) -> Result<Self> {
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name: req.name,
            email: req.email,
            password_hash: hash_password(&req.password)?,
            role: req.role.unwrap_or(Role::Deliveryman),
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a full update, rehashing the password.
    pub fn apply(&mut self, req: UpdateUserRequest) -> Result<()> {
        self.name = req.name;
        self.email = req.email;
        self.password_hash = hash_password(&req.password)?;
        if let Some(role) = req.role {
            self.role = role;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Apply a profile update (name/email only; role and password are out
    /// of reach of self-service).
    pub fn apply_profile(&mut self, req: UpdateProfileRequest) {
        if let Some(name) = req.name {
            self.name = name;
        }
        if let Some(email) = req.email {
            self.email = email;
        }
        self.updated_at = Utc::now();
    }

    /// Replace the password with a fresh hash.
    pub fn set_password(&mut self, plain: &str) -> Result<()> {
        self.password_hash = hash_password(plain)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Check a plaintext password against the stored hash.
    pub fn verify_password(&self, plain: &str) -> bool {
        bcrypt::verify(plain, &self.password_hash).unwrap_or(false)
    }

    /// Flip the active flag (soft disable instead of deletion).
    pub fn toggle_active(&mut self) {
        self.active = !self.active;
        self.updated_at = Utc::now();
    }
}

/// Hash a plaintext password with bcrypt.
pub fn hash_password(plain: &str) -> Result<String> {
    bcrypt::hash(plain, bcrypt::DEFAULT_COST).context("failed to hash password")
}

/// The client-facing projection of a [`User`]: everything but the hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            active: user.active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Payload for `POST /api/users`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(email(message = "invalid email"))]
    pub email: String,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: Option<Role>,
}

/// Payload for `PUT /api/users/{id}`. Same required fields as creation.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(email(message = "invalid email"))]
    pub email: String,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,

    #[serde(default)]
    pub role: Option<Role>,
}

/// Payload for `PUT /api/users/profile`.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: Option<String>,

    #[serde(default)]
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
}

/// Payload for `PATCH /api/users/profile/password`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "currentPassword is required"))]
    pub current_password: String,

    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub new_password: String,
}

/// Payload for `POST /api/users/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "invalid email"))]
    pub email: String,

    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

/// Response for a successful login.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserView,
    pub token: String,
}
