//! Cross-cutting concerns: errors, authentication, validation, extractors

pub mod auth;
pub mod error;
pub mod extractors;
pub mod validation;

pub use auth::{AuthUser, Claims, TokenManager};
pub use error::{ApiError, ErrorResponse, FieldError};
pub use extractors::ValidatedJson;
