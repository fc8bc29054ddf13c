pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::PublicUser;

// Re-export necessary items
pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{PasswordHasher, MAX_PASSWORD_BYTES};
pub use token::{Claims, TokenError, TokenService};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, dots, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_.-]+$").unwrap();
}

/// Represents the payload for a user login request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name, free text.
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Must be between 3 and 100 characters: letters, digits, underscores, dots or hyphens.
    #[validate(
        length(min = 3, max = 100),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, dots, or hyphens"
        )
    )]
    pub username: String,
    /// At least 6 characters and at most 72 bytes (the bcrypt input limit).
    #[validate(length(min = 6), custom = "validate_password_bytes")]
    pub password: String,
}

fn validate_password_bytes(password: &str) -> Result<(), ValidationError> {
    if password.len() > MAX_PASSWORD_BYTES {
        let mut err = ValidationError::new("password_too_long");
        err.message = Some("Password must be at most 72 bytes".into());
        return Err(err);
    }
    Ok(())
}

/// Response structure after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The JWT for bearer authentication.
    pub token: String,
    pub user: PublicUser,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_login_request_validation() {
        let valid_login = LoginRequest {
            username: "ann".to_string(),
            password: "pw1".to_string(),
        };
        assert!(valid_login.validate().is_ok());

        let empty_password = LoginRequest {
            username: "ann".to_string(),
            password: "".to_string(),
        };
        assert!(empty_password.validate().is_err());
    }

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            name: "Test User".to_string(),
            username: "test_user-1.23".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_register.validate().is_ok());

        let invalid_username_register = RegisterRequest {
            name: "Test User".to_string(),
            username: "test user!".to_string(), // Contains space and exclamation
            password: "password123".to_string(),
        };
        assert!(invalid_username_register.validate().is_err());

        let short_username_register = RegisterRequest {
            name: "Test User".to_string(),
            username: "tu".to_string(),
            password: "password123".to_string(),
        };
        assert!(short_username_register.validate().is_err());

        let empty_name_register = RegisterRequest {
            name: "".to_string(),
            username: "test_user".to_string(),
            password: "password123".to_string(),
        };
        assert!(empty_name_register.validate().is_err());

        let long_password_register = RegisterRequest {
            name: "Test User".to_string(),
            username: "test_user".to_string(),
            password: "p".repeat(73),
        };
        assert!(long_password_register.validate().is_err());

        // 36 two-byte characters plus 7 ASCII: 43 characters but 79 bytes.
        let multibyte_password_register = RegisterRequest {
            name: "Test User".to_string(),
            username: "test_user".to_string(),
            password: format!("{}secretA", "é".repeat(36)),
        };
        assert!(multibyte_password_register.validate().is_err());

        let exactly_72_bytes = RegisterRequest {
            name: "Test User".to_string(),
            username: "test_user".to_string(),
            password: "é".repeat(36),
        };
        assert!(exactly_72_bytes.validate().is_ok());
    }
}
