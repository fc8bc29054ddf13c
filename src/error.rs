//!
//! # Custom Error Handling
//!
//! This module defines the custom error type `AppError` used throughout the application.
//! Every service operation returns one of its variants, and the HTTP layer turns it into
//! a status code plus a JSON envelope of the form
//! `{"success": false, "code": <status>, "error": <message>}`.
//!
//! Only the category of an internal failure ever reaches the client. The detail carried by
//! `AppError::Internal` is for logs; the response body always says `Internal server error`.
//!
//! `From` implementations for `sqlx::Error`, `validator::ValidationErrors`,
//! `bcrypt::BcryptError` and `TokenError` allow conversion with the `?` operator.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

use crate::auth::token::TokenError;

/// Represents all possible errors that can occur within the application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Input failed validation rules (HTTP 422). The caller can fix and resubmit.
    ValidationError(String),
    /// The request could not be parsed at all (HTTP 400).
    BadRequest(String),
    /// Registration attempted with a username that is already registered (HTTP 409).
    UsernameTaken,
    /// Login failed. The same for an unknown username and a wrong password (HTTP 401).
    InvalidCredentials,
    /// The caller is not permitted: missing, expired or forged token, or not the owner (HTTP 401).
    Unauthorized(String),
    /// The requested entity does not exist (HTTP 404).
    NotFound(String),
    /// Store or cryptographic failure not attributable to the caller (HTTP 500).
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UsernameTaken => StatusCode::CONFLICT,
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message that is safe to show to a client.
    fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::UsernameTaken => "Username already exists".to_string(),
            AppError::InvalidCredentials => "Invalid username or password".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppError::UsernameTaken => write!(f, "Username already exists"),
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal Server Error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Converts `AppError` variants into `HttpResponse` objects.
impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        HttpResponse::build(status).json(json!({
            "success": false,
            "code": status.as_u16(),
            "error": self.public_message(),
        }))
    }
}

/// Converts `sqlx::Error` into `AppError`.
///
/// `RowNotFound` becomes `NotFound`; every other driver error is logged and becomes
/// `Internal`, so driver text never reaches a response body.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".into()),
            _ => {
                error!("database error: {}", error);
                AppError::Internal(format!("database error: {}", error))
            }
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(error: ValidationErrors) -> AppError {
        AppError::ValidationError(error.to_string())
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        error!("password hashing error: {}", error);
        AppError::Internal(format!("password hashing error: {}", error))
    }
}

/// Every token failure surfaces as `Unauthorized`; the reason is kept in the message.
impl From<TokenError> for AppError {
    fn from(error: TokenError) -> AppError {
        AppError::Unauthorized(error.to_string())
    }
}
