use crate::error::AppError;
use bcrypt::{hash, verify, BcryptError};
use std::sync::Arc;

/// bcrypt only reads this many bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Salted one-way password hashing backed by bcrypt.
///
/// Every call to [`PasswordHasher::hash`] draws a fresh random salt, so hashing the
/// same plaintext twice gives two different strings that both verify.
#[derive(Clone)]
pub struct PasswordHasher {
    cost: u32,
    // Used to spend comparable time when the username does not exist.
    dummy_hash: Arc<str>,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Result<Self, AppError> {
        let dummy_hash = hash("taskforge-dummy-password", cost)?;
        Ok(Self {
            cost,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Rejects passwords over [`MAX_PASSWORD_BYTES`] instead of letting bcrypt truncate them.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(AppError::ValidationError(
                "Password must be at most 72 bytes".into(),
            ));
        }
        hash(password, self.cost)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    }

    /// Returns `Ok(false)` on a mismatch. Only an unparsable stored hash is an error.
    /// A candidate over [`MAX_PASSWORD_BYTES`] never matches.
    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        if password.len() > MAX_PASSWORD_BYTES {
            self.verify_dummy(password);
            return Ok(false);
        }
        verify(password, hashed_password).map_err(|e: BcryptError| {
            AppError::Internal(format!("Failed to verify password: {}", e))
        })
    }

    /// Runs a verification whose result is thrown away.
    pub fn verify_dummy(&self, password: &str) {
        let _ = verify(password, &self.dummy_hash);
    }

    /// [`PasswordHasher::hash`] on the blocking pool.
    pub async fn hash_blocking(&self, password: &str) -> Result<String, AppError> {
        let hasher = self.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
    }

    /// [`PasswordHasher::verify`] on the blocking pool. Pass `None` to run the dummy check.
    pub async fn verify_blocking(
        &self,
        password: &str,
        hashed_password: Option<&str>,
    ) -> Result<bool, AppError> {
        let hasher = self.clone();
        let password = password.to_owned();
        let hashed_password = hashed_password.map(str::to_owned);
        tokio::task::spawn_blocking(move || match hashed_password {
            Some(hashed) => hasher.verify(&password, &hashed),
            None => {
                hasher.verify_dummy(&password);
                Ok(false)
            }
        })
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
    }
}
