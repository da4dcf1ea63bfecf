use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::rngs::OsRng;
use crate::error::AppError;

/// Salted Argon2id hashing with a configurable time cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHashing {
    time_cost: u32,
}

impl PasswordHashing {
    pub fn new(time_cost: u32) -> Self {
        Self { time_cost: time_cost.max(1) }
    }

    fn argon2(&self) -> Result<Argon2<'static>, AppError> {
        let params = Params::new(
            Params::DEFAULT_M_COST,
            self.time_cost,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| AppError::Crypto(format!("Invalid argon2 parameters: {}", e)))?;

        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password into a PHC string (algorithm, params and salt included)
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Crypto(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a stored PHC string. The parameters recorded
    /// in the hash are used, not the current time cost.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| AppError::Crypto(format!("Invalid stored hash: {}", e)))?;

        match self.argon2()?.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::Crypto(format!("Password verification failed: {}", e))),
        }
    }

    /// [`Self::hash_password`] on the blocking pool.
    pub async fn hash_password_blocking(&self, password: String) -> Result<String, AppError> {
        let hashing = *self;
        tokio::task::spawn_blocking(move || hashing.hash_password(&password)).await?
    }

    /// [`Self::verify_password`] on the blocking pool.
    pub async fn verify_password_blocking(
        &self,
        password: String,
        stored_hash: String,
    ) -> Result<bool, AppError> {
        let hashing = *self;
        tokio::task::spawn_blocking(move || hashing.verify_password(&password, &stored_hash)).await?
    }
}
