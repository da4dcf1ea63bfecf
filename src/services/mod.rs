pub mod auth;
pub mod coerce;
pub mod reports;

pub use auth::{AuthResponse, AuthService, LoginRequest, Registration};
pub use reports::{ReportPayload, ReportQuery, ReportService};

use crate::crypto::Claims;
use crate::db::models::Role;
use crate::error::AppError;

/// The verified caller of a service operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub email: String,
    pub nickname: String,
    pub role: Role,
}

impl Identity {
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

impl From<&Claims> for Identity {
    fn from(claims: &Claims) -> Self {
        Identity {
            id: claims.uid,
            email: claims.email.clone(),
            nickname: claims.nickname.clone(),
            role: claims.role,
        }
    }
}
