use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // Validation
    #[error("email must contain '@'")]
    EmailInvalid,

    #[error("nickname must be at least 2 characters")]
    NicknameShort,

    #[error("password must be at least 6 characters")]
    PasswordShort,

    #[error("login is required")]
    LoginRequired,

    #[error("password is required")]
    PasswordRequired,

    #[error("from_city and to_city are required")]
    RouteRequired,

    #[error("unknown report status")]
    BadStatus,

    #[error("report id must be a positive integer")]
    BadId,

    #[error("malformed request body: {0}")]
    BadRequest(String),

    // Authorization
    #[error("missing bearer token")]
    NoToken,

    #[error("invalid or expired token")]
    BadToken,

    #[error("role is not allowed to perform this action")]
    Forbidden,

    #[error("invalid credentials")]
    BadCredentials,

    #[error("logist invite code is required")]
    LogistCodeRequired,

    #[error("logist invite code does not match")]
    LogistCodeInvalid,

    // Conflict
    #[error("email is already registered")]
    EmailTaken,

    // Deployment
    #[error("logist invite code is not configured on the server")]
    LogistCodeNotConfigured,

    // Infrastructure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Cryptography error: {0}")]
    Crypto(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wire code clients match on.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::EmailInvalid => "EMAIL_INVALID",
            AppError::NicknameShort => "NICKNAME_SHORT",
            AppError::PasswordShort => "PASSWORD_SHORT",
            AppError::LoginRequired => "LOGIN_REQUIRED",
            AppError::PasswordRequired => "PASSWORD_REQUIRED",
            AppError::RouteRequired => "ROUTE_REQUIRED",
            AppError::BadStatus => "BAD_STATUS",
            AppError::BadId => "BAD_ID",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::NoToken => "NO_TOKEN",
            AppError::BadToken => "BAD_TOKEN",
            AppError::Forbidden => "FORBIDDEN",
            AppError::BadCredentials => "BAD_CREDENTIALS",
            AppError::LogistCodeRequired => "LOGIST_CODE_REQUIRED",
            AppError::LogistCodeInvalid => "LOGIST_CODE_INVALID",
            AppError::EmailTaken => "EMAIL_TAKEN",
            AppError::LogistCodeNotConfigured => "LOGIST_CODE_NOT_CONFIGURED",
            AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Crypto(_)
            | AppError::Config(_)
            | AppError::Internal(_) => "SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::EmailInvalid
            | AppError::NicknameShort
            | AppError::PasswordShort
            | AppError::LoginRequired
            | AppError::PasswordRequired
            | AppError::RouteRequired
            | AppError::BadStatus
            | AppError::BadId
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NoToken | AppError::BadToken | AppError::BadCredentials => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Forbidden | AppError::LogistCodeRequired | AppError::LogistCodeInvalid => {
                StatusCode::FORBIDDEN
            }
            AppError::EmailTaken => StatusCode::CONFLICT,
            AppError::LogistCodeNotConfigured
            | AppError::Database(_)
            | AppError::Migration(_)
            | AppError::Crypto(_)
            | AppError::Config(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {}", err))
    }
}

// Axum IntoResponse implementation for HTTP errors
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        } else {
            tracing::debug!(code = self.code(), "{}", self);
        }

        let body = serde_json::json!({
            "error": self.code(),
        });

        (status, axum::Json(body)).into_response()
    }
}
