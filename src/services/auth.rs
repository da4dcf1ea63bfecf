use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::config::Config;
use crate::crypto::{constant_time_eq, Claims, PasswordHashing, TokenIssuer};
use crate::db::models::{PublicUser, Role, User};
use crate::db::users::{NewUser, UserRepository};
use crate::db::Database;
use crate::error::AppError;
use crate::services::coerce::{clamp_text, clean_avatar_url, normalize_email};

const NICKNAME_MAX: usize = 40;
const NICKNAME_MIN: usize = 2;
const PASSWORD_MIN: usize = 6;

/// Verified against when the login names no account.
const DUMMY_PASSWORD: &str = "not-a-real-account-password";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub email: Option<String>,
    pub nickname: Option<String>,
    pub password: Option<String>,
    pub avatar_url: Option<String>,
    pub role: Option<String>,
    pub logist_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    /// Email if it contains `@`, nickname otherwise.
    pub login: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Registration, login and token verification.
#[derive(Clone)]
pub struct AuthService {
    db: Database,
    hashing: PasswordHashing,
    tokens: TokenIssuer,
    logist_invite_code: Option<String>,
    dummy_hash: Arc<OnceCell<String>>,
}

impl AuthService {
    pub fn new(db: Database, config: &Config) -> Self {
        Self {
            db,
            hashing: PasswordHashing::new(config.hash_cost),
            tokens: TokenIssuer::new(
                config.jwt_secret.as_bytes(),
                chrono::Duration::days(config.token_ttl_days),
            ),
            logist_invite_code: config.logist_invite_code.clone(),
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub async fn register(&self, req: Registration) -> Result<AuthResponse, AppError> {
        let email = normalize_email(req.email.as_deref());
        if !email.contains('@') {
            return Err(AppError::EmailInvalid);
        }

        let nickname = clamp_text(req.nickname.as_deref(), NICKNAME_MAX);
        if nickname.chars().count() < NICKNAME_MIN {
            return Err(AppError::NicknameShort);
        }

        // length of the raw password, untrimmed
        let password = req.password.unwrap_or_default();
        if password.chars().count() < PASSWORD_MIN {
            return Err(AppError::PasswordShort);
        }

        let avatar_url = clean_avatar_url(req.avatar_url.as_deref());
        let role = Role::from_requested(req.role.as_deref());

        if role == Role::Logist {
            self.check_invite_code(req.logist_code.as_deref())?;
        }

        // Fast path only; the UNIQUE constraint decides races.
        if UserRepository::get_by_email(self.db.pool(), &email).await?.is_some() {
            return Err(AppError::EmailTaken);
        }

        let password_hash = self.hashing.hash_password_blocking(password).await?;

        let user = UserRepository::create(
            self.db.pool(),
            NewUser {
                nickname: &nickname,
                email: &email,
                password_hash: &password_hash,
                avatar_url: avatar_url.as_deref(),
                role,
            },
        )
        .await?;

        tracing::info!(user_id = user.id, role = user.role.as_str(), "user registered");

        self.session_for(&user)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AppError> {
        let login = req.login.unwrap_or_default().trim().to_string();
        if login.is_empty() {
            return Err(AppError::LoginRequired);
        }

        let password = req.password.unwrap_or_default();
        if password.is_empty() {
            return Err(AppError::PasswordRequired);
        }

        let user = if login.contains('@') {
            UserRepository::get_by_email(self.db.pool(), &normalize_email(Some(&login))).await?
        } else {
            UserRepository::get_by_nickname(self.db.pool(), &login).await?
        };

        let Some(user) = user else {
            // Same argon2 work as a wrong password.
            let dummy_hash = self.dummy_hash().await?;
            self.hashing.verify_password_blocking(password, dummy_hash).await?;
            tracing::info!("login rejected");
            return Err(AppError::BadCredentials);
        };

        let valid = self
            .hashing
            .verify_password_blocking(password, user.password_hash.clone())
            .await?;

        if !valid {
            tracing::info!("login rejected");
            return Err(AppError::BadCredentials);
        }

        tracing::debug!(user_id = user.id, "user logged in");

        self.session_for(&user)
    }

    /// Resolves an `Authorization` header value into verified claims.
    pub fn authenticate(&self, authorization: Option<&str>) -> Result<Claims, AppError> {
        let token = authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AppError::NoToken)?;

        self.tokens.verify(token)
    }

    fn check_invite_code(&self, supplied: Option<&str>) -> Result<(), AppError> {
        let expected = self
            .logist_invite_code
            .as_deref()
            .ok_or(AppError::LogistCodeNotConfigured)?;

        let supplied = supplied.unwrap_or_default().trim();
        if supplied.is_empty() {
            return Err(AppError::LogistCodeRequired);
        }

        if !constant_time_eq(supplied.as_bytes(), expected.as_bytes()) {
            return Err(AppError::LogistCodeInvalid);
        }

        Ok(())
    }

    async fn dummy_hash(&self) -> Result<String, AppError> {
        let hash = self
            .dummy_hash
            .get_or_try_init(|| self.hashing.hash_password_blocking(DUMMY_PASSWORD.to_string()))
            .await?;
        Ok(hash.clone())
    }

    fn session_for(&self, user: &User) -> Result<AuthResponse, AppError> {
        let user = PublicUser::from(user);
        let token = self.tokens.issue(&user)?;
        Ok(AuthResponse { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn service(invite_code: Option<&str>) -> AuthService {
        let db = Database::in_memory().await.unwrap();
        let config = Config {
            hash_cost: 1,
            logist_invite_code: invite_code.map(str::to_string),
            ..Config::default()
        };
        AuthService::new(db, &config)
    }

    fn registration(email: &str, nickname: &str, password: &str) -> Registration {
        Registration {
            email: Some(email.to_string()),
            nickname: Some(nickname.to_string()),
            password: Some(password.to_string()),
            ..Registration::default()
        }
    }

    fn login(login: &str, password: &str) -> LoginRequest {
        LoginRequest {
            login: Some(login.to_string()),
            password: Some(password.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_validation_order() {
        let auth = service(None).await;

        let err = auth.register(registration("no-at-sign", "anna", "secret1")).await.unwrap_err();
        assert!(matches!(err, AppError::EmailInvalid));

        let err = auth.register(registration("anna@x.com", " a ", "secret1")).await.unwrap_err();
        assert!(matches!(err, AppError::NicknameShort));

        let err = auth.register(registration("anna@x.com", "anna", "12345")).await.unwrap_err();
        assert!(matches!(err, AppError::PasswordShort));

        // whitespace counts toward the raw password length
        auth.register(registration("anna@x.com", "anna", "     1")).await.unwrap();
    }

    #[tokio::test]
    async fn test_register_returns_public_user() {
        let auth = service(None).await;

        let response = auth
            .register(Registration {
                avatar_url: Some("https://cdn.x.com/anna.png".to_string()),
                role: Some("SUPERUSER".to_string()),
                ..registration("  Anna@X.com ", "anna", "secret1")
            })
            .await
            .unwrap();

        assert_eq!(response.user.email, "anna@x.com");
        assert_eq!(response.user.role, Role::Driver);
        assert_eq!(response.user.avatar_url, "https://cdn.x.com/anna.png");

        let claims = auth
            .authenticate(Some(&format!("Bearer {}", response.token)))
            .unwrap();
        assert_eq!(claims.uid, response.user.id);
        assert_eq!(claims.role, Role::Driver);
    }

    #[tokio::test]
    async fn test_nickname_is_clamped() {
        let auth = service(None).await;
        let long = "n".repeat(60);

        let response = auth.register(registration("anna@x.com", &long, "secret1")).await.unwrap();
        assert_eq!(response.user.nickname.chars().count(), 40);
    }

    #[tokio::test]
    async fn test_duplicate_email_case_insensitive() {
        let auth = service(None).await;

        auth.register(registration("anna@x.com", "anna", "secret1")).await.unwrap();
        let err = auth
            .register(registration(" ANNA@x.com ", "anna2", "secret1"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::EmailTaken));
    }

    #[tokio::test]
    async fn test_logist_invite_code() {
        let unconfigured = service(None).await;
        let err = unconfigured
            .register(Registration {
                role: Some("LOGIST".to_string()),
                logist_code: Some("anything".to_string()),
                ..registration("boris@x.com", "boris", "secret1")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::LogistCodeNotConfigured));

        let auth = service(Some("fleet-42")).await;
        let logist = |code: Option<&str>| Registration {
            role: Some("LOGIST".to_string()),
            logist_code: code.map(str::to_string),
            ..registration("boris@x.com", "boris", "secret1")
        };

        let err = auth.register(logist(None)).await.unwrap_err();
        assert!(matches!(err, AppError::LogistCodeRequired));

        let err = auth.register(logist(Some("  "))).await.unwrap_err();
        assert!(matches!(err, AppError::LogistCodeRequired));

        let err = auth.register(logist(Some("fleet-41"))).await.unwrap_err();
        assert!(matches!(err, AppError::LogistCodeInvalid));

        let response = auth.register(logist(Some(" fleet-42 "))).await.unwrap();
        assert_eq!(response.user.role, Role::Logist);
    }

    #[tokio::test]
    async fn test_login_by_email_and_nickname() {
        let auth = service(None).await;
        let registered = auth.register(registration("anna@x.com", "anna", "secret1")).await.unwrap();

        let by_email = auth.login(login(" ANNA@x.com", "secret1")).await.unwrap();
        assert_eq!(by_email.user, registered.user);

        let by_nick = auth.login(login("anna", "secret1")).await.unwrap();
        assert_eq!(by_nick.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let auth = service(None).await;
        auth.register(registration("anna@x.com", "anna", "secret1")).await.unwrap();

        let wrong_password = auth.login(login("anna@x.com", "secret2")).await.unwrap_err();
        let unknown_user = auth.login(login("nobody@x.com", "secret1")).await.unwrap_err();

        assert_eq!(wrong_password.code(), "BAD_CREDENTIALS");
        assert_eq!(unknown_user.code(), wrong_password.code());
        assert_eq!(unknown_user.status(), wrong_password.status());
    }

    #[tokio::test]
    async fn test_unknown_login_still_verifies_a_hash() {
        let auth = service(None).await;
        assert!(auth.dummy_hash.get().is_none());

        let err = auth.login(login("ghost", "secret1")).await.unwrap_err();
        assert!(matches!(err, AppError::BadCredentials));

        let dummy = auth.dummy_hash.get().cloned().unwrap();
        assert!(dummy.starts_with("$argon2id$"));

        // the hash is computed once and reused
        let err = auth.login(login("ghost@x.com", DUMMY_PASSWORD)).await.unwrap_err();
        assert!(matches!(err, AppError::BadCredentials));
        assert_eq!(auth.dummy_hash.get(), Some(&dummy));
    }

    #[tokio::test]
    async fn test_login_requires_fields() {
        let auth = service(None).await;

        let err = auth.login(login("   ", "secret1")).await.unwrap_err();
        assert!(matches!(err, AppError::LoginRequired));

        let err = auth.login(login("anna", "")).await.unwrap_err();
        assert!(matches!(err, AppError::PasswordRequired));
    }

    #[tokio::test]
    async fn test_authenticate_header_forms() {
        let auth = service(None).await;

        assert!(matches!(auth.authenticate(None), Err(AppError::NoToken)));
        assert!(matches!(auth.authenticate(Some("Basic abc")), Err(AppError::NoToken)));
        assert!(matches!(auth.authenticate(Some("Bearer ")), Err(AppError::NoToken)));
        assert!(matches!(auth.authenticate(Some("Bearer garbage")), Err(AppError::BadToken)));
    }
}
