use sqlx::{Pool, Sqlite};
use crate::db::models::{Role, User};
use crate::db::now_iso;
use crate::error::AppError;

pub struct NewUser<'a> {
    pub nickname: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub avatar_url: Option<&'a str>,
    pub role: Role,
}

pub struct UserRepository;

impl UserRepository {
    /// Inserts a user. The `UNIQUE` constraint on `email` is the authority on
    /// uniqueness: a conflicting insert reports `EmailTaken`.
    pub async fn create(pool: &Pool<Sqlite>, new_user: NewUser<'_>) -> Result<User, AppError> {
        let created_at = now_iso();

        let result = sqlx::query_as::<_, User>(
            r#"
INSERT INTO users (nickname, nickname_lower, email, password_hash, avatar_url, role, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(new_user.nickname)
        .bind(new_user.nickname.to_lowercase())
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .bind(new_user.avatar_url)
        .bind(new_user.role)
        .bind(&created_at)
        .fetch_one(pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(AppError::EmailTaken)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_by_email(
        pool: &Pool<Sqlite>,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = ?"
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Nicknames are not unique; the oldest account wins.
    pub async fn get_by_nickname(
        pool: &Pool<Sqlite>,
        nickname: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE nickname = ? ORDER BY id ASC LIMIT 1"
        )
        .bind(nickname)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(
        pool: &Pool<Sqlite>,
        id: i64,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}
