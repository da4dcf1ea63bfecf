use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Driver,
    Logist,
}

impl Role {
    /// Only an explicit `"LOGIST"` yields the manager role; anything else,
    /// including unknown values, falls back to `Driver`.
    pub fn from_requested(requested: Option<&str>) -> Self {
        match requested {
            Some("LOGIST") => Role::Logist,
            _ => Role::Driver,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Driver => "DRIVER",
            Role::Logist => "LOGIST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    Loading,
    Unloading,
}

impl ReportType {
    /// Accepts the Latin names and the Cyrillic labels used by the web UI.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_uppercase().as_str() {
            "LOADING" | "ЗАГРУЗКА" => Some(ReportType::Loading),
            "UNLOADING" | "РАЗГРУЗКА" => Some(ReportType::Unloading),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReportStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "PENDING" => Some(ReportStatus::Pending),
            "APPROVED" => Some(ReportStatus::Approved),
            "REJECTED" => Some(ReportStatus::Rejected),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "PENDING",
            ReportStatus::Approved => "APPROVED",
            ReportStatus::Rejected => "REJECTED",
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub nickname: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub avatar_url: Option<String>,
    pub role: Role,
    pub created_at: String,
}

/// What clients get to see of a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub nickname: String,
    pub role: Role,
    pub avatar_url: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        PublicUser {
            id: user.id,
            email: user.email.clone(),
            nickname: user.nickname.clone(),
            role: user.role,
            avatar_url: user.avatar_url.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub user_id: i64,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub from_city: String,
    pub to_city: String,
    pub cargo: String,
    pub truck: String,
    pub trailer: String,
    pub km: i64,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub score: f64,
    pub status: ReportStatus,
    pub note: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A report joined with its author, as returned by search.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ReportRow {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub report: Report,
    pub driver_nick: String,
    pub driver_email: String,
    pub driver_avatar: Option<String>,
}

/// Cleaned report fields ready for insertion.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub user_id: i64,
    pub report_type: ReportType,
    pub from_city: String,
    pub to_city: String,
    pub cargo: String,
    pub truck: String,
    pub trailer: String,
    pub km: i64,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub score: f64,
    pub note: String,
}
