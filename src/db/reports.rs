use sqlx::{Pool, QueryBuilder, Sqlite};
use crate::db::models::{NewReport, Report, ReportRow, ReportStatus, ReportType};
use crate::db::now_iso;
use crate::error::AppError;

/// Hard ceiling on search results. There is no paging past it.
pub const SEARCH_LIMIT: i64 = 500;

/// Lowercased columns matched by the free-text filter. SQLite's `LOWER` only
/// folds ASCII, so the folding happens in Rust before the row is written.
const TEXT_COLUMNS: [&str; 3] = ["r.search_text", "u.nickname_lower", "u.email"];

/// Keeps a needle from matching across two fields.
const FIELD_SEPARATOR: &str = "\u{1f}";

/// Which reports a search may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportScope {
    /// Only reports authored by this user.
    Own(i64),
    All,
}

#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Substring, matched without regard to case. `None` matches everything.
    pub text: Option<String>,
    pub report_type: Option<ReportType>,
    pub status: Option<ReportStatus>,
}

pub struct ReportRepository;

impl ReportRepository {
    /// Stores a new report as `PENDING` with `created_at == updated_at`.
    pub async fn insert(pool: &Pool<Sqlite>, report: NewReport) -> Result<Report, AppError> {
        let now = now_iso();
        let search_text = search_text(&report);

        let report = sqlx::query_as::<_, Report>(
            r#"
INSERT INTO reports
    (user_id, type, from_city, to_city, cargo, truck, trailer, km,
     date_from, date_to, score, status, note, search_text, created_at, updated_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(report.user_id)
        .bind(report.report_type)
        .bind(&report.from_city)
        .bind(&report.to_city)
        .bind(&report.cargo)
        .bind(&report.truck)
        .bind(&report.trailer)
        .bind(report.km)
        .bind(&report.date_from)
        .bind(&report.date_to)
        .bind(report.score)
        .bind(ReportStatus::Pending)
        .bind(&report.note)
        .bind(&search_text)
        .bind(&now)
        .bind(&now)
        .fetch_one(pool)
        .await?;

        Ok(report)
    }

    pub async fn get_by_id(
        pool: &Pool<Sqlite>,
        id: i64,
    ) -> Result<Option<Report>, AppError> {
        let report = sqlx::query_as::<_, Report>(
            "SELECT * FROM reports WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(report)
    }

    /// Newest first, joined with the author, capped at [`SEARCH_LIMIT`].
    pub async fn search(
        pool: &Pool<Sqlite>,
        scope: ReportScope,
        filter: &ReportFilter,
    ) -> Result<Vec<ReportRow>, AppError> {
        let mut query = QueryBuilder::<Sqlite>::new(
            r#"
SELECT r.*, u.nickname AS driver_nick, u.email AS driver_email, u.avatar_url AS driver_avatar
FROM reports r
JOIN users u ON u.id = r.user_id
WHERE 1 = 1
            "#,
        );

        if let ReportScope::Own(user_id) = scope {
            query.push(" AND r.user_id = ").push_bind(user_id);
        }

        if let Some(report_type) = filter.report_type {
            query.push(" AND r.type = ").push_bind(report_type);
        }

        if let Some(status) = filter.status {
            query.push(" AND r.status = ").push_bind(status);
        }

        let needle = filter
            .text
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());

        if let Some(needle) = needle {
            query.push(" AND (");
            for (i, column) in TEXT_COLUMNS.iter().enumerate() {
                if i > 0 {
                    query.push(" OR ");
                }
                query
                    .push("instr(")
                    .push(*column)
                    .push(", ")
                    .push_bind(needle.clone())
                    .push(") > 0");
            }
            query.push(")");
        }

        query
            .push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ")
            .push_bind(SEARCH_LIMIT);

        let rows = query
            .build_query_as::<ReportRow>()
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }

    /// Returns whether a row was changed. `updated_at` is refreshed even when
    /// the status is unchanged.
    pub async fn update_status(
        pool: &Pool<Sqlite>,
        id: i64,
        status: ReportStatus,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("UPDATE reports SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status)
            .bind(now_iso())
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM reports WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

/// Unicode-lowercased text fields of a report, as matched by search.
fn search_text(report: &NewReport) -> String {
    [
        &report.from_city,
        &report.to_city,
        &report.cargo,
        &report.truck,
        &report.note,
    ]
    .iter()
    .map(|field| field.to_lowercase())
    .collect::<Vec<_>>()
    .join(FIELD_SEPARATOR)
}
