use serde::Deserialize;
use serde_json::Value;

use crate::db::models::{NewReport, Report, ReportRow, ReportStatus, ReportType, Role};
use crate::db::reports::{ReportFilter, ReportRepository, ReportScope};
use crate::db::Database;
use crate::error::AppError;
use crate::services::coerce::{clamp_text, parse_km, parse_number_or_zero};
use crate::services::Identity;

const CITY_MAX: usize = 80;
const CARGO_MAX: usize = 120;
const VEHICLE_MAX: usize = 80;
const NOTE_MAX: usize = 500;

const AUTHORS: [Role; 2] = [Role::Driver, Role::Logist];
const REVIEWERS: [Role; 1] = [Role::Logist];

/// Report fields as submitted. Any `status` sent by the client is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportPayload {
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub from_city: Option<String>,
    pub to_city: Option<String>,
    pub cargo: Option<String>,
    pub truck: Option<String>,
    pub trailer: Option<String>,
    pub km: Value,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub score: Value,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ReportQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub status: Option<String>,
}

impl ReportQuery {
    /// Unknown or `ALL` type/status values mean "no filter".
    pub fn to_filter(&self) -> ReportFilter {
        ReportFilter {
            text: self
                .q
                .as_deref()
                .map(|q| q.trim().to_lowercase())
                .filter(|q| !q.is_empty()),
            report_type: self.report_type.as_deref().and_then(ReportType::from_label),
            status: self
                .status
                .as_deref()
                .and_then(|s| ReportStatus::parse(&s.trim().to_uppercase())),
        }
    }
}

/// Report lifecycle. Every operation checks the caller's role itself.
#[derive(Clone)]
pub struct ReportService {
    db: Database,
}

impl ReportService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        identity: &Identity,
        payload: ReportPayload,
    ) -> Result<Report, AppError> {
        identity.require_role(&AUTHORS)?;

        let from_city = clamp_text(payload.from_city.as_deref(), CITY_MAX);
        let to_city = clamp_text(payload.to_city.as_deref(), CITY_MAX);
        if from_city.is_empty() || to_city.is_empty() {
            return Err(AppError::RouteRequired);
        }

        let report_type = match payload.report_type.as_deref().and_then(ReportType::from_label) {
            Some(ReportType::Unloading) => ReportType::Unloading,
            _ => ReportType::Loading,
        };

        let report = ReportRepository::insert(
            self.db.pool(),
            NewReport {
                user_id: identity.id,
                report_type,
                from_city,
                to_city,
                cargo: clamp_text(payload.cargo.as_deref(), CARGO_MAX),
                truck: clamp_text(payload.truck.as_deref(), VEHICLE_MAX),
                trailer: clamp_text(payload.trailer.as_deref(), VEHICLE_MAX),
                km: parse_km(&payload.km),
                date_from: payload.date_from.filter(|d| !d.is_empty()),
                date_to: payload.date_to.filter(|d| !d.is_empty()),
                score: parse_number_or_zero(&payload.score),
                note: clamp_text(payload.note.as_deref(), NOTE_MAX),
            },
        )
        .await?;

        tracing::debug!(report_id = report.id, user_id = identity.id, "report created");

        Ok(report)
    }

    /// Drivers only ever see their own reports; logists see everyone's.
    pub async fn search(
        &self,
        identity: &Identity,
        query: &ReportQuery,
    ) -> Result<Vec<ReportRow>, AppError> {
        identity.require_role(&AUTHORS)?;

        let scope = match identity.role {
            Role::Driver => ReportScope::Own(identity.id),
            Role::Logist => ReportScope::All,
        };

        ReportRepository::search(self.db.pool(), scope, &query.to_filter()).await
    }

    /// Returns whether a report with `report_id` existed. Setting the current
    /// status again still refreshes `updated_at`.
    pub async fn set_status(
        &self,
        identity: &Identity,
        report_id: i64,
        status: Option<&str>,
    ) -> Result<bool, AppError> {
        identity.require_role(&REVIEWERS)?;

        let status = status
            .and_then(ReportStatus::parse)
            .ok_or(AppError::BadStatus)?;

        if report_id <= 0 {
            return Err(AppError::BadId);
        }

        let changed = ReportRepository::update_status(self.db.pool(), report_id, status).await?;

        tracing::info!(
            report_id,
            status = status.as_str(),
            reviewer = identity.id,
            changed,
            "report status set"
        );

        Ok(changed)
    }

    /// Hard delete. A missing report is not an error: zero rows change.
    pub async fn delete(&self, identity: &Identity, report_id: i64) -> Result<u64, AppError> {
        identity.require_role(&REVIEWERS)?;

        if report_id <= 0 {
            return Err(AppError::BadId);
        }

        let changes = ReportRepository::delete(self.db.pool(), report_id).await?;

        tracing::info!(report_id, reviewer = identity.id, changes, "report deleted");

        Ok(changes)
    }
}

/// Path ids that are not positive integers map to 0, which every operation
/// rejects with `BadId` after its role check.
pub fn parse_report_id(raw: &str) -> i64 {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0).unwrap_or(0)
}
