//! Incident report model and its lifecycle status.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Statuses an admin may assign to a report.
///
/// The column itself is free text, so rows written before the status set was
/// closed can hold anything; those are classified by [`StatusBucket`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ReportStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 3] = [
        ReportStatus::Pending,
        ReportStatus::InProgress,
        ReportStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::InProgress => "In Progress",
            ReportStatus::Resolved => "Resolved",
        }
    }

    /// Exact, case-sensitive match against the stored literal.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary category for a stored status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBucket {
    Known(ReportStatus),
    Other,
}

impl StatusBucket {
    /// Fixed display order of the four buckets.
    pub const ORDER: [StatusBucket; 4] = [
        StatusBucket::Known(ReportStatus::Pending),
        StatusBucket::Known(ReportStatus::InProgress),
        StatusBucket::Known(ReportStatus::Resolved),
        StatusBucket::Other,
    ];

    pub fn classify(status: &str) -> Self {
        ReportStatus::parse(status).map_or(StatusBucket::Other, StatusBucket::Known)
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusBucket::Known(status) => status.as_str(),
            StatusBucket::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Owner details embedded in report listings.
#[derive(Debug, Clone, Serialize)]
pub struct ReportOwner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Report joined with its owner, as returned by the list endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportWithOwner {
    #[serde(flatten)]
    pub report: Report,
    pub user: Option<ReportOwner>,
}

/// Flat row for the report/owner join; owner columns are null for orphans.
#[derive(Debug, FromRow)]
pub struct ReportOwnerRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
}

impl From<ReportOwnerRow> for ReportWithOwner {
    fn from(row: ReportOwnerRow) -> Self {
        let user = match (row.owner_name, row.owner_email) {
            (Some(name), Some(email)) => Some(ReportOwner {
                id: row.user_id,
                name,
                email,
            }),
            _ => None,
        };
        Self {
            report: Report {
                id: row.id,
                title: row.title,
                description: row.description,
                status: row.status,
                user_id: row.user_id,
                created_at: row.created_at,
            },
            user,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateReport {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 10000))]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateReportStatus {
    pub status: String,
}
