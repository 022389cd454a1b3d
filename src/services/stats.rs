//! Report statistics for the admin analytics screen.
//!
//! Summary counters (`totalReports`, per-status tallies) always cover every
//! report ever filed. Only the daily series is limited to the requested
//! window of `rangeDays` calendar days ending today. Day boundaries are the
//! midnights of a fixed reference offset taken from configuration.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::report::{ReportStatus, StatusBucket};

/// Window used when the caller supplies nothing usable.
pub const DEFAULT_RANGE_DAYS: u32 = 30;

/// Upper bound on the window length.
pub const MAX_RANGE_DAYS: u32 = 365;

/// Number of entries in `recentReports`.
pub const RECENT_REPORTS_LIMIT: i64 = 10;

/// Submitter name shown when a report's owner cannot be resolved.
pub const UNKNOWN_SUBMITTER: &str = "Unknown";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportStats {
    pub total_reports: i64,
    pub pending_count: i64,
    pub resolved_count: i64,
    pub status_counts: Vec<StatusCount>,
    pub reports_over_time: Vec<DailyCount>,
    pub range_days: u32,
    pub recent_reports: Vec<RecentReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub name: &'static str,
    pub count: i64,
}

/// One day of the time series; `date` serializes as `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentReport {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    /// Display name of the submitter.
    pub user: String,
    pub created_at: DateTime<Utc>,
}

/// Row of `GROUP BY status`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusGroup {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RecentReportRow {
    pub id: Uuid,
    pub title: String,
    pub status: String,
    pub user_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<RecentReportRow> for RecentReport {
    fn from(row: RecentReportRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            status: row.status,
            user: row
                .user_name
                .unwrap_or_else(|| UNKNOWN_SUBMITTER.to_string()),
            created_at: row.created_at,
        }
    }
}

/// Turn the raw `rangeDays` query value into the effective window length.
///
/// Missing, non-numeric, zero and negative inputs become
/// [`DEFAULT_RANGE_DAYS`]; the result is clamped to `1..=MAX_RANGE_DAYS`.
pub fn resolve_range_days(raw: Option<&str>) -> u32 {
    let requested = raw
        .and_then(parse_leading_int)
        .filter(|n| *n > 0)
        .unwrap_or(i64::from(DEFAULT_RANGE_DAYS));
    // Lossless: the clamp keeps the value inside u32.
    requested.clamp(1, i64::from(MAX_RANGE_DAYS)) as u32
}

/// Leading-integer parse: optional sign, then digits; anything after is ignored.
/// Digit runs too long for `i64` saturate.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() {
        return None;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Inclusive span of calendar days ending today in the reference zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    /// Midnight opening `first_day`, as an instant.
    pub starts_at: DateTime<Utc>,
    tz: FixedOffset,
}

impl DayWindow {
    pub fn ending_at(now: DateTime<Utc>, tz: FixedOffset, range_days: u32) -> Self {
        let last_day = now.with_timezone(&tz).date_naive();
        let first_day = last_day
            .checked_sub_days(Days::new(u64::from(range_days.saturating_sub(1))))
            .unwrap_or(NaiveDate::MIN);
        Self {
            first_day,
            last_day,
            starts_at: start_of_day(first_day, tz),
            tz,
        }
    }

    /// Calendar day `at` falls on in the reference zone.
    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.first_day
            .iter_days()
            .take_while(move |day| *day <= self.last_day)
    }
}

fn start_of_day(day: NaiveDate, tz: FixedOffset) -> DateTime<Utc> {
    let local = day.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&local)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| local.and_utc())
}

/// Zero-filled per-day counters for one request.
#[derive(Debug)]
struct DayBuckets<'w> {
    window: &'w DayWindow,
    counts: BTreeMap<NaiveDate, i64>,
}

impl<'w> DayBuckets<'w> {
    fn new(window: &'w DayWindow) -> Self {
        Self {
            window,
            counts: window.days().map(|day| (day, 0)).collect(),
        }
    }

    /// Count a report filed at `at`; instants outside the window are dropped.
    fn record(&mut self, at: DateTime<Utc>) {
        if let Some(count) = self.counts.get_mut(&self.window.day_of(at)) {
            *count += 1;
        }
    }

    fn into_series(self) -> Vec<DailyCount> {
        self.counts
            .into_iter()
            .map(|(date, count)| DailyCount { date, count })
            .collect()
    }
}

/// All-time tallies in [`StatusBucket::ORDER`].
fn tally_statuses(groups: &[StatusGroup]) -> [i64; 4] {
    let mut tally = [0i64; 4];
    for group in groups {
        let bucket = StatusBucket::classify(&group.status);
        if let Some(slot) = StatusBucket::ORDER.iter().position(|b| *b == bucket) {
            tally[slot] += group.count;
        }
    }
    tally
}

fn count_for(tally: &[i64; 4], status: ReportStatus) -> i64 {
    StatusBucket::ORDER
        .iter()
        .position(|b| *b == StatusBucket::Known(status))
        .map_or(0, |slot| tally[slot])
}

/// Assemble the stats from already-fetched rows.
///
/// `window_created_at` holds the creation instants of reports filed since
/// `window.starts_at`; `recent` is expected newest first.
pub fn summarize(
    range_days: u32,
    window: &DayWindow,
    groups: &[StatusGroup],
    window_created_at: &[DateTime<Utc>],
    recent: Vec<RecentReportRow>,
) -> ReportStats {
    let tally = tally_statuses(groups);

    let mut buckets = DayBuckets::new(window);
    for at in window_created_at {
        buckets.record(*at);
    }

    ReportStats {
        total_reports: tally.iter().sum(),
        pending_count: count_for(&tally, ReportStatus::Pending),
        resolved_count: count_for(&tally, ReportStatus::Resolved),
        status_counts: StatusBucket::ORDER
            .iter()
            .zip(tally)
            .map(|(bucket, count)| StatusCount {
                name: bucket.label(),
                count,
            })
            .collect(),
        reports_over_time: buckets.into_series(),
        range_days,
        recent_reports: recent.into_iter().map(RecentReport::from).collect(),
    }
}

/// Compute report statistics for the window requested by `raw_range_days`.
pub async fn get_report_stats(
    pool: &PgPool,
    raw_range_days: Option<&str>,
    tz: FixedOffset,
) -> Result<ReportStats, AppError> {
    let range_days = resolve_range_days(raw_range_days);
    let now = Utc::now();
    let window = DayWindow::ending_at(now, tz, range_days);

    tracing::debug!(
        range_days,
        first_day = %window.first_day,
        last_day = %window.last_day,
        "Building report stats"
    );

    let (groups, window_created_at, recent) = tokio::try_join!(
        fetch_status_groups(pool),
        fetch_created_since(pool, window.starts_at, now),
        fetch_recent_reports(pool),
    )?;

    Ok(summarize(
        range_days,
        &window,
        &groups,
        &window_created_at,
        recent,
    ))
}

async fn fetch_status_groups(pool: &PgPool) -> Result<Vec<StatusGroup>, AppError> {
    let rows = sqlx::query_as::<_, StatusGroup>(
        "SELECT status, COUNT(*) AS count FROM reports GROUP BY status",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn fetch_created_since(
    pool: &PgPool,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<DateTime<Utc>>, AppError> {
    let rows = sqlx::query_scalar::<_, DateTime<Utc>>(
        "SELECT created_at FROM reports WHERE created_at >= $1 AND created_at <= $2",
    )
    .bind(since)
    .bind(until)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn fetch_recent_reports(pool: &PgPool) -> Result<Vec<RecentReportRow>, AppError> {
    let rows = sqlx::query_as::<_, RecentReportRow>(
        r#"
        SELECT r.id, r.title, r.status, u.name AS user_name, r.created_at
        FROM reports r
        LEFT JOIN users u ON u.id = r.user_id
        ORDER BY r.created_at DESC, r.id DESC
        LIMIT $1
        "#,
    )
    .bind(RECENT_REPORTS_LIMIT)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn groups(pairs: &[(&str, i64)]) -> Vec<StatusGroup> {
        pairs
            .iter()
            .map(|(status, count)| StatusGroup {
                status: status.to_string(),
                count: *count,
            })
            .collect()
    }

    fn recent_row(title: &str, user: Option<&str>, created_at: DateTime<Utc>) -> RecentReportRow {
        RecentReportRow {
            id: Uuid::new_v4(),
            title: title.to_string(),
            status: "Pending".to_string(),
            user_name: user.map(str::to_string),
            created_at,
        }
    }

    #[test]
    fn range_defaults_when_missing_or_unusable() {
        assert_eq!(resolve_range_days(None), 30);
        assert_eq!(resolve_range_days(Some("")), 30);
        assert_eq!(resolve_range_days(Some("abc")), 30);
        assert_eq!(resolve_range_days(Some("0")), 30);
        assert_eq!(resolve_range_days(Some("-7")), 30);
        assert_eq!(resolve_range_days(Some("-")), 30);
    }

    #[test]
    fn range_is_clamped() {
        assert_eq!(resolve_range_days(Some("1")), 1);
        assert_eq!(resolve_range_days(Some("365")), 365);
        assert_eq!(resolve_range_days(Some("366")), 365);
        assert_eq!(resolve_range_days(Some("99999999999999999999999")), 365);
    }

    #[test]
    fn range_takes_leading_integer() {
        assert_eq!(resolve_range_days(Some("7")), 7);
        assert_eq!(resolve_range_days(Some(" 14")), 14);
        assert_eq!(resolve_range_days(Some("12abc")), 12);
        assert_eq!(resolve_range_days(Some("3.9")), 3);
        assert_eq!(resolve_range_days(Some("+5")), 5);
    }

    #[test]
    fn window_has_exactly_range_days_consecutive_days() {
        let now = at("2024-03-10T15:30:00Z");
        for range in [1, 2, 7, 30, 90, 365] {
            let window = DayWindow::ending_at(now, utc(), range);
            let days: Vec<_> = window.days().collect();
            assert_eq!(days.len(), range as usize);
            assert_eq!(*days.last().unwrap(), day("2024-03-10"));
            for pair in days.windows(2) {
                assert_eq!(pair[1] - pair[0], Duration::days(1));
            }
        }
    }

    #[test]
    fn window_crosses_leap_day() {
        let window = DayWindow::ending_at(at("2024-03-01T08:00:00Z"), utc(), 3);
        let days: Vec<_> = window.days().collect();
        assert_eq!(days, [day("2024-02-28"), day("2024-02-29"), day("2024-03-01")]);
    }

    #[test]
    fn window_starts_at_local_midnight() {
        let window = DayWindow::ending_at(at("2024-03-10T15:30:00Z"), utc(), 7);
        assert_eq!(window.first_day, day("2024-03-04"));
        assert_eq!(window.starts_at, at("2024-03-04T00:00:00Z"));
    }

    #[test]
    fn reference_offset_moves_day_boundaries() {
        // 02:00 UTC on the 10th is still the 9th at UTC-05:00.
        let tz = FixedOffset::west_opt(5 * 3600).unwrap();
        let window = DayWindow::ending_at(at("2024-03-10T02:00:00Z"), tz, 2);
        assert_eq!(window.last_day, day("2024-03-09"));
        assert_eq!(window.first_day, day("2024-03-08"));
        assert_eq!(window.starts_at, at("2024-03-08T05:00:00Z"));
        assert_eq!(window.day_of(at("2024-03-09T04:59:59Z")), day("2024-03-08"));
        assert_eq!(window.day_of(at("2024-03-09T05:00:00Z")), day("2024-03-09"));
    }

    #[test]
    fn three_reports_today_scenario() {
        let now = at("2024-03-10T15:30:00Z");
        let window = DayWindow::ending_at(now, utc(), 1);
        let created = [
            at("2024-03-10T01:00:00Z"),
            at("2024-03-10T09:00:00Z"),
            at("2024-03-10T15:00:00Z"),
        ];
        let stats = summarize(
            1,
            &window,
            &groups(&[("Pending", 1), ("Resolved", 1), ("Weird", 1)]),
            &created,
            vec![],
        );

        assert_eq!(
            stats.reports_over_time,
            [DailyCount {
                date: day("2024-03-10"),
                count: 3
            }]
        );
        let counts: Vec<_> = stats
            .status_counts
            .iter()
            .map(|s| (s.name, s.count))
            .collect();
        assert_eq!(
            counts,
            [("Pending", 1), ("In Progress", 0), ("Resolved", 1), ("Other", 1)]
        );
        assert_eq!(stats.pending_count, 1);
        assert_eq!(stats.resolved_count, 1);
        assert_eq!(stats.total_reports, 3);
        assert_eq!(stats.range_days, 1);
    }

    #[test]
    fn empty_store_yields_flat_zero_series() {
        let window = DayWindow::ending_at(at("2024-03-10T15:30:00Z"), utc(), 30);
        let stats = summarize(30, &window, &[], &[], vec![]);

        assert_eq!(stats.total_reports, 0);
        assert_eq!(stats.reports_over_time.len(), 30);
        assert!(stats.reports_over_time.iter().all(|d| d.count == 0));
        assert!(stats.status_counts.iter().all(|s| s.count == 0));
        assert_eq!(stats.status_counts.len(), 4);
        assert!(stats.recent_reports.is_empty());
    }

    #[test]
    fn report_at_window_start_midnight_is_counted() {
        let window = DayWindow::ending_at(at("2024-03-10T15:30:00Z"), utc(), 7);
        let stats = summarize(
            7,
            &window,
            &groups(&[("Pending", 1)]),
            &[window.starts_at],
            vec![],
        );
        assert_eq!(stats.reports_over_time[0].date, day("2024-03-04"));
        assert_eq!(stats.reports_over_time[0].count, 1);
    }

    #[test]
    fn instants_outside_window_are_ignored() {
        let window = DayWindow::ending_at(at("2024-03-10T15:30:00Z"), utc(), 2);
        let created = [
            at("2024-03-08T23:59:59Z"),
            at("2024-03-09T00:00:00Z"),
            at("2024-03-11T00:00:01Z"),
        ];
        let stats = summarize(2, &window, &groups(&[("Pending", 3)]), &created, vec![]);
        let total: i64 = stats.reports_over_time.iter().map(|d| d.count).sum();
        assert_eq!(total, 1);
        assert_eq!(stats.total_reports, 3);
    }

    #[test]
    fn series_sum_independent_of_all_time_total() {
        let window = DayWindow::ending_at(at("2024-03-10T15:30:00Z"), utc(), 3);
        let created = [
            at("2024-03-08T10:00:00Z"),
            at("2024-03-08T11:00:00Z"),
            at("2024-03-10T12:00:00Z"),
        ];
        let stats = summarize(
            3,
            &window,
            &groups(&[("Pending", 5), ("In Progress", 4), ("Resolved", 11)]),
            &created,
            vec![],
        );
        let counts: Vec<_> = stats.reports_over_time.iter().map(|d| d.count).collect();
        assert_eq!(counts, [2, 0, 1]);
        assert_eq!(stats.total_reports, 20);
    }

    #[test]
    fn status_counts_sum_to_total() {
        let window = DayWindow::ending_at(at("2024-03-10T15:30:00Z"), utc(), 30);
        let stats = summarize(
            30,
            &window,
            &groups(&[
                ("Pending", 2),
                ("In Progress", 3),
                ("Resolved", 4),
                ("Closed", 5),
                ("pending", 6),
            ]),
            &[],
            vec![],
        );
        let sum: i64 = stats.status_counts.iter().map(|s| s.count).sum();
        assert_eq!(sum, stats.total_reports);
        assert_eq!(stats.status_counts[3].count, 11);
        assert_eq!(stats.pending_count, 2);
    }

    #[test]
    fn recent_reports_fall_back_to_unknown_submitter() {
        let window = DayWindow::ending_at(at("2024-03-10T15:30:00Z"), utc(), 1);
        let recent = vec![
            recent_row("Fire", Some("Alex"), at("2024-03-10T10:00:00Z")),
            recent_row("Flood", None, at("2024-03-09T10:00:00Z")),
        ];
        let stats = summarize(1, &window, &groups(&[("Pending", 2)]), &[], recent);
        assert_eq!(stats.recent_reports[0].user, "Alex");
        assert_eq!(stats.recent_reports[1].user, UNKNOWN_SUBMITTER);
    }

    #[test]
    fn serialized_shape_uses_camel_case_and_iso_dates() {
        let window = DayWindow::ending_at(at("2024-03-10T15:30:00Z"), utc(), 1);
        let recent = vec![recent_row("Fire", Some("Alex"), at("2024-03-10T10:00:00Z"))];
        let stats = summarize(1, &window, &groups(&[("Pending", 1)]), &[], recent);
        let json = serde_json::to_value(&stats).unwrap();

        assert_eq!(json["totalReports"], 1);
        assert_eq!(json["pendingCount"], 1);
        assert_eq!(json["resolvedCount"], 0);
        assert_eq!(json["rangeDays"], 1);
        assert_eq!(json["statusCounts"][1]["name"], "In Progress");
        assert_eq!(json["reportsOverTime"][0]["date"], "2024-03-10");
        assert_eq!(json["reportsOverTime"][0]["count"], 0);
        assert_eq!(json["recentReports"][0]["user"], "Alex");
        assert!(json["recentReports"][0]["createdAt"].is_string());
    }
}
