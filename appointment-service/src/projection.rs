//! Pure projections over appointment snapshots
//!
//! Every function takes anything iterable over `&Appointment` and returns
//! references into the input, so projections chain without cloning:
//!
//! ```rust
//! # use appointment_service::*;
//! # let snapshot: Vec<Appointment> = Vec::new();
//! let visible = sort_by_date_descending(filter_by_search(
//!     filter_by_status(&snapshot, StatusFilter::All),
//!     "fever",
//! ));
//! # assert!(visible.is_empty());
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppointmentError;
use crate::lifecycle::Affordance;
use crate::models::{Appointment, AppointmentId, AppointmentStatus};

pub const DEFAULT_UPCOMING_HORIZON_DAYS: u32 = 7;

const UNKNOWN_PATIENT: &str = "Unknown patient";

/// Status filter of the appointment list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(AppointmentStatus),
}

impl StatusFilter {
    pub fn matches(self, status: AppointmentStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = AppointmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(status) => status.fmt(f),
        }
    }
}

pub fn filter_by_status<'a, I>(list: I, filter: StatusFilter) -> Vec<&'a Appointment>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    list.into_iter()
        .filter(|appointment| filter.matches(appointment.status))
        .collect()
}

/// Case-insensitive substring match on the patient's name or the reason.
/// An empty term matches everything.
pub fn filter_by_search<'a, I>(list: I, term: &str) -> Vec<&'a Appointment>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return list.into_iter().collect();
    }

    list.into_iter()
        .filter(|appointment| {
            let name_matches = appointment
                .patient
                .display_name()
                .is_some_and(|name| name.to_lowercase().contains(&needle));
            name_matches || appointment.reason.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Most recent first. Stable: equal timestamps keep their input order.
pub fn sort_by_date_descending<'a, I>(list: I) -> Vec<&'a Appointment>
where
    I: IntoIterator<Item = &'a Appointment>,
{
    let mut sorted: Vec<&Appointment> = list.into_iter().collect();
    sorted.sort_by(|a, b| b.scheduled_at.cmp(&a.scheduled_at));
    sorted
}

/// Appointments between local midnight today (inclusive) and local midnight
/// tomorrow (exclusive), "local" being the zone of `now`.
pub fn today<'a, I, Tz>(list: I, now: &DateTime<Tz>) -> Vec<&'a Appointment>
where
    I: IntoIterator<Item = &'a Appointment>,
    Tz: TimeZone,
{
    let (start, end) = day_bounds(now);
    list.into_iter()
        .filter(|appointment| appointment.scheduled_at >= start && appointment.scheduled_at < end)
        .collect()
}

/// Appointments in `[now, now + horizon_days]`, nearest first.
pub fn upcoming<'a, I, Tz>(list: I, now: &DateTime<Tz>, horizon_days: u32) -> Vec<&'a Appointment>
where
    I: IntoIterator<Item = &'a Appointment>,
    Tz: TimeZone,
{
    let start = now.with_timezone(&Utc);
    let end = start
        .checked_add_signed(Duration::days(i64::from(horizon_days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    let mut window: Vec<&Appointment> = list
        .into_iter()
        .filter(|appointment| appointment.scheduled_at >= start && appointment.scheduled_at <= end)
        .collect();
    window.sort_by_key(|appointment| appointment.scheduled_at);
    window
}

fn day_bounds<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let zone = now.timezone();
    let date = now.date_naive();

    let start = local_midnight(&zone, date).unwrap_or(DateTime::<Utc>::MIN_UTC);
    let end = date
        .succ_opt()
        .and_then(|tomorrow| local_midnight(&zone, tomorrow))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

fn local_midnight<Tz: TimeZone>(zone: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    zone.from_local_datetime(&midnight)
        .earliest()
        // Midnight skipped by a DST jump: the day starts when the clocks resume.
        .or_else(|| zone.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|local| local.with_timezone(&Utc))
}

/// Figures of the doctor dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentSummary {
    pub total: usize,
    pub booked: usize,
    pub completed: usize,
    pub cancelled: usize,
    pub today: usize,
    pub upcoming: usize,
}

pub fn summarize<Tz: TimeZone>(list: &[Appointment], now: &DateTime<Tz>, horizon_days: u32) -> AppointmentSummary {
    let count = |status: AppointmentStatus| list.iter().filter(|appointment| appointment.status == status).count();

    AppointmentSummary {
        total: list.len(),
        booked: count(AppointmentStatus::Booked),
        completed: count(AppointmentStatus::Completed),
        cancelled: count(AppointmentStatus::Cancelled),
        today: today(list, now).len(),
        upcoming: upcoming(list, now, horizon_days).len(),
    }
}

/// One display row of the appointment table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRow {
    pub id: AppointmentId,
    pub patient_name: String,
    pub reason: String,
    pub date_label: String,
    pub time_label: String,
    pub status: AppointmentStatus,
    pub affordance: Affordance,
    /// Untouched timestamp the labels were derived from
    pub scheduled_at: DateTime<Utc>,
}

/// Display rows in the given zone. Formatting never alters `scheduled_at`.
pub fn rows<'a, I, Tz>(list: I, zone: &Tz) -> Vec<AppointmentRow>
where
    I: IntoIterator<Item = &'a Appointment>,
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    list.into_iter()
        .map(|appointment| {
            let local = appointment.scheduled_at.with_timezone(zone);
            AppointmentRow {
                id: appointment.id.clone(),
                patient_name: appointment
                    .patient
                    .display_name()
                    .unwrap_or(UNKNOWN_PATIENT)
                    .to_string(),
                reason: appointment.reason.clone(),
                date_label: local.format("%a, %b %-d, %Y").to_string(),
                time_label: local.format("%-I:%M %p").to_string(),
                status: appointment.status,
                affordance: Affordance::for_status(appointment.status),
                scheduled_at: appointment.scheduled_at,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PartyProfile, PartyRef};
    use chrono::FixedOffset;

    fn at(rfc3339: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
    }

    fn appointment(patient: &str, reason: &str, scheduled_at: DateTime<Utc>, status: AppointmentStatus) -> Appointment {
        let mut appointment = Appointment::booked(
            PartyRef::Profile(PartyProfile {
                id: format!("id-{}", patient),
                name: patient.to_string(),
                email: None,
                phone: None,
            }),
            PartyRef::from_id("doc"),
            scheduled_at,
            Some(reason.to_string()),
        );
        appointment.status = status;
        appointment
    }

    fn three_statuses() -> Vec<Appointment> {
        vec![
            appointment("Ada", "Fever", at("2026-10-19T09:00:00Z"), AppointmentStatus::Booked),
            appointment("Ben", "Checkup", at("2026-10-18T09:00:00Z"), AppointmentStatus::Completed),
            appointment("Cleo", "Migraine", at("2026-10-17T09:00:00Z"), AppointmentStatus::Cancelled),
        ]
    }

    fn ids(list: &[&Appointment]) -> Vec<AppointmentId> {
        list.iter().map(|appointment| appointment.id.clone()).collect()
    }

    #[test]
    fn test_filter_all_is_identity() {
        let list = three_statuses();
        let all = filter_by_status(&list, StatusFilter::All);
        assert_eq!(all.len(), list.len());
        assert!(all.iter().zip(&list).all(|(projected, original)| *projected == original));
    }

    #[test]
    fn test_filter_by_status_exact_match() {
        let list = three_statuses();
        let booked = filter_by_status(&list, "booked".parse().unwrap());
        assert_eq!(booked.len(), 1);
        assert_eq!(booked[0].status, AppointmentStatus::Booked);
        assert!("pending".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn test_search_matches_name_or_reason_case_insensitively() {
        let list = three_statuses();
        assert_eq!(filter_by_search(&list, "ADA").len(), 1);
        assert_eq!(filter_by_search(&list, "migr").len(), 1);
        assert_eq!(filter_by_search(&list, "").len(), 3);
        assert!(filter_by_search(&list, "zzz").is_empty());
    }

    #[test]
    fn test_search_skips_unexpanded_patient_names() {
        let mut unexpanded = appointment("Dina", "Rash", at("2026-10-19T09:00:00Z"), AppointmentStatus::Booked);
        unexpanded.patient = PartyRef::from_id("p-dina");
        let list = vec![unexpanded];
        assert!(filter_by_search(&list, "dina").is_empty());
        assert_eq!(filter_by_search(&list, "rash").len(), 1);
    }

    #[test]
    fn test_sort_descending_is_stable() {
        let same = at("2026-10-19T09:00:00Z");
        let list = vec![
            appointment("First", "a", same, AppointmentStatus::Booked),
            appointment("Latest", "b", at("2026-10-20T09:00:00Z"), AppointmentStatus::Booked),
            appointment("Second", "c", same, AppointmentStatus::Booked),
        ];

        let sorted = sort_by_date_descending(&list);
        assert_eq!(ids(&sorted), vec![list[1].id.clone(), list[0].id.clone(), list[2].id.clone()]);
    }

    #[test]
    fn test_today_boundaries_in_local_zone() {
        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = zone.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap();
        // Local midnights of the 19th and 20th, expressed in UTC.
        let list = vec![
            appointment("Midnight", "a", at("2026-10-18T22:00:00Z"), AppointmentStatus::Booked),
            appointment("Tomorrow", "b", at("2026-10-19T22:00:00Z"), AppointmentStatus::Booked),
            appointment("Yesterday", "c", at("2026-10-18T21:59:59Z"), AppointmentStatus::Booked),
            appointment("Evening", "d", at("2026-10-19T21:59:59Z"), AppointmentStatus::Booked),
        ];

        let todays = today(&list, &now);
        assert_eq!(ids(&todays), vec![list[0].id.clone(), list[3].id.clone()]);
    }

    #[test]
    fn test_upcoming_window_sorted_ascending() {
        let now = at("2026-10-19T12:00:00Z");
        let list = vec![
            appointment("Far", "a", at("2026-10-26T12:00:00Z"), AppointmentStatus::Booked),
            appointment("Past", "b", at("2026-10-19T11:59:59Z"), AppointmentStatus::Booked),
            appointment("Near", "c", at("2026-10-19T13:00:00Z"), AppointmentStatus::Booked),
            appointment("Beyond", "d", at("2026-10-26T12:00:01Z"), AppointmentStatus::Booked),
            appointment("Now", "e", now, AppointmentStatus::Completed),
        ];

        let next = upcoming(&list, &now, DEFAULT_UPCOMING_HORIZON_DAYS);
        assert_eq!(ids(&next), vec![list[4].id.clone(), list[2].id.clone(), list[0].id.clone()]);
    }

    #[test]
    fn test_upcoming_with_huge_horizon_runs_to_end_of_time() {
        let now = at("2026-10-19T12:00:00Z");
        let list = vec![
            appointment("Decade", "a", at("2036-10-19T12:00:00Z"), AppointmentStatus::Booked),
            appointment("Past", "b", at("2026-10-18T12:00:00Z"), AppointmentStatus::Booked),
            appointment("Soon", "c", at("2026-10-20T12:00:00Z"), AppointmentStatus::Booked),
        ];

        let next = upcoming(&list, &now, u32::MAX);
        assert_eq!(ids(&next), vec![list[2].id.clone(), list[0].id.clone()]);
        assert_eq!(summarize(&list, &now, u32::MAX).upcoming, 2);
    }

    #[test]
    fn test_summary_counts() {
        let list = three_statuses();
        let now = at("2026-10-19T08:00:00Z");
        let summary = summarize(&list, &now, DEFAULT_UPCOMING_HORIZON_DAYS);
        assert_eq!(
            summary,
            AppointmentSummary {
                total: 3,
                booked: 1,
                completed: 1,
                cancelled: 1,
                today: 1,
                upcoming: 1,
            }
        );
    }

    #[test]
    fn test_rows_format_in_zone_without_touching_timestamp() {
        let scheduled = at("2026-10-19T07:05:00Z");
        let mut list = vec![appointment("Ada", "Fever", scheduled, AppointmentStatus::Booked)];
        list.push(appointment("Ben", "Checkup", scheduled, AppointmentStatus::Completed));
        list[1].patient = PartyRef::from_id("p-ben");

        let zone = FixedOffset::east_opt(2 * 3600).unwrap();
        let rendered = rows(&list, &zone);

        assert_eq!(rendered[0].date_label, "Mon, Oct 19, 2026");
        assert_eq!(rendered[0].time_label, "9:05 AM");
        assert_eq!(rendered[0].scheduled_at, scheduled);
        assert_eq!(rendered[0].affordance, Affordance::OpenCompletion);
        assert_eq!(rendered[1].patient_name, "Unknown patient");
        assert_eq!(rendered[1].affordance, Affordance::ViewDetails);
    }
}
