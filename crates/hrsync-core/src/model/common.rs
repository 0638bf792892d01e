// ── Shared domain types ──

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use super::{Attendance, Department, Employee};

/// The entity kinds held in client-side mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum EntityKind {
    Employee,
    Department,
    Attendance,
    LeaveRequest,
}

impl EntityKind {
    /// Collection path segment on the HR service (`employees`, ...).
    pub fn resource(self) -> &'static str {
        match self {
            Self::Employee => "employees",
            Self::Department => "departments",
            Self::Attendance => "attendances",
            Self::LeaveRequest => "leave-requests",
        }
    }

    /// Path of a single record.
    pub fn item_path(self, id: i64) -> String {
        format!("{}/{id}", self.resource())
    }

    /// Schema name used in payload validation contexts (`Employee.create.payload`).
    pub fn schema_name(self) -> &'static str {
        match self {
            Self::Employee => "Employee",
            Self::Department => "Department",
            Self::Attendance => "Attendance",
            Self::LeaveRequest => "LeaveRequest",
        }
    }

    /// Context label for a remote call, e.g. `EmployeeAPI.getAll`.
    pub fn api_context(self, operation: &str) -> String {
        format!("{}API.{operation}", self.schema_name())
    }

    /// Lower-case singular noun for messages.
    pub fn noun(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Department => "department",
            Self::Attendance => "attendance record",
            Self::LeaveRequest => "leave request",
        }
    }

    /// Lower-case plural noun for messages.
    pub fn plural(self) -> &'static str {
        match self {
            Self::Employee => "employees",
            Self::Department => "departments",
            Self::Attendance => "attendance records",
            Self::LeaveRequest => "leave requests",
        }
    }

    /// The capability group whose reachability governs this kind.
    pub fn capability(self) -> Capability {
        match self {
            Self::Employee | Self::LeaveRequest => Capability::Employees,
            Self::Department => Capability::Departments,
            Self::Attendance => Capability::Attendances,
        }
    }
}

/// A backend subsystem tracked independently for reachability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    Employees,
    Departments,
    Attendances,
    FileTransfer,
}

impl Capability {
    /// Human-readable name for notifications.
    pub fn label(self) -> &'static str {
        match self {
            Self::Employees => "Employee records",
            Self::Departments => "Department records",
            Self::Attendances => "Attendance records",
            Self::FileTransfer => "File import/export",
        }
    }
}

/// A remote mutation performed by a resource store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }

    pub fn progressive(self) -> &'static str {
        match self {
            Self::Create => "Creating",
            Self::Update => "Updating",
            Self::Delete => "Deleting",
        }
    }
}

// ── DateValue ────────────────────────────────────────────────────────

/// A date-like field as it arrives from the service.
///
/// The wire may carry an RFC 3339 string, a bare date or datetime
/// without offset, or epoch milliseconds (integral or not). Normalization folds every
/// variant into [`DateValue::Instant`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Instant(DateTime<Utc>),
    EpochMillis(i64),
    /// Epoch milliseconds written as a float, e.g. `1.7e12`.
    FractionalEpochMillis(f64),
    Text(String),
}

impl DateValue {
    /// Interpret the value as a UTC instant, if it can be.
    pub fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Instant(at) => Some(*at),
            Self::EpochMillis(ms) => Utc.timestamp_millis_opt(*ms).single(),
            Self::FractionalEpochMillis(ms) => fractional_millis(*ms),
            Self::Text(raw) => parse_text(raw.trim()),
        }
    }

    /// Canonical form. Unparseable inputs become `now`.
    pub fn normalize(self, now: DateTime<Utc>) -> Self {
        if let Self::Instant(_) = self {
            return self;
        }
        Self::Instant(self.parse().unwrap_or_else(|| {
            debug!(value = ?self, "unparseable date, substituting current time");
            now
        }))
    }

    /// The instant, if already normalized.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Instant(at) => Some(*at),
            _ => None,
        }
    }

    /// `YYYY-MM-DD` when the value parses, the raw text otherwise.
    pub fn display_date(&self) -> String {
        match (self.parse(), self) {
            (Some(at), _) => at.format("%Y-%m-%d").to_string(),
            (None, Self::Text(raw)) => raw.clone(),
            (None, _) => String::new(),
        }
    }
}

impl From<DateTime<Utc>> for DateValue {
    fn from(at: DateTime<Utc>) -> Self {
        Self::Instant(at)
    }
}

/// Sub-millisecond precision is dropped.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::as_conversions
)]
fn fractional_millis(ms: f64) -> Option<DateTime<Utc>> {
    // i64::MIN as f64 is exact; i64::MAX as f64 rounds up, so exclude it.
    const MIN: f64 = i64::MIN as f64;
    const MAX: f64 = i64::MAX as f64;
    if !ms.is_finite() || ms < MIN || ms >= MAX {
        return None;
    }
    Utc.timestamp_millis_opt(ms.trunc() as i64).single()
}

fn parse_text(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ── Record traits ────────────────────────────────────────────────────

/// Records identified by an integer id, unique within a mirror.
pub trait Identified {
    fn id(&self) -> i64;
}

/// Short human-readable label for notifications.
pub trait Describe {
    fn describe(&self) -> String;
}

/// Coerce loosely-typed fields into their canonical in-memory form.
pub trait Normalize: Sized {
    fn normalize(self, now: DateTime<Utc>) -> Self;
}

/// A normalized record of any mirrored kind, carried by notifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EntityRecord {
    Employee(Employee),
    Department(Department),
    Attendance(Attendance),
}

impl EntityRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Employee(_) => EntityKind::Employee,
            Self::Department(_) => EntityKind::Department,
            Self::Attendance(_) => EntityKind::Attendance,
        }
    }

    pub fn id(&self) -> i64 {
        match self {
            Self::Employee(e) => e.id,
            Self::Department(d) => d.id,
            Self::Attendance(a) => a.id,
        }
    }
}

impl Describe for EntityRecord {
    fn describe(&self) -> String {
        match self {
            Self::Employee(e) => e.describe(),
            Self::Department(d) => d.describe(),
            Self::Attendance(a) => a.describe(),
        }
    }
}
