// ── Attendance domain type ──
//
// Unlike employees and departments, attendance records tolerate (and
// drop) fields the client does not know about.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{DateValue, Describe, EntityRecord, Identified, Normalize};
use crate::decode::{FieldIssue, Issues, Payload, Schema, is_utc_datetime};

/// One attendance entry: a worked day for one employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i64,
    pub date: DateValue,
    /// `HH:MM:SS`
    pub clock_in: String,
    /// `HH:MM:SS`
    pub clock_out: String,
    /// `HH:MM:SS`
    pub break_duration: String,
    pub worked_hours: f64,
    pub overtime_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub employee_id: i64,
    pub employee_name: String,
}

impl Schema for Attendance {
    const NAME: &'static str = "Attendance";

    fn issues(&self) -> Vec<FieldIssue> {
        Issues::default()
            .check(
                !matches!(
                    self.date,
                    DateValue::EpochMillis(_) | DateValue::FractionalEpochMillis(_)
                ),
                "date",
                "expected a date string",
            )
            .time_of_day("clockIn", &self.clock_in)
            .time_of_day("clockOut", &self.clock_out)
            .time_of_day("breakDuration", &self.break_duration)
            .finish()
    }
}

impl Identified for Attendance {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Describe for Attendance {
    fn describe(&self) -> String {
        format!("{} on {}", self.employee_name, self.date.display_date())
    }
}

impl Normalize for Attendance {
    fn normalize(self, now: DateTime<Utc>) -> Self {
        Self {
            date: self.date.normalize(now),
            ..self
        }
    }
}

impl From<Attendance> for EntityRecord {
    fn from(attendance: Attendance) -> Self {
        Self::Attendance(attendance)
    }
}

// ── Payloads ─────────────────────────────────────────────────────────

/// Body of `POST /attendances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AttendanceCreate {
    /// ISO datetime in UTC, `Z`-suffixed.
    pub date: String,
    pub clock_in: String,
    pub clock_out: String,
    pub break_duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub employee_id: i64,
}

impl Payload for AttendanceCreate {
    const NAME: &'static str = "AttendanceCreate";

    fn issues(&self) -> Vec<FieldIssue> {
        Issues::default()
            .check(is_utc_datetime(&self.date), "date", "must be an ISO datetime in UTC")
            .time_of_day("clockIn", &self.clock_in)
            .time_of_day("clockOut", &self.clock_out)
            .time_of_day("breakDuration", &self.break_duration)
            .finish()
    }
}

/// Body of `PUT /attendances/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AttendanceUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_out: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i64>,
}

impl Payload for AttendanceUpdate {
    const NAME: &'static str = "AttendanceUpdate";

    fn issues(&self) -> Vec<FieldIssue> {
        let mut issues = Issues::default();
        if let Some(date) = &self.date {
            issues.check(is_utc_datetime(date), "date", "must be an ISO datetime in UTC");
        }
        for (path, value) in [
            ("clockIn", &self.clock_in),
            ("clockOut", &self.clock_out),
            ("breakDuration", &self.break_duration),
        ] {
            if let Some(value) = value {
                issues.time_of_day(path, value);
            }
        }
        issues.finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::decode::{decode, encode_payload};

    #[test]
    fn tolerates_unknown_fields() {
        let raw = json!({
            "id": 11,
            "date": "2025-11-26",
            "clockIn": "08:30:00",
            "clockOut": "17:00:00",
            "breakDuration": "01:00:00",
            "workedHours": 7.5,
            "overtimeHours": 0,
            "notes": null,
            "employeeId": 4,
            "employeeName": "Jane Doe",
            "isLate": false
        });
        let attendance: Attendance = decode(&raw, "AttendanceAPI.getById").unwrap();
        assert_eq!(attendance.notes, None);
        assert_eq!(attendance.describe(), "Jane Doe on 2025-11-26");
    }

    #[test]
    fn rejects_out_of_range_clock() {
        let raw = json!({
            "id": 11,
            "date": "2025-11-26",
            "clockIn": "25:00:00",
            "clockOut": "17:00:00",
            "breakDuration": "01:00:00",
            "workedHours": 7.5,
            "overtimeHours": 0,
            "employeeId": 4,
            "employeeName": "Jane Doe"
        });
        let failure = decode::<Attendance>(&raw, "ctx").unwrap_err();
        assert_eq!(failure.issues[0].path, "clockIn");
    }

    #[test]
    fn create_requires_utc_datetime() {
        let create = AttendanceCreate {
            date: "2025-11-26".into(),
            clock_in: "08:00:00".into(),
            clock_out: "16:00:00".into(),
            break_duration: "00:30:00".into(),
            notes: None,
            employee_id: 4,
        };
        let failure = encode_payload(&create, "Attendance.create.payload").unwrap_err();
        assert_eq!(failure.issues[0].path, "date");
    }

    #[test]
    fn partial_update_validates_present_fields_only() {
        let update = AttendanceUpdate {
            clock_out: Some("18:15:00".into()),
            ..AttendanceUpdate::default()
        };
        assert_eq!(
            encode_payload(&update, "Attendance.update.payload").unwrap(),
            json!({ "clockOut": "18:15:00" })
        );
    }
}
