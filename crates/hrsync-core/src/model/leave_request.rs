// ── Leave request domain type ──
//
// Decoded and normalized like the mirrored kinds, but no remote store
// is kept for it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::common::{DateValue, Describe, Identified, Normalize};
use crate::decode::{FieldIssue, Issues, Schema};

macro_rules! coded_enum {
    ($(#[$meta:meta])* $name:ident : $what:literal { $($variant:ident = $code:literal => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(try_from = "u8", into = "u8")]
        pub enum $name {
            $($variant = $code),+
        }

        impl TryFrom<u8> for $name {
            type Error = String;

            fn try_from(code: u8) -> Result<Self, Self::Error> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    other => Err(format!(concat!("unknown ", $what, " code {}"), other)),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $code),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $(Self::$variant => $label),+
                })
            }
        }
    };
}

coded_enum! {
    /// Kind of leave requested.
    LeaveType: "leave type" {
        Annual = 1 => "annual",
        Sick = 2 => "sick",
        Maternity = 3 => "maternity",
        Paternity = 4 => "paternity",
        Personal = 5 => "personal",
        Unpaid = 6 => "unpaid",
    }
}

coded_enum! {
    /// Review state of a leave request.
    LeaveStatus: "leave status" {
        Pending = 1 => "pending",
        Approved = 2 => "approved",
        Rejected = 3 => "rejected",
        Cancelled = 4 => "cancelled",
    }
}

/// Minimal employee reference embedded in other records. Fields the
/// client does not model are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeReference {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EmployeeReference {
    fn issues(&self) -> Vec<FieldIssue> {
        let mut issues = Issues::default();
        if let Some(email) = &self.email {
            issues.email("email", email);
        }
        issues.finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LeaveRequest {
    pub id: i64,
    pub created_at: DateValue,
    pub updated_at: DateValue,
    pub created_by: String,
    pub updated_by: String,
    pub leave_type: LeaveType,
    pub status: LeaveStatus,
    pub start_date: DateValue,
    pub end_date: DateValue,
    pub days_requested: f64,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<DateValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee: Option<EmployeeReference>,
}

impl Schema for LeaveRequest {
    const NAME: &'static str = "LeaveRequest";

    fn issues(&self) -> Vec<FieldIssue> {
        let mut issues = Issues::default();
        if let Some(employee) = &self.employee {
            issues.nested("employee", employee.issues());
        }
        issues.finish()
    }
}

impl Identified for LeaveRequest {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Describe for LeaveRequest {
    fn describe(&self) -> String {
        format!(
            "{} leave {} to {}",
            self.leave_type,
            self.start_date.display_date(),
            self.end_date.display_date()
        )
    }
}

impl Normalize for LeaveRequest {
    fn normalize(self, now: DateTime<Utc>) -> Self {
        Self {
            created_at: self.created_at.normalize(now),
            updated_at: self.updated_at.normalize(now),
            start_date: self.start_date.normalize(now),
            end_date: self.end_date.normalize(now),
            reviewed_at: self.reviewed_at.map(|d| d.normalize(now)),
            reviewed_by: self.reviewed_by.map(|d| d.normalize(now)),
            ..self
        }
    }
}
