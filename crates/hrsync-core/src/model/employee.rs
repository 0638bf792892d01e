// ── Employee domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{DateValue, Describe, EntityRecord, Identified, Normalize};
use crate::decode::{FieldIssue, Issues, Payload, Schema};

/// Gender codes used by the HR service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Gender {
    Male = 1,
    Female = 2,
}

impl TryFrom<u8> for Gender {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Male),
            2 => Ok(Self::Female),
            other => Err(format!("unknown gender code {other}")),
        }
    }
}

impl From<Gender> for u8 {
    fn from(gender: Gender) -> Self {
        match gender {
            Gender::Male => 1,
            Gender::Female => 2,
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Male => "male",
            Self::Female => "female",
        })
    }
}

/// An employee as returned by `GET /employees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Employee {
    pub id: i64,
    pub unique_id: String,
    pub full_name: String,
    pub gender: Gender,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub position: String,
    pub salary: f64,
    pub department_name: String,
    pub hire_date: DateValue,
}

impl Schema for Employee {
    const NAME: &'static str = "Employee";

    fn issues(&self) -> Vec<FieldIssue> {
        Issues::default().email("email", &self.email).finish()
    }
}

impl Identified for Employee {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Describe for Employee {
    fn describe(&self) -> String {
        self.full_name.clone()
    }
}

impl Normalize for Employee {
    fn normalize(self, now: DateTime<Utc>) -> Self {
        Self {
            hire_date: self.hire_date.normalize(now),
            ..self
        }
    }
}

impl From<Employee> for EntityRecord {
    fn from(employee: Employee) -> Self {
        Self::Employee(employee)
    }
}

// ── Payloads ─────────────────────────────────────────────────────────

/// Body of `POST /employees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EmployeeCreate {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub email: String,
    pub phone_number: String,
    pub address: String,
    pub position: String,
    pub salary: f64,
    pub department_id: i64,
    pub hire_date: DateValue,
}

impl Payload for EmployeeCreate {
    const NAME: &'static str = "EmployeeCreate";

    fn issues(&self) -> Vec<FieldIssue> {
        Issues::default()
            .email("email", &self.email)
            .check(self.hire_date.parse().is_some(), "hireDate", "invalid date")
            .finish()
    }
}

/// Body of `PUT /employees/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EmployeeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hire_date: Option<DateValue>,
}

impl Payload for EmployeeUpdate {
    const NAME: &'static str = "EmployeeUpdate";

    fn issues(&self) -> Vec<FieldIssue> {
        let mut issues = Issues::default();
        if let Some(email) = &self.email {
            issues.email("email", email);
        }
        if let Some(date) = &self.hire_date {
            issues.check(date.parse().is_some(), "hireDate", "invalid date");
        }
        issues.finish()
    }
}
