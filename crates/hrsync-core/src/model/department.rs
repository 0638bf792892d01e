// ── Department domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::common::{DateValue, Describe, EntityRecord, Identified, Normalize};
use crate::decode::{Payload, Schema};

/// A department as returned by `GET /departments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Department {
    pub id: i64,
    pub created_at: DateValue,
    pub updated_at: DateValue,
    pub created_by: String,
    pub updated_by: String,
    pub name: String,
    pub code: String,
    pub description: String,
}

impl Schema for Department {
    const NAME: &'static str = "Department";
}

impl Identified for Department {
    fn id(&self) -> i64 {
        self.id
    }
}

impl Describe for Department {
    fn describe(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }
}

impl Normalize for Department {
    fn normalize(self, now: DateTime<Utc>) -> Self {
        Self {
            created_at: self.created_at.normalize(now),
            updated_at: self.updated_at.normalize(now),
            ..self
        }
    }
}

impl From<Department> for EntityRecord {
    fn from(department: Department) -> Self {
        Self::Department(department)
    }
}

/// Body of `POST /departments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DepartmentCreate {
    pub name: String,
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Payload for DepartmentCreate {
    const NAME: &'static str = "DepartmentCreate";
}

/// Body of `PUT /departments/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DepartmentUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Payload for DepartmentUpdate {
    const NAME: &'static str = "DepartmentUpdate";
}
