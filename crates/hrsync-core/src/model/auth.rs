// ── Authenticated user ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decode::{FieldIssue, Issues, Schema};

/// The account behind the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: Uuid,
    pub user_name: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub roles: Vec<String>,
    pub employee_id: Option<i64>,
}

impl AuthUser {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Schema for AuthUser {
    const NAME: &'static str = "AuthUser";

    fn issues(&self) -> Vec<FieldIssue> {
        Issues::default().email("email", &self.email).finish()
    }
}

/// Which authentication form is pending, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    Login,
    Signup,
}
