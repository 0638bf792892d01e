// ── Attendance queries ──
//
// Read-only lookups beside the mirrored collection. Results are decoded
// and normalized but never written to the mirror.

use chrono::NaiveDate;

use super::ResourceStore;
use super::resource::fetch_list;
use crate::error::CoreError;
use crate::model::{Attendance, EntityKind};

const DATE_FORMAT: &str = "%Y-%m-%d";

impl ResourceStore<Attendance> {
    /// `GET /attendances/employee/{id}`
    pub async fn by_employee(&self, employee_id: i64) -> Result<Vec<Attendance>, CoreError> {
        let path = format!("{}/employee/{employee_id}", EntityKind::Attendance.resource());
        self.query(&path, &[], "getByEmployee").await
    }

    /// `GET /attendances/employee/{id}/date/{YYYY-MM-DD}`
    pub async fn by_employee_and_date(
        &self,
        employee_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<Attendance>, CoreError> {
        let path = format!(
            "{}/employee/{employee_id}/date/{}",
            EntityKind::Attendance.resource(),
            date.format(DATE_FORMAT)
        );
        self.query(&path, &[], "getByEmployeeAndDate").await
    }

    /// `GET /attendances/date-range?startDate=&endDate=`
    pub async fn by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Attendance>, CoreError> {
        let path = format!("{}/date-range", EntityKind::Attendance.resource());
        let params = [
            ("startDate", start.format(DATE_FORMAT).to_string()),
            ("endDate", end.format(DATE_FORMAT).to_string()),
        ];
        self.query(&path, &params, "getByDateRange").await
    }

    async fn query(
        &self,
        path: &str,
        params: &[(&str, String)],
        operation: &str,
    ) -> Result<Vec<Attendance>, CoreError> {
        let client = self.current_client();
        let context = EntityKind::Attendance.api_context(operation);
        fetch_list::<Attendance>(&client, path, params, &context).await
    }
}
