#![allow(clippy::unwrap_used, dead_code)]
// Shared fixtures for the hrsync-core integration tests.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hrsync_api::HrClient;
use hrsync_core::{Console, ConsoleConfig, MemorySink, NotificationEvent};

pub async fn setup() -> (MockServer, Console, Arc<MemorySink>) {
    setup_with(ConsoleConfig::default()).await
}

pub async fn setup_with(config: ConsoleConfig) -> (MockServer, Console, Arc<MemorySink>) {
    let server = MockServer::start().await;
    let client = HrClient::from_reqwest(&server.uri(), reqwest::Client::new())
        .unwrap()
        .with_health_timeout(Duration::from_secs(2));
    let sink = Arc::new(MemorySink::new());
    let console = Console::with_client(config, client, sink.clone());
    (server, console, sink)
}

pub async fn mount_health(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub async fn mount_list(server: &MockServer, resource: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/{resource}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

pub fn employee_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "uniqueId": format!("EMP-{id:04}"),
        "fullName": name,
        "gender": 1,
        "email": format!("emp{id}@corp.example"),
        "phoneNumber": "+33 1 23 45 67 89",
        "address": "12 avenue des Champs",
        "position": "Analyst",
        "salary": 42000,
        "departmentName": "Finance",
        "hireDate": "2020-02-03T00:00:00Z"
    })
}

pub fn department_json(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "createdAt": "2025-01-01T09:00:00Z",
        "updatedAt": "2025-01-01T09:00:00Z",
        "createdBy": "admin",
        "updatedBy": "admin",
        "name": name,
        "code": name.to_uppercase(),
        "description": ""
    })
}

pub fn attendance_json(id: i64, employee_id: i64) -> Value {
    json!({
        "id": id,
        "date": "2025-11-26T00:00:00Z",
        "clockIn": "08:30:00",
        "clockOut": "17:00:00",
        "breakDuration": "01:00:00",
        "workedHours": 7.5,
        "overtimeHours": 0,
        "notes": null,
        "employeeId": employee_id,
        "employeeName": "Jane Doe"
    })
}

pub fn unavailable_count(sink: &MemorySink) -> usize {
    sink.count(|e| matches!(e, NotificationEvent::CapabilityUnavailable { .. }))
}

pub fn restored_count(sink: &MemorySink) -> usize {
    sink.count(|e| matches!(e, NotificationEvent::CapabilityRestored { .. }))
}
