#![allow(clippy::unwrap_used)]
// Resource store behaviour against a mock HR service.

mod common;

use std::time::Duration;

use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use hrsync_core::{
    AttendanceCreate, AttendanceUpdate, Availability, CoreError, DateValue, DepartmentCreate,
    EmployeeCreate, EmployeeUpdate, EntityKind, Gender, MutationKind, NotificationEvent,
};

use common::{
    attendance_json, department_json, employee_json, mount_health, mount_list, restored_count,
    setup, unavailable_count,
};

// ── Load ────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_load_populates_mirror() {
    let (server, console, sink) = setup().await;
    mount_health(&server, 200).await;
    mount_list(
        &server,
        "employees",
        json!([employee_json(1, "Ada Lovelace"), employee_json(2, "Alan Turing")]),
    )
    .await;

    let store = console.employees();
    assert!(store.load().await);
    assert_eq!(store.snapshot().len(), 2);
    assert_eq!(store.get(2).unwrap().full_name, "Alan Turing");
    assert!(store.is_available());
    assert!(!store.is_loading());
    // Unknown -> Available is silent.
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn test_load_empty_shapes() {
    let (server, console, sink) = setup().await;
    mount_health(&server, 200).await;
    mount_list(&server, "employees", json!([])).await;
    mount_list(&server, "departments", json!([null, null])).await;
    mount_list(&server, "attendances", json!([{}, null])).await;

    assert!(console.employees().load().await);
    assert!(console.departments().load().await);
    assert!(console.attendances().load().await);
    assert!(console.employees().snapshot().is_empty());
    assert!(console.departments().snapshot().is_empty());
    assert!(console.attendances().snapshot().is_empty());
    assert_eq!(sink.count(|e| matches!(e, NotificationEvent::SyncFailed { .. })), 0);
}

#[tokio::test]
async fn test_load_server_error_leaves_unpopulated_mirror_empty() {
    let (server, console, sink) = setup().await;
    mount_health(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/departments"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "db down" })))
        .mount(&server)
        .await;

    let store = console.departments();
    assert!(!store.load().await);
    assert!(store.snapshot().is_empty());
    // The re-probe still answers, so the capability stays available.
    assert_eq!(store.availability(), Availability::Available);
    assert_eq!(
        sink.events(),
        vec![NotificationEvent::SyncFailed {
            kind: EntityKind::Department,
            reason: "db down".into(),
        }]
    );
}

#[tokio::test]
async fn test_load_server_error_keeps_populated_mirror() {
    let (server, console, _sink) = setup().await;
    mount_health(&server, 200).await;
    mount_list(&server, "departments", json!([department_json(1, "Finance")])).await;

    let store = console.departments();
    assert!(store.load().await);

    server.reset().await;
    mount_health(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/departments"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    assert!(!store.load().await);
    assert_eq!(store.snapshot().len(), 1);
}

#[tokio::test]
async fn test_outage_clears_mirror_once() {
    let (server, console, sink) = setup().await;
    mount_health(&server, 200).await;
    mount_list(&server, "departments", json!([department_json(1, "Finance")])).await;

    let store = console.departments();
    assert!(store.load().await);
    assert_eq!(store.snapshot().len(), 1);

    server.reset().await;
    mount_health(&server, 503).await;
    Mock::given(method("GET"))
        .and(path("/departments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    assert!(!store.load().await);
    assert!(store.snapshot().is_empty());
    assert_eq!(store.availability(), Availability::Unavailable);

    assert!(!store.load().await);
    assert_eq!(unavailable_count(&sink), 1);
}

#[tokio::test]
async fn test_invalid_collection_is_a_sync_failure() {
    let (server, console, sink) = setup().await;
    mount_health(&server, 200).await;
    mount_list(
        &server,
        "employees",
        json!([employee_json(1, "Ada"), { "id": 2, "fullName": "partial" }]),
    )
    .await;

    let store = console.employees();
    assert!(!store.load().await);
    assert!(store.snapshot().is_empty());
    let failed = sink.events();
    assert_eq!(failed.len(), 1);
    assert!(matches!(&failed[0], NotificationEvent::SyncFailed { kind: EntityKind::Employee, .. }));
}

#[tokio::test]
async fn test_slower_older_load_does_not_overwrite_newer() {
    let (server, console, _sink) = setup().await;
    mount_health(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/departments"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([department_json(1, "Old")]))
                .set_delay(Duration::from_millis(400)),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_list(&server, "departments", json!([department_json(1, "New")])).await;

    let store = console.departments().clone();
    let first = tokio::spawn({
        let store = store.clone();
        async move { store.load().await }
    });

    // Wait until the first load's fetch is on the wire.
    loop {
        let requests = server.received_requests().await.unwrap();
        if requests.iter().any(|r| r.url.path() == "/departments") {
            break;
        }
        tokio::task::yield_now().await;
    }

    assert!(store.load().await);
    assert_eq!(store.get(1).unwrap().name, "New");

    assert!(first.await.unwrap());
    assert_eq!(store.get(1).unwrap().name, "New");
}

// ── Mutations ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_refreshes_mirror() {
    let (server, console, sink) = setup().await;
    mount_health(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/departments"))
        .respond_with(ResponseTemplate::new(201).set_body_json(department_json(5, "Legal")))
        .expect(1)
        .mount(&server)
        .await;
    mount_list(&server, "departments", json!([department_json(5, "Legal")])).await;

    let store = console.departments();
    let outcome = store
        .create(&DepartmentCreate {
            name: "Legal".into(),
            code: "LEGAL".into(),
            description: None,
        })
        .await
        .unwrap();

    assert!(store.is_available());
    assert!(outcome.refresh.await.unwrap());
    assert_eq!(*store.get(5).unwrap(), outcome.record);

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        NotificationEvent::MutationStarted {
            kind: EntityKind::Department,
            operation: MutationKind::Create,
        }
    );
    assert!(matches!(
        &events[1],
        NotificationEvent::MutationSucceeded { operation: MutationKind::Create, record }
            if record.id() == 5
    ));
    // The progress notification is dismissed before the outcome.
    assert_eq!(sink.notifications().len(), 3);
}

#[tokio::test]
async fn test_employee_create_mirrors_normalized_record() {
    let (server, console, _sink) = setup().await;
    mount_health(&server, 200).await;
    // The service answers with a bare hire date.
    let mut created = employee_json(3, "Grace Hopper");
    created["hireDate"] = json!("2024-05-01");
    Mock::given(method("POST"))
        .and(path("/employees"))
        .and(body_json(json!({
            "firstName": "Grace",
            "lastName": "Hopper",
            "gender": 2,
            "email": "grace@corp.example",
            "phoneNumber": "555-0199",
            "address": "1 Navy Yard",
            "position": "Rear Admiral",
            "salary": 99000.0,
            "departmentId": 1,
            "hireDate": "2024-05-01"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(created.clone()))
        .expect(1)
        .mount(&server)
        .await;
    mount_list(&server, "employees", json!([created])).await;

    let store = console.employees();
    let outcome = store
        .create(&EmployeeCreate {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            gender: Gender::Female,
            email: "grace@corp.example".into(),
            phone_number: "555-0199".into(),
            address: "1 Navy Yard".into(),
            position: "Rear Admiral".into(),
            salary: 99_000.0,
            department_id: 1,
            hire_date: DateValue::Text("2024-05-01".into()),
        })
        .await
        .unwrap();

    assert_eq!(
        outcome.record.hire_date,
        DateValue::Instant(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
    );
    assert!(outcome.refresh.await.unwrap());
    assert!(store.is_available());
    assert_eq!(*store.get(3).unwrap(), outcome.record);
}

#[tokio::test]
async fn test_employee_create_rejects_bad_hire_date() {
    let (server, console, _sink) = setup().await;
    mount_health(&server, 200).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = console
        .employees()
        .create(&EmployeeCreate {
            first_name: "Grace".into(),
            last_name: "Hopper".into(),
            gender: Gender::Female,
            email: "grace@corp.example".into(),
            phone_number: "555-0199".into(),
            address: "1 Navy Yard".into(),
            position: "Rear Admiral".into(),
            salary: 99_000.0,
            department_id: 1,
            hire_date: DateValue::Text("someday".into()),
        })
        .await
        .unwrap_err();

    match err {
        CoreError::Decode(failure) => {
            assert_eq!(failure.context, "Employee.create.payload");
            assert_eq!(failure.issues[0].path, "hireDate");
        }
        other => panic!("expected payload failure, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_employee_update_sends_only_changed_fields() {
    let (server, console, _sink) = setup().await;
    mount_health(&server, 200).await;
    let mut updated = employee_json(1, "Ada Lovelace");
    updated["position"] = json!("Lead Analyst");
    Mock::given(method("PUT"))
        .and(path("/employees/1"))
        .and(body_json(json!({ "position": "Lead Analyst" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(updated.clone()))
        .expect(1)
        .mount(&server)
        .await;
    mount_list(&server, "employees", json!([updated])).await;

    let store = console.employees();
    let outcome = store
        .update(
            1,
            &EmployeeUpdate {
                position: Some("Lead Analyst".into()),
                ..EmployeeUpdate::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.record.position, "Lead Analyst");
    assert!(outcome.refresh.await.unwrap());
    assert_eq!(*store.get(1).unwrap(), outcome.record);
}

#[tokio::test]
async fn test_attendance_create_mirrors_normalized_record() {
    let (server, console, _sink) = setup().await;
    mount_health(&server, 200).await;
    let mut created = attendance_json(9, 4);
    created["date"] = json!("2025-11-26");
    created["approvedBy"] = json!("manager");
    Mock::given(method("POST"))
        .and(path("/attendances"))
        .respond_with(ResponseTemplate::new(201).set_body_json(created.clone()))
        .expect(1)
        .mount(&server)
        .await;
    mount_list(&server, "attendances", json!([created])).await;

    let store = console.attendances();
    let outcome = store
        .create(&AttendanceCreate {
            date: "2025-11-26T00:00:00Z".into(),
            clock_in: "08:30:00".into(),
            clock_out: "17:00:00".into(),
            break_duration: "01:00:00".into(),
            notes: None,
            employee_id: 4,
        })
        .await
        .unwrap();

    assert_eq!(
        outcome.record.date,
        DateValue::Instant(Utc.with_ymd_and_hms(2025, 11, 26, 0, 0, 0).unwrap())
    );
    assert!(outcome.refresh.await.unwrap());
    assert!(store.is_available());
    assert_eq!(*store.get(9).unwrap(), outcome.record);
}

#[tokio::test]
async fn test_create_rejects_invalid_payload_without_request() {
    let (server, console, sink) = setup().await;
    mount_health(&server, 200).await;
    Mock::given(method("POST"))
        .and(path("/attendances"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let result = console
        .attendances()
        .create(&AttendanceCreate {
            date: "2025-11-26T00:00:00Z".into(),
            clock_in: "8h".into(),
            clock_out: "17:00:00".into(),
            break_duration: "01:00:00".into(),
            notes: None,
            employee_id: 4,
        })
        .await;

    match result {
        Err(CoreError::Decode(failure)) => {
            assert_eq!(failure.context, "Attendance.create.payload");
            assert_eq!(failure.issues[0].path, "clockIn");
        }
        other => panic!("expected payload failure, got: {other:?}"),
    }
    assert_eq!(
        sink.count(|e| matches!(e, NotificationEvent::MutationFailed { .. })),
        1
    );
}

#[tokio::test]
async fn test_failed_mutation_reprobes_and_clears_on_outage() {
    let (server, console, sink) = setup().await;
    mount_health(&server, 200).await;
    mount_list(&server, "departments", json!([department_json(1, "Finance")])).await;

    let store = console.departments();
    assert!(store.load().await);

    server.reset().await;
    mount_health(&server, 503).await;
    Mock::given(method("POST"))
        .and(path("/departments"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = store
        .create(&DepartmentCreate {
            name: "Legal".into(),
            code: "LEGAL".into(),
            description: Some("contracts".into()),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert!(store.snapshot().is_empty());
    assert_eq!(store.availability(), Availability::Unavailable);

    let events = sink.events();
    assert!(matches!(events[1], NotificationEvent::MutationFailed { .. }));
    assert!(matches!(events[2], NotificationEvent::CapabilityUnavailable { .. }));
    assert_eq!(events.len(), 3);
}

#[tokio::test]
async fn test_failed_mutation_after_recovery_reloads() {
    let (server, console, sink) = setup().await;
    mount_health(&server, 503).await;

    let store = console.departments();
    assert!(!store.load().await);
    assert_eq!(store.availability(), Availability::Unavailable);

    server.reset().await;
    mount_health(&server, 200).await;
    mount_list(&server, "departments", json!([department_json(1, "Finance")])).await;
    Mock::given(method("POST"))
        .and(path("/departments"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut mirror = store.subscribe();
    store
        .create(&DepartmentCreate {
            name: "Legal".into(),
            code: "LEGAL".into(),
            description: None,
        })
        .await
        .unwrap_err();
    assert_eq!(restored_count(&sink), 1);

    let snapshot = tokio::time::timeout(Duration::from_secs(5), mirror.wait_for(|s| !s.is_empty()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(snapshot[0].name, "Finance");
    assert!(store.is_available());
}

#[tokio::test]
async fn test_update_confirmation_string_falls_back_to_get_by_id() {
    let (server, console, _sink) = setup().await;
    mount_health(&server, 200).await;
    Mock::given(method("PUT"))
        .and(path("/attendances/9"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/attendances/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(attendance_json(9, 4)))
        .expect(1)
        .mount(&server)
        .await;
    mount_list(&server, "attendances", json!([attendance_json(9, 4)])).await;

    let store = console.attendances();
    let outcome = store
        .update(
            9,
            &AttendanceUpdate {
                notes: Some("left early".into()),
                ..AttendanceUpdate::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.record.id, 9);
    assert_eq!(outcome.record.clock_in, "08:30:00");
    assert!(outcome.refresh.await.unwrap());
    assert_eq!(*store.get(9).unwrap(), outcome.record);
}

#[tokio::test]
async fn test_update_empty_body_falls_back_to_get_by_id() {
    let (server, console, _sink) = setup().await;
    mount_health(&server, 200).await;
    Mock::given(method("PUT"))
        .and(path("/attendances/9"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/attendances/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(attendance_json(9, 4)))
        .expect(1)
        .mount(&server)
        .await;
    mount_list(&server, "attendances", json!([])).await;

    let outcome = console
        .attendances()
        .update(9, &AttendanceUpdate::default())
        .await
        .unwrap();
    assert_eq!(outcome.record.employee_id, 4);
}

#[tokio::test]
async fn test_update_wrong_shape_is_decode_failure() {
    let (server, console, sink) = setup().await;
    mount_health(&server, 200).await;
    Mock::given(method("PUT"))
        .and(path("/attendances/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "foo": 1 })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/attendances/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(attendance_json(9, 4)))
        .expect(0)
        .mount(&server)
        .await;

    let result = console
        .attendances()
        .update(9, &AttendanceUpdate::default())
        .await;

    match result {
        Err(CoreError::Decode(failure)) => {
            assert_eq!(failure.context, "AttendanceAPI.update.response");
            assert_eq!(failure.payload, json!({ "foo": 1 }));
        }
        other => panic!("expected DecodeFailure, got: {other:?}"),
    }
    assert_eq!(
        sink.count(|e| matches!(
            e,
            NotificationEvent::MutationFailed { operation: MutationKind::Update, .. }
        )),
        1
    );
}

#[tokio::test]
async fn test_delete_unknown_id_is_silent_noop() {
    let (server, console, sink) = setup().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = console.employees().delete(42).await.unwrap();
    assert!(outcome.is_none());
    assert!(sink.notifications().is_empty());
}

#[tokio::test]
async fn test_delete_known_record() {
    let (server, console, sink) = setup().await;
    mount_health(&server, 200).await;
    Mock::given(method("GET"))
        .and(path("/employees"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([employee_json(3, "Grace Hopper")])))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_list(&server, "employees", json!([])).await;
    Mock::given(method("DELETE"))
        .and(path("/employees/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let store = console.employees();
    assert!(store.load().await);

    let outcome = store.delete(3).await.unwrap().unwrap();
    assert_eq!(outcome.record.full_name, "Grace Hopper");
    assert!(outcome.refresh.await.unwrap());
    assert!(store.snapshot().is_empty());

    let succeeded = sink.events().pop().unwrap();
    assert_eq!(succeeded.to_string(), "Employee \"Grace Hopper\" deleted");
}

// ── Availability notifications ──────────────────────────────────────

#[tokio::test]
async fn test_one_notification_per_transition() {
    let (server, console, sink) = setup().await;
    let store = console.employees();

    mount_health(&server, 503).await;
    for _ in 0..3 {
        store.reprobe().await;
    }
    assert_eq!(unavailable_count(&sink), 1);

    server.reset().await;
    mount_health(&server, 200).await;
    for _ in 0..3 {
        store.reprobe().await;
    }
    assert_eq!(restored_count(&sink), 1);
    assert_eq!(unavailable_count(&sink), 1);
}

// ── Attendance queries ──────────────────────────────────────────────

#[tokio::test]
async fn test_attendance_queries_bypass_mirror() {
    let (server, console, _sink) = setup().await;
    Mock::given(method("GET"))
        .and(path("/attendances/date-range"))
        .and(query_param("startDate", "2025-11-26"))
        .and(query_param("endDate", "2025-11-27"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([attendance_json(1, 4), attendance_json(2, 5)])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/attendances/employee/4/date/2025-11-26"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([attendance_json(1, 4)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/attendances/employee/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([attendance_json(1, 4)])))
        .expect(1)
        .mount(&server)
        .await;

    let store = console.attendances();
    let day = NaiveDate::from_ymd_opt(2025, 11, 26).unwrap();
    let next = NaiveDate::from_ymd_opt(2025, 11, 27).unwrap();

    assert_eq!(store.by_date_range(day, next).await.unwrap().len(), 2);
    assert_eq!(store.by_employee_and_date(4, day).await.unwrap().len(), 1);
    let mine = store.by_employee(4).await.unwrap();
    assert!(mine[0].date.instant().is_some());
    assert!(store.snapshot().is_empty());
}

#[tokio::test]
async fn test_get_by_id_not_found() {
    let (server, console, _sink) = setup().await;
    Mock::given(method("GET"))
        .and(path("/departments/77"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = console.departments().get_by_id(77).await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::NotFound { kind: EntityKind::Department, id: 77 }
    ));
}
