use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, College, Event, Registration, Student};
use serde_json::Value;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

// --- health ---

#[tokio::test]
async fn health_reports_healthy() {
    let resp = app().oneshot(get("/health")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["message"], "API is running");
}

// --- lists ---

#[tokio::test]
async fn lists_start_empty() {
    for uri in ["/colleges", "/students", "/events", "/reports/top-students"] {
        let resp = app().oneshot(get(uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let items: Vec<Value> = body_json(resp).await;
        assert!(items.is_empty(), "{uri}");
    }
}

// --- lookups ---

#[tokio::test]
async fn missing_student_is_404_with_detail() {
    let resp = app().oneshot(get("/students/42")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Student not found");
}

#[tokio::test]
async fn non_numeric_id_is_400() {
    let resp = app().oneshot(get("/events/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn events_filter_with_unknown_college_is_rejected() {
    let resp = app().oneshot(get("/events?college_id=9")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "College not found");
}

// --- creates ---

#[tokio::test]
async fn student_needs_existing_college() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/students",
            r#"{"name":"Ada","email":"ada@x.io","college_id":3}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "College not found");
}

#[tokio::test]
async fn malformed_body_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/colleges", r#"{"title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn registration_for_unknown_student_is_rejected() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/registrations",
            r#"{"student_id":1,"event_id":2}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], br#"{"detail":"Student not found"}"#);
}

// --- full lifecycle ---

#[tokio::test]
async fn campus_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    macro_rules! send {
        ($req:expr) => {
            ServiceExt::ready(&mut app).await.unwrap().call($req).await.unwrap()
        };
    }

    // college
    let resp = send!(json_request(
        "POST",
        "/colleges",
        r#"{"name":"North Campus","location":"Oslo"}"#
    ));
    assert_eq!(resp.status(), StatusCode::OK);
    let college: College = body_json(resp).await;
    let cid = college.college_id;

    // student
    let resp = send!(json_request(
        "POST",
        "/students",
        &format!(r#"{{"name":"Ada","email":"ada@x.io","college_id":{cid}}}"#)
    ));
    assert_eq!(resp.status(), StatusCode::OK);
    let student: Student = body_json(resp).await;
    assert_eq!(student.college_id, cid);
    let sid = student.student_id;

    // duplicate email
    let resp = send!(json_request(
        "POST",
        "/students",
        &format!(r#"{{"name":"Ada 2","email":"ada@x.io","college_id":{cid}}}"#)
    ));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["detail"], "Email already registered");

    // event
    let resp = send!(json_request(
        "POST",
        "/events",
        &format!(
            r#"{{"name":"Rust Workshop","type":"Workshop","date":"2026-03-05T14:30:00",
                "capacity":10,"description":"","college_id":{cid},"created_by":"admin"}}"#
        )
    ));
    assert_eq!(resp.status(), StatusCode::OK);
    let event: Event = body_json(resp).await;
    assert_eq!(event.event_type, "Workshop");
    let eid = event.event_id;

    // filtered events
    let resp = send!(get(&format!("/events?college_id={cid}")));
    let events: Vec<Event> = body_json(resp).await;
    assert_eq!(events, vec![event.clone()]);

    // registration
    let resp = send!(json_request(
        "POST",
        "/registrations",
        &format!(r#"{{"student_id":{sid},"event_id":{eid}}}"#)
    ));
    assert_eq!(resp.status(), StatusCode::OK);
    let registration: Registration = body_json(resp).await;
    assert_eq!(registration.status, "Registered");
    let rid = registration.registration_id;

    // registrations joined with student and event
    let resp = send!(get(&format!("/registrations/event/{eid}")));
    let joined: Vec<Value> = body_json(resp).await;
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0]["student"]["email"], "ada@x.io");
    assert_eq!(joined[0]["event"]["type"], "Workshop");

    // attendance, then a duplicate
    let resp = send!(json_request(
        "POST",
        "/attendance",
        &format!(r#"{{"registration_id":{rid},"attended":1}}"#)
    ));
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send!(json_request(
        "POST",
        "/attendance",
        &format!(r#"{{"registration_id":{rid},"attended":0}}"#)
    ));
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send!(get(&format!("/attendance/event/{eid}")));
    let report: Value = body_json(resp).await;
    assert_eq!(report["summary"]["attendance_rate"], 100.0);
    assert_eq!(report["attendance_records"][0]["student_name"], "Ada");

    // feedback
    let resp = send!(json_request(
        "POST",
        "/feedback",
        &format!(r#"{{"registration_id":{rid},"rating":4,"comment":null}}"#)
    ));
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send!(get(&format!("/feedback/event/{eid}")));
    let feedback: Vec<Value> = body_json(resp).await;
    assert_eq!(feedback[0]["rating"], 4);
    assert_eq!(feedback[0]["registration"]["student"]["name"], "Ada");

    // reports
    let resp = send!(get("/reports/event-popularity"));
    let popularity: Vec<Value> = body_json(resp).await;
    assert_eq!(popularity[0]["registration_count"], 1);
    assert_eq!(popularity[0]["college_name"], "North Campus");

    let resp = send!(get("/reports/top-students"));
    let top: Vec<Value> = body_json(resp).await;
    assert_eq!(top[0]["events_attended"], 1);
    assert_eq!(top[0]["participation_rate"], 100.0);
}
