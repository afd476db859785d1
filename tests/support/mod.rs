//! In-process stand-in for the record gateway. Keeps students in memory and
//! records every request it receives.
#![allow(dead_code)]

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::TcpListener as StdTcpListener;
use std::sync::{Arc, Mutex};
use student_dashboard::Gateway;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub endpoint: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

#[derive(Default)]
struct Inner {
    students: Vec<Value>,
    requests: Vec<RecordedRequest>,
    /// view-student queries carrying any of these pairs get a non-JSON 500.
    failing_views: Vec<(String, String)>,
}

#[derive(Clone)]
pub struct MockGateway {
    pub base_url: String,
    inner: Arc<Mutex<Inner>>,
}

pub fn student(id: &str, name: &str, program: &str, year_level: &str) -> Value {
    json!({
        "student_id": id,
        "name": name,
        "program": program,
        "year_level": year_level,
        "email_address": format!("{}@example.com", name.to_lowercase()),
    })
}

pub fn seed_students() -> Vec<Value> {
    vec![
        student("1001", "Alice", "Engineering", "1"),
        student("1002", "Bruno", "Medical", "2"),
        student("1003", "Carmen", "Engineering", "4"),
    ]
}

impl MockGateway {
    pub async fn spawn(students: Vec<Value>) -> Self {
        let inner = Arc::new(Mutex::new(Inner {
            students,
            ..Inner::default()
        }));
        let app = Router::new()
            .route("/add-student", post(add_student))
            .route("/search-student", get(search_student))
            .route("/edit-student", post(edit_student))
            .route("/delete-student", post(delete_student))
            .route("/view-student", get(view_student))
            .route("/pdf-generation", post(pdf_generation))
            .with_state(Arc::clone(&inner));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock gateway");
        let addr = listener.local_addr().expect("mock gateway addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock gateway crashed");
        });

        Self {
            base_url: format!("http://{addr}"),
            inner,
        }
    }

    pub fn gateway(&self) -> Gateway {
        Gateway::new(&self.base_url, "")
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }

    pub fn requests_to(&self, endpoint: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|request| request.endpoint == endpoint)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.inner.lock().unwrap().requests.clear();
    }

    pub fn students(&self) -> Vec<Value> {
        self.inner.lock().unwrap().students.clone()
    }

    /// Drops a record behind the dashboard's back, as another operator would.
    pub fn remove_student(&self, id: &str) {
        self.inner
            .lock()
            .unwrap()
            .students
            .retain(|s| field(s, "student_id") != id);
    }

    pub fn fail_view_when(&self, key: &str, value: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_views
            .push((key.to_string(), value.to_string()));
    }
}

/// A gateway address with nothing listening behind it.
pub fn unreachable_gateway() -> Gateway {
    let listener = StdTcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    Gateway::new(format!("http://127.0.0.1:{port}"), "")
}

type Shared = State<Arc<Mutex<Inner>>>;

fn record(inner: &Mutex<Inner>, endpoint: &str, query: Vec<(String, String)>, body: Option<Value>) {
    inner.lock().unwrap().requests.push(RecordedRequest {
        endpoint: endpoint.to_string(),
        query,
        body,
    });
}

fn field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or("")
}

// year_level goes out as a number; stored the way a PHP backend returns it.
fn text(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

async fn add_student(State(inner): Shared, Json(body): Json<Value>) -> Json<Value> {
    record(&inner, "add-student", Vec::new(), Some(body.clone()));

    let mut errors = Vec::new();
    if field(&body, "name").len() < 2 {
        errors.push("Name must be at least 2 characters.");
    }
    if !field(&body, "email_address").contains('@') {
        errors.push("Invalid email address.");
    }
    if !errors.is_empty() {
        return Json(json!({ "status": "error", "errors": errors }));
    }

    let mut inner = inner.lock().unwrap();
    let id = field(&body, "student_id").to_string();
    if inner.students.iter().any(|s| field(s, "student_id") == id) {
        return Json(json!({ "status": "error", "message": "Student ID already exists." }));
    }
    inner.students.push(json!({
        "student_id": id,
        "name": field(&body, "name"),
        "program": field(&body, "program"),
        "year_level": text(&body, "year_level"),
        "email_address": field(&body, "email_address"),
    }));
    Json(json!({ "status": "success" }))
}

async fn search_student(
    State(inner): Shared,
    Query(query): Query<Vec<(String, String)>>,
) -> Json<Value> {
    record(&inner, "search-student", query.clone(), None);
    let students = inner.lock().unwrap().students.clone();

    let lookup = |key: &str| {
        query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.clone())
    };

    // LIKE 'id%' on the backend.
    if let Some(id) = lookup("student_id") {
        let found: Vec<Value> = students
            .into_iter()
            .filter(|s| field(s, "student_id").starts_with(id.as_str()))
            .collect();
        return Json(json!({ "status": "success", "students": found }));
    }
    if let Some(name) = lookup("name") {
        let needle = name.to_lowercase();
        let found: Vec<Value> = students
            .into_iter()
            .filter(|s| field(s, "name").to_lowercase().contains(&needle))
            .collect();
        if found.is_empty() {
            return Json(json!({ "status": "error", "message": "No student matches that name." }));
        }
        return Json(json!({ "status": "success", "students": found }));
    }
    Json(json!({ "status": "error", "message": "Missing search parameter." }))
}

async fn edit_student(State(inner): Shared, Json(body): Json<Value>) -> Json<Value> {
    record(&inner, "edit-student", Vec::new(), Some(body.clone()));
    let mut inner = inner.lock().unwrap();
    let id = field(&body, "student_id").to_string();
    match inner
        .students
        .iter_mut()
        .find(|s| field(s, "student_id") == id)
    {
        Some(existing) => {
            *existing = json!({
                "student_id": id,
                "name": field(&body, "name"),
                "program": field(&body, "program"),
                "year_level": text(&body, "year_level"),
                "email_address": field(&body, "email_address"),
            });
            Json(json!({ "status": "success", "message": "Student updated." }))
        }
        None => Json(json!({ "status": "error", "message": "Student not found." })),
    }
}

async fn delete_student(State(inner): Shared, Json(body): Json<Value>) -> Json<Value> {
    record(&inner, "delete-student", Vec::new(), Some(body.clone()));
    let mut inner = inner.lock().unwrap();
    let id = field(&body, "student_id").to_string();
    let before = inner.students.len();
    inner.students.retain(|s| field(s, "student_id") != id);
    if inner.students.len() == before {
        Json(json!({ "status": "error", "message": "No student with that ID." }))
    } else {
        Json(json!({ "status": "success" }))
    }
}

async fn view_student(
    State(inner): Shared,
    Query(query): Query<Vec<(String, String)>>,
) -> Response {
    record(&inner, "view-student", query.clone(), None);
    let fails = inner
        .lock()
        .unwrap()
        .failing_views
        .iter()
        .any(|pair| query.contains(pair));
    if fails {
        return (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response();
    }
    let students: Vec<Value> = inner
        .lock()
        .unwrap()
        .students
        .iter()
        .filter(|s| {
            query.iter().all(|(key, value)| match key.as_str() {
                "program" => field(s, "program") == value,
                "year_level" => text(s, "year_level") == *value,
                _ => true,
            })
        })
        .cloned()
        .collect();
    Json(json!({ "status": "success", "students": students })).into_response()
}

async fn pdf_generation(State(inner): Shared, Json(body): Json<Value>) -> Response {
    record(&inner, "pdf-generation", Vec::new(), Some(body.clone()));
    let name = field(&body, "name");
    if name == "Broken" {
        return (StatusCode::INTERNAL_SERVER_ERROR, "renderer failed").into_response();
    }
    (
        [("content-type", "application/pdf")],
        format!("%PDF-1.4 mock document for {name}").into_bytes(),
    )
        .into_response()
}
