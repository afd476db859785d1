mod support;

use once_cell::sync::Lazy;
use reqwest::{header, Client, StatusCode};
use serde::Deserialize;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use support::{seed_students, MockGateway};
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Student {
    student_id: String,
    name: String,
    program: String,
    year_level: u8,
}

#[derive(Debug, Deserialize)]
struct Modal {
    open: bool,
    kind: Option<String>,
    step: Option<u8>,
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static CHILDREN: Lazy<Mutex<Vec<u32>>> = Lazy::new(|| Mutex::new(Vec::new()));

#[cfg(unix)]
mod cleanup {
    use std::sync::Once;

    static REGISTER: Once = Once::new();

    pub fn register(pid: u32) {
        super::CHILDREN.lock().unwrap().push(pid);
        REGISTER.call_once(|| unsafe {
            libc::atexit(on_exit);
        });
    }

    extern "C" fn on_exit() {
        if let Ok(pids) = super::CHILDREN.lock() {
            for pid in pids.iter() {
                unsafe {
                    libc::kill(*pid as i32, libc::SIGTERM);
                }
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/modal")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server(gateway: &MockGateway) -> TestServer {
    let port = pick_free_port();
    let child = Command::new(env!("CARGO_BIN_EXE_student_dashboard"))
        .env("PORT", port.to_string())
        .env("GATEWAY_URL", &gateway.base_url)
        .env("GATEWAY_SUFFIX", "")
        .env("DELETE_PASSWORD", "letmein")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn students(client: &Client, server: &TestServer) -> Vec<Student> {
    client
        .get(format!("{}/api/students", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn modal(client: &Client, server: &TestServer) -> Modal {
    client
        .get(format!("{}/api/modal", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn post_form(client: &Client, server: &TestServer, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
    client
        .post(format!("{}{path}", server.base_url))
        .form(form)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_dashboard_renders_initial_list() {
    let gateway = MockGateway::spawn(seed_students()).await;
    let server = spawn_server(&gateway).await;
    let client = Client::new();

    let page = client
        .get(format!("{}/", server.base_url))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Student Information System"));
    assert!(page.contains("Carmen"));
    assert!(page.contains("Program Distribution"));

    let listed = students(&client, &server).await;
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[1].student_id, "1002");
    assert_eq!(listed[1].program, "Medical");
    assert_eq!(listed[1].year_level, 2);
}

#[tokio::test]
async fn http_add_student_closes_modal() {
    let gateway = MockGateway::spawn(seed_students()).await;
    let server = spawn_server(&gateway).await;
    let client = Client::new();

    let response = post_form(&client, &server, "/modal/open", &[("kind", "add")]).await;
    assert!(response.status().is_success());
    let opened = modal(&client, &server).await;
    assert!(opened.open);
    assert_eq!(opened.kind.as_deref(), Some("add"));
    assert_eq!(opened.step, Some(1));

    let response = post_form(
        &client,
        &server,
        "/wizard/add",
        &[
            ("name", "Dana"),
            ("student_id", "2001"),
            ("program", "Architecture"),
            ("year_level", "3"),
            ("email_address", "dana@example.com"),
        ],
    )
    .await;
    assert!(response.status().is_success());
    let page = response.text().await.unwrap();
    assert!(page.contains("Student added successfully."));

    let closed = modal(&client, &server).await;
    assert!(!closed.open);
    assert_eq!(gateway.requests_to("add-student").len(), 1);
    assert!(gateway.students().iter().any(|s| s["student_id"] == "2001"));
}

#[tokio::test]
async fn http_search_by_name_replaces_list() {
    let gateway = MockGateway::spawn(seed_students()).await;
    let server = spawn_server(&gateway).await;
    let client = Client::new();

    assert_eq!(students(&client, &server).await.len(), 3);

    post_form(&client, &server, "/modal/open", &[("kind", "search")]).await;
    let response = post_form(
        &client,
        &server,
        "/wizard/search",
        &[("mode", "name"), ("name", "Alice")],
    )
    .await;
    assert!(response.status().is_success());

    let listed = students(&client, &server).await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Alice");
    assert!(!modal(&client, &server).await.open);
}

#[tokio::test]
async fn http_delete_walks_both_steps() {
    let gateway = MockGateway::spawn(seed_students()).await;
    let server = spawn_server(&gateway).await;
    let client = Client::new();

    post_form(&client, &server, "/modal/open", &[("kind", "delete")]).await;
    let page = post_form(&client, &server, "/wizard/delete/unlock", &[("password", "LetMeIn")])
        .await
        .text()
        .await
        .unwrap();
    assert!(page.contains("Incorrect password"));
    assert_eq!(modal(&client, &server).await.step, Some(1));

    post_form(&client, &server, "/wizard/delete/unlock", &[("password", "letmein")]).await;
    assert_eq!(modal(&client, &server).await.step, Some(2));

    post_form(&client, &server, "/wizard/delete", &[("student_id", "1003")]).await;
    assert!(!modal(&client, &server).await.open);
    assert_eq!(gateway.requests_to("delete-student").len(), 1);
    assert_eq!(gateway.students().len(), 2);
}

#[tokio::test]
async fn http_wizard_post_without_open_wizard_is_rejected() {
    let gateway = MockGateway::spawn(seed_students()).await;
    let server = spawn_server(&gateway).await;
    let client = Client::new();

    let response = post_form(&client, &server, "/wizard/delete", &[("student_id", "1001")]).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(gateway.requests_to("delete-student").is_empty());
}

#[tokio::test]
async fn http_row_download_returns_attachment() {
    let gateway = MockGateway::spawn(seed_students()).await;
    let server = spawn_server(&gateway).await;
    let client = Client::new();

    students(&client, &server).await;
    let response = client
        .post(format!("{}/rows/0/download", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert_eq!(
        disposition,
        "attachment; filename=\"Alice-info.pdf\"; filename*=UTF-8''Alice-info.pdf"
    );
    let body = response.bytes().await.unwrap();
    assert!(body.starts_with(b"%PDF"));
}

#[tokio::test]
async fn http_stats_counts_each_program() {
    let gateway = MockGateway::spawn(seed_students()).await;
    let server = spawn_server(&gateway).await;
    let client = Client::new();

    let stats: serde_json::Value = client
        .get(format!("{}/api/stats", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let programs = stats["programs"].as_array().unwrap();
    assert_eq!(programs.len(), 5);
    assert_eq!(programs[0]["name"], "Engineering");
    assert_eq!(programs[0]["value"], 2);
    let years = stats["year_levels"].as_array().unwrap();
    assert_eq!(years[3]["year"], "Year 4");
    assert_eq!(years[3]["count"], 1);
}
