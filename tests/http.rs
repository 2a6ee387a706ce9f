use once_cell::sync::Lazy;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

const PASSWORD: &str = "test-secret";

struct TestServer {
    base_url: String,
    data_dir: PathBuf,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
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

fn unique_data_dir() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("portfolio_api_http_{}_{}", std::process::id(), nanos));
    path
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/projects")).send().await {
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

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let data_dir = unique_data_dir();
    let child = Command::new(env!("CARGO_BIN_EXE_portfolio-api"))
        .env("PORT", port.to_string())
        .env("DATA_DIR", &data_dir)
        .env("DASHBOARD_PASSWORD", PASSWORD)
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer {
        base_url,
        data_dir,
        child,
    }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn get_json(client: &Client, url: String) -> Value {
    client
        .get(url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_fresh_server_serves_defaults() {
    let server = spawn_server().await;
    let client = Client::new();

    let projects = get_json(&client, format!("{}/api/projects", server.base_url)).await;
    assert_eq!(projects["success"], json!(true));
    assert_eq!(projects["projects"], json!([]));

    let analytics = get_json(&client, format!("{}/api/analytics", server.base_url)).await;
    assert_eq!(analytics["success"], json!(true));
    assert_eq!(analytics["analytics"]["visitors"]["total"], json!(0));
    assert_eq!(analytics["analytics"]["visitors"]["daily"], json!([]));
    assert_eq!(analytics["analytics"]["devices"]["desktop"], json!(0));
    assert_eq!(analytics["analytics"]["pageViews"], json!({}));

    let fallback = client
        .get(format!("{}/data/projects.json", server.base_url))
        .send()
        .await
        .unwrap();
    assert!(fallback.status().is_success());
    assert_eq!(fallback.text().await.unwrap(), "[]");
}

#[tokio::test]
async fn http_projects_round_trip() {
    let server = spawn_server().await;
    let client = Client::new();

    let list = json!([{
        "id": "a",
        "title": "X",
        "tags": ["a"],
        "imgSrc": "i1",
        "images": ["i1"]
    }]);

    let response = client
        .post(format!("{}/api/projects", server.base_url))
        .json(&json!({ "projects": list, "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["count"], json!(1));
    assert_eq!(body["url"], json!("/data/projects.json"));

    let fetched = get_json(&client, format!("{}/api/projects", server.base_url)).await;
    assert_eq!(fetched["projects"], list);
    assert_eq!(fetched["projects"][0]["id"], json!("a"));
}

#[tokio::test]
async fn http_wrong_password_never_mutates() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = get_json(&client, format!("{}/api/projects", server.base_url)).await;

    let response = client
        .post(format!("{}/api/projects", server.base_url))
        .json(&json!({ "projects": [{"id": "intruder"}], "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 401);

    let after = get_json(&client, format!("{}/api/projects", server.base_url)).await;
    assert_eq!(after["projects"], before["projects"]);
}

#[tokio::test]
async fn http_non_array_projects_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = get_json(&client, format!("{}/api/projects", server.base_url)).await;

    let response = client
        .post(format!("{}/api/projects", server.base_url))
        .json(&json!({ "projects": "not-an-array", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);

    let after = get_json(&client, format!("{}/api/projects", server.base_url)).await;
    assert_eq!(after["projects"], before["projects"]);
}

#[tokio::test]
async fn http_page_view_accumulates() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    for _ in 0..3 {
        let response = client
            .post(format!("{}/api/analytics", server.base_url))
            .json(&json!({ "event": "pageView", "data": { "page": "/about" } }))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let analytics = get_json(&client, format!("{}/api/analytics", server.base_url)).await;
    assert_eq!(analytics["analytics"]["pageViews"]["/about"], json!(3));
}

#[tokio::test]
async fn http_same_day_visitors_share_one_entry() {
    let server = spawn_server().await;
    let client = Client::new();

    for _ in 0..2 {
        let response = client
            .post(format!("{}/api/analytics", server.base_url))
            .json(
                &json!({ "event": "visitor", "data": { "device": "mobile", "browser": "Chrome" } }),
            )
            .send()
            .await
            .unwrap();
        assert!(response.status().is_success());
    }

    let analytics = get_json(&client, format!("{}/api/analytics", server.base_url)).await;
    let visitors = &analytics["analytics"]["visitors"];
    assert_eq!(visitors["total"], json!(2));
    assert_eq!(visitors["daily"].as_array().unwrap().len(), 1);
    assert_eq!(visitors["daily"][0]["count"], json!(2));

    let devices = &analytics["analytics"]["devices"];
    assert_eq!(devices["mobile"], json!(2));
    assert_eq!(devices["desktop"], json!(0));
    assert_eq!(devices["tablet"], json!(0));
    assert_eq!(analytics["analytics"]["browsers"]["Chrome"], json!(2));
}

#[tokio::test]
async fn http_missing_event_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/analytics", server.base_url))
        .json(&json!({ "data": { "page": "/" } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn http_unknown_event_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/analytics", server.base_url))
        .json(&json!({ "event": "download", "data": {} }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn http_php_compat_round_trip_with_backup() {
    let server = spawn_server().await;
    let client = Client::new();

    let first = client
        .post(format!("{}/api/update-projects.php", server.base_url))
        .json(&json!({ "projects": [{"id": "one"}], "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert!(first.status().is_success());
    let body: Value = first.json().await.unwrap();
    assert_eq!(body["count"], json!(1));
    assert!(body["timestamp"].as_str().is_some());

    let second = client
        .post(format!("{}/api/update-projects.php", server.base_url))
        .json(&json!({ "projects": [{"id": "two"}], "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert!(second.status().is_success());

    let fetched = get_json(&client, format!("{}/api/projects", server.base_url)).await;
    assert_eq!(fetched["projects"][0]["id"], json!("two"));

    let backups = std::fs::read_dir(&server.data_dir)
        .unwrap()
        .filter(|entry| {
            let name = entry.as_ref().unwrap().file_name();
            let name = name.to_string_lossy().to_string();
            name.starts_with("projects-backup-") && name.ends_with(".json")
        })
        .count();
    assert_eq!(backups, 1);
}

#[tokio::test]
async fn http_php_compat_requires_both_fields() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/update-projects.php", server.base_url))
        .json(&json!({ "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn http_options_preflight_is_open() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .request(Method::OPTIONS, format!("{}/api/projects", server.base_url))
        .header("Origin", "https://elsewhere.example")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert!(response.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn http_startup_fails_without_password() {
    let port = pick_free_port();
    let mut child = Command::new(env!("CARGO_BIN_EXE_portfolio-api"))
        .env("PORT", port.to_string())
        .env("DATA_DIR", unique_data_dir())
        .env_remove("DASHBOARD_PASSWORD")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn server");

    let deadline = Instant::now() + Duration::from_secs(3);
    loop {
        if let Some(status) = child.try_wait().unwrap() {
            assert!(!status.success());
            return;
        }
        if Instant::now() > deadline {
            let _ = child.kill();
            panic!("server started despite missing DASHBOARD_PASSWORD");
        }
        sleep(Duration::from_millis(50)).await;
    }
}
