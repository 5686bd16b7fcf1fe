use std::path::PathBuf;
use std::sync::Arc;

use expense_tracker::config::Config;
use expense_tracker::persistence::TransactionStore;
use expense_tracker::server::state::AppState;
use expense_tracker::server;
use tempfile::TempDir;

/// Spin up the app on an ephemeral port with a scratch database
async fn spawn_app() -> (String, TempDir) {
    let dir = TempDir::new().unwrap();

    let mut config = Config::default();
    config.parser.default_year = Some(2024);
    config.database.path = Some(dir.path().join("expense.db"));
    config.server.static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static");

    let store = TransactionStore::open(config.database.path.clone().unwrap())
        .await
        .unwrap();
    let state = Arc::new(AppState::new(config, store));
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), dir)
}

#[tokio::test]
async fn health_check_reports_ok() {
    let (base, _dir) = spawn_app().await;

    let body: serde_json::Value = reqwest::get(format!("{}/api/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn seed_then_daily_page_lists_transactions() {
    let (base, _dir) = spawn_app().await;
    let client = reqwest::Client::new();

    let seeded: serde_json::Value = client
        .get(format!("{}/seed", base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(seeded["ok"], true);
    assert_eq!(seeded["added"], 5);

    let page = client
        .get(format!("{}/?date=2024-10-07", base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("CU당산점"));
    assert!(page.contains("카카오T 서울택시"));
    assert!(!page.contains("STARBUCKS"));

    let other_day = client
        .get(format!("{}/?date=2024-10-05", base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(other_day.contains("STARBUCKS 영등포"));
}

#[tokio::test]
async fn ingest_json_returns_the_parsed_entry() {
    let (base, _dir) = spawn_app().await;
    let client = reqwest::Client::new();

    let body: serde_json::Value = client
        .post(format!("{}/ingest-json", base))
        .json(&serde_json::json!({
            "raw_text": "[현대카드] 10/07 13:45 12,300원 일시불 CU당산점 승인"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["ok"], true);
    assert_eq!(body["entry"]["amount"], 12300);
    assert_eq!(body["entry"]["merchant"], "CU당산점");
    assert_eq!(body["entry"]["type"], "승인");
    assert_eq!(body["entry"]["category"], "편의점");
    assert_eq!(body["entry"]["yyyy_mm_dd"], "2024-10-07");
}

#[tokio::test]
async fn ingest_form_redirects_to_the_day_view() {
    let (base, _dir) = spawn_app().await;
    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    let response = client
        .post(format!("{}/ingest", base))
        .form(&[("raw_text", "[신한카드] 10/07 08:12 5,500원 카카오T 서울택시 승인")])
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 303);
    assert_eq!(
        response.headers()["location"].to_str().unwrap(),
        "/?date=2024-10-07"
    );
}

#[tokio::test]
async fn static_stylesheet_is_served() {
    let (base, _dir) = spawn_app().await;

    let response = reqwest::get(format!("{}/static/style.css", base))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("font-family"));
}
