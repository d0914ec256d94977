//! Integration tests for the contact-routing HTTP API.
//!
//! Each test spins up an Axum server on a random port and exercises the
//! real REST contract over HTTP, with an in-memory database and a
//! recording mailer standing in for SMTP.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use inquiry_router::api::{AppState, routes};
use inquiry_router::mail::{FailingMailer, Mailer, RecordingMailer};
use inquiry_router::store::{Database, DispatchState, LibSqlBackend};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Start a server on a random port, return (base_url, db handle).
async fn start_server(mailer: Arc<dyn Mailer>) -> (String, Arc<LibSqlBackend>) {
    let db = Arc::new(LibSqlBackend::new_memory().await.unwrap());
    let app = routes(AppState::new(db.clone(), mailer, 3600));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), db)
}

fn contact_body(domain: &str, complexity: &str) -> Value {
    json!({
        "name": "Alice",
        "email": "alice@example.com",
        "organisation": "Example Org",
        "category": "General",
        "message": "Hello there",
        "stakeholder": "Individual",
        "domain": domain,
        "complexity": complexity,
    })
}

#[tokio::test]
async fn contact_routes_policy_to_holdings() {
    timeout(TEST_TIMEOUT, async {
        let mailer = Arc::new(RecordingMailer::default());
        let (base, _db) = start_server(mailer.clone()).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/api/contact"))
            .json(&contact_body("Policy / Institutions", "Simple"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let json: Value = response.json().await.unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["routedTo"], "Vasudheva Holdings Pvt. Ltd.");
        assert_eq!(
            json["reason"],
            "Policy matters require governance-level handling"
        );

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "New Contact - Vasudheva Holdings Pvt. Ltd.");
        assert_eq!(sent[0].reply_to, "alice@example.com");
        assert!(sent[0].html_body.contains("<b>Name:</b> Alice"));
        assert!(sent[0].html_body.contains("<b>Message:</b>"));
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn contact_escalation_and_default_paths() {
    timeout(TEST_TIMEOUT, async {
        let mailer = Arc::new(RecordingMailer::default());
        let (base, _db) = start_server(mailer).await;
        let client = reqwest::Client::new();

        // Unsure domain escalates regardless of complexity.
        let json: Value = client
            .post(format!("{base}/api/contact"))
            .json(&contact_body("Multiple / Unsure", "Simple"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(json["routedTo"], "Vasudheva Holdings Pvt. Ltd.");
        assert_eq!(json["reason"], "Complex multi-domain case");

        // Systemic complexity escalates an unmatched domain.
        let json: Value = client
            .post(format!("{base}/api/contact"))
            .json(&contact_body("Gardening", "Institutional / Systemic"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(json["reason"], "Complex multi-domain case");

        // Anything else lands on the governance default.
        let json: Value = client
            .post(format!("{base}/api/contact"))
            .json(&contact_body("Gardening", "Simple"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(json["routedTo"], "Vasudheva Holdings Pvt. Ltd.");
        assert_eq!(json["reason"], "Default governance assessment");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn contact_missing_fields_rejected() {
    timeout(TEST_TIMEOUT, async {
        let mailer = Arc::new(RecordingMailer::default());
        let (base, _db) = start_server(mailer.clone()).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/api/contact"))
            .json(&json!({ "name": "Alice", "email": "alice@example.com" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);

        let json: Value = response.json().await.unwrap();
        assert_eq!(json["error"], "Missing required fields");
        assert!(mailer.sent().is_empty());
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn contact_mail_failure_reports_generic_failure() {
    timeout(TEST_TIMEOUT, async {
        let (base, db) = start_server(Arc::new(FailingMailer)).await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{base}/api/contact"))
            .json(&contact_body("Education", "Simple"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 500);

        let json: Value = response.json().await.unwrap();
        assert_eq!(json, json!({ "success": false }));

        let recent = db.recent_submissions(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].dispatch_state, DispatchState::Failed);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn register_login_and_list_submissions() {
    timeout(TEST_TIMEOUT, async {
        let mailer = Arc::new(RecordingMailer::default());
        let (base, _db) = start_server(mailer).await;
        let client = reqwest::Client::new();

        // A submission to look at later.
        client
            .post(format!("{base}/api/contact"))
            .json(&contact_body("Publishing", "Simple"))
            .send()
            .await
            .unwrap();

        // Register.
        let response = client
            .post(format!("{base}/api/register"))
            .json(&json!({
                "name": "Operator",
                "email": "ops@example.com",
                "password": "correct horse",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let json: Value = response.json().await.unwrap();
        assert_eq!(json["message"], "User registered successfully");

        // Login.
        let response = client
            .post(format!("{base}/api/login"))
            .json(&json!({ "email": "ops@example.com", "password": "correct horse" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let json: Value = response.json().await.unwrap();
        let token = json["token"].as_str().unwrap().to_string();
        assert_eq!(json["user"]["name"], "Operator");
        assert_eq!(json["user"]["role"], "client");

        // Listing without a token is refused.
        let response = client
            .get(format!("{base}/api/submissions"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401);

        // Listing with the token shows the routed submission.
        let response = client
            .get(format!("{base}/api/submissions"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let submissions: Value = response.json().await.unwrap();
        let submissions = submissions.as_array().unwrap();
        assert_eq!(submissions.len(), 1);
        assert_eq!(submissions[0]["routedTo"], "Vasudheva Publishing Pvt. Ltd.");
        assert_eq!(submissions[0]["reason"], "Publishing & IP case");
        assert_eq!(submissions[0]["dispatchState"], "sent");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn login_rejects_bad_credentials() {
    timeout(TEST_TIMEOUT, async {
        let mailer = Arc::new(RecordingMailer::default());
        let (base, _db) = start_server(mailer).await;
        let client = reqwest::Client::new();

        client
            .post(format!("{base}/api/register"))
            .json(&json!({
                "name": "Operator",
                "email": "ops@example.com",
                "password": "correct horse",
            }))
            .send()
            .await
            .unwrap();

        let response = client
            .post(format!("{base}/api/login"))
            .json(&json!({ "email": "ops@example.com", "password": "wrong horse" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        let json: Value = response.json().await.unwrap();
        assert_eq!(json["message"], "Invalid credentials");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn liveness_endpoints_respond() {
    timeout(TEST_TIMEOUT, async {
        let mailer = Arc::new(RecordingMailer::default());
        let (base, _db) = start_server(mailer).await;
        let client = reqwest::Client::new();

        let response = client.get(&base).send().await.unwrap();
        assert_eq!(response.status(), 200);
        let text = response.text().await.unwrap();
        assert!(text.starts_with("Backend is running successfully"));

        let response = client.get(format!("{base}/health")).send().await.unwrap();
        assert_eq!(response.status(), 200);
        let json: Value = response.json().await.unwrap();
        assert_eq!(json["status"], "ok");
    })
    .await
    .expect("test timed out");
}
