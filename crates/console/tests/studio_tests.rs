//! End-to-end tests for `gsb-console studio` against a wiremock server.

use assert_matches::assert_matches;
use clap::Parser;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gsb_client::api::ConsoleApi;
use gsb_console::cli::{Cli, Commands};
use gsb_console::commands::studio;
use gsb_console::error::{CliError, CliResult};

// =============================================================================
// Helpers
// =============================================================================

/// Parse `args` as a `gsb-console studio ...` command line and run it.
async fn run_studio(server: &MockServer, args: &[&str]) -> (CliResult<()>, String) {
    let argv = ["gsb-console", "studio"].iter().chain(args).copied();
    let cli = Cli::try_parse_from(argv).expect("command line parses");
    let Commands::Studio(studio_args) = cli.command else {
        panic!("expected a studio command");
    };
    let api = ConsoleApi::new(&server.uri(), None).expect("mock server uri is a valid base");
    let mut out = Vec::new();
    let result = studio::run(studio_args.command, &api, &mut out).await;
    (result, String::from_utf8(out).expect("utf-8 output"))
}

fn stored_draft() -> Value {
    json!({
        "draft": {
            "metadata": {"name": "acme-orders"},
            "spec": {
                "mode": "sql_pull",
                "source": {"type": "postgres", "secretRef": "acme-db", "query": "SELECT 1", "watermarkField": "updated_at"},
                "mapping": {"idField": "order_id", "titleField": "title", "contentTemplate": "{{ title }}"},
                "output": {"bucket": "gs://acme", "prefix": "orders", "format": "ndjson"},
                "gemini": {"projectId": "p", "location": "global", "dataStoreId": "ds"},
                "reconciliation": {"deletePolicy": "auto_delete_missing"}
            },
            "schedule": {"cron": "0 * * * *", "enabled": true}
        }
    })
}

async fn mount_stored_draft(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/studio/connectors/acme-orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stored_draft()))
        .mount(server)
        .await;
}

async fn request_body(server: &MockServer, request_path: &str) -> Value {
    let requests = server.received_requests().await.expect("recording enabled");
    let request = requests
        .iter()
        .find(|r| r.url.path() == request_path)
        .unwrap_or_else(|| panic!("no request to {request_path}"));
    serde_json::from_slice(&request.body).expect("JSON request body")
}

// =============================================================================
// Catalog and layout
// =============================================================================

#[tokio::test]
async fn catalog_prints_table_and_footer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/studio/catalog"))
        .and(query_param("limit", "50"))
        .and(query_param("status", "failed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"connector_id": "acme-orders", "mode": "sql_pull", "schedule": "0 * * * *",
                       "schedule_enabled": false, "source_type": "postgres", "last_status": "FAILED"}],
            "total": 1, "limit": 50, "offset": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (result, out) = run_studio(&server, &["catalog", "--status", "failed"]).await;
    result.unwrap();
    assert!(out.starts_with("CONNECTOR"));
    assert!(out.contains("acme-orders  sql_pull  0 * * * *  no"));
    assert!(out.contains("1-1 of 1"));
    assert!(out.contains("Actions per connector: edit, clone, pause, resume, delete, run"));
}

#[tokio::test]
async fn fields_needs_no_service() {
    let server = MockServer::start().await;
    let (result, out) = run_studio(
        &server,
        &["fields", "--mode", "rest_pull", "--auth", "oauth_client_credentials"],
    )
    .await;
    result.unwrap();
    assert!(out.contains("oauth_client_credentials"));
    assert!(out.contains("OAuth"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

// =============================================================================
// Draft wizard
// =============================================================================

#[tokio::test]
async fn create_validate_sends_edited_rest_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/studio/connectors/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": true, "errors": [], "warnings": ["schedule is empty"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (result, out) = run_studio(
        &server,
        &[
            "validate",
            "--mode",
            "rest_pull",
            "--set",
            "name=kb",
            "--set",
            "source.method=post",
            "--set",
            "source.headers={\"X-Team\":\"kb\"}",
        ],
    )
    .await;
    result.unwrap();
    assert!(out.contains("\"valid\": true"));

    let body = request_body(&server, "/v1/studio/connectors/validate").await;
    let source = &body["draft"]["spec"]["source"];
    assert_eq!(body["draft"]["metadata"]["name"], "kb");
    assert_eq!(body["draft"]["spec"]["mode"], "rest_pull");
    assert_eq!(source["type"], "http");
    assert_eq!(source["method"], "POST");
    assert_eq!(source["url"], "https://source.example/api/items");
    assert_eq!(source["headers"], json!({"X-Team": "kb"}));
}

#[tokio::test]
async fn invalid_draft_lists_errors_and_fails() {
    let server = MockServer::start().await;
    mount_stored_draft(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/studio/connectors/validate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "valid": false, "errors": ["schedule.cron is not a valid cron expression"], "warnings": []
        })))
        .mount(&server)
        .await;

    let (result, out) = run_studio(
        &server,
        &["validate", "--wizard", "edit", "--connector", "acme-orders", "--set", "schedule.cron=nope"],
    )
    .await;
    let err = result.unwrap_err();
    assert_matches!(err, CliError::Reported);
    assert_eq!(err.exit_code(), 1);
    assert!(out.starts_with("error: schedule.cron is not a valid cron expression\n"));
}

#[tokio::test]
async fn validate_request_failure_exits_as_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/studio/connectors/validate"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let (result, out) = run_studio(&server, &["validate", "--mode", "rest_pull", "--set", "name=kb"]).await;
    let err = result.unwrap_err();
    assert_matches!(err, CliError::Network(ref message) if message == "Service Unavailable");
    assert_eq!(err.exit_code(), 3);
    assert!(out.is_empty());
}

#[tokio::test]
async fn validate_api_rejection_exits_as_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/studio/connectors/validate"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({"detail": "draft.spec is required"})))
        .mount(&server)
        .await;

    let (result, _) = run_studio(&server, &["validate", "--mode", "rest_pull", "--set", "name=kb"]).await;
    let err = result.unwrap_err();
    assert_matches!(err, CliError::Api { status: 422, .. });
    assert_eq!(err.exit_code(), 5);
}

#[tokio::test]
async fn unknown_field_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let (result, _) = run_studio(&server, &["preview", "--set", "source.colour=blue"]).await;
    let err = result.unwrap_err();
    assert_eq!(err.exit_code(), 4);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn pause_proposal_sends_connector_id_only() {
    let server = MockServer::start().await;
    mount_stored_draft(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/studio/connectors/propose"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "proposal_id": "p-7", "connector_id": "acme-orders", "action": "pause"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (result, out) = run_studio(
        &server,
        &["propose", "--wizard", "pause", "--connector", "acme-orders"],
    )
    .await;
    result.unwrap();
    assert!(out.contains("\"proposal_id\": \"p-7\""));
    assert_eq!(
        request_body(&server, "/v1/studio/connectors/propose").await,
        json!({"action": "pause", "connector_id": "acme-orders"})
    );
}

#[tokio::test]
async fn clone_names_its_source_connector() {
    let server = MockServer::start().await;
    mount_stored_draft(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/studio/connectors/propose"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"proposal_id": "p-9"})))
        .expect(1)
        .mount(&server)
        .await;

    let (result, _) = run_studio(
        &server,
        &["propose", "--wizard", "clone", "--connector", "acme-orders"],
    )
    .await;
    result.unwrap();

    let body = request_body(&server, "/v1/studio/connectors/propose").await;
    assert_eq!(body["action"], "clone");
    assert_eq!(body["connector_id"], "acme-orders");
    assert_eq!(body["draft"]["metadata"]["name"], "acme-orders-copy");
}

#[tokio::test]
async fn clone_from_draft_file_proposes_copy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/studio/connectors/propose"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"proposal_id": "p-8"})))
        .expect(1)
        .mount(&server)
        .await;

    let file = std::env::temp_dir().join(format!("gsb-console-draft-{}.json", std::process::id()));
    std::fs::write(&file, stored_draft()["draft"].to_string()).unwrap();

    let (result, _) = run_studio(
        &server,
        &[
            "propose",
            "--wizard",
            "clone",
            "--connector",
            "acme-orders",
            "--draft",
            file.to_str().unwrap(),
        ],
    )
    .await;
    std::fs::remove_file(&file).ok();
    result.unwrap();

    let body = request_body(&server, "/v1/studio/connectors/propose").await;
    assert_eq!(body["action"], "clone");
    assert_eq!(body["connector_id"], "acme-orders");
    assert_eq!(body["draft"]["metadata"]["name"], "acme-orders-copy");
}

#[tokio::test]
async fn run_wizard_triggers_run_now_without_loading_draft() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/studio/connectors/acme-orders/run-now"))
        .respond_with(ResponseTemplate::new(202).set_body_string("queued"))
        .expect(1)
        .mount(&server)
        .await;

    let (result, out) = run_studio(
        &server,
        &["propose", "--wizard", "run", "--connector", "acme-orders"],
    )
    .await;
    result.unwrap();
    assert_eq!(out, "queued\n");
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn missing_connector_surfaces_api_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/studio/connectors/ghost"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "Connector 'ghost' not found"})),
        )
        .mount(&server)
        .await;

    let (result, _) = run_studio(&server, &["preview", "--wizard", "edit", "--connector", "ghost"]).await;
    assert_matches!(result, Err(CliError::Api { status: 404, ref message }) if message == "Connector 'ghost' not found");
}
