/// Command-line tests for the print-access-token helper
use serde_json::json;
use std::path::PathBuf;
use std::process::Output;
use tokio::process::Command;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PRIVATE_KEY: &str = include_str!("fixtures/service_account_key.pem");

async fn run(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_print-access-token"))
        .args(args)
        .output()
        .await
        .unwrap()
}

fn write_key_file(name: &str, contents: &str) -> PathBuf {
    let file = std::env::temp_dir().join(format!("{}-{}.json", name, std::process::id()));
    std::fs::write(&file, contents).unwrap();
    file
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[tokio::test]
async fn test_missing_argument_prints_usage() {
    let output = run(&[]).await;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("usage: print-access-token <service-account.json>"));
    assert!(output.stdout.is_empty());
}

#[tokio::test]
async fn test_unreadable_file_names_the_path() {
    let missing = std::env::temp_dir().join("print-access-token-no-such-file.json");
    let missing = missing.to_string_lossy().into_owned();

    let output = run(&[&missing]).await;

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("failed to read service account file"));
    assert!(err.contains(&missing));
}

#[tokio::test]
async fn test_invalid_document_is_rejected() {
    let file = write_key_file("print-access-token-invalid", r#"{"client_email":"a@b"}"#);

    let output = run(&[&file.to_string_lossy()]).await;
    std::fs::remove_file(&file).ok();

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid service account JSON"));
}

#[tokio::test]
async fn test_prints_exchanged_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.cli-token",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;
    let document = json!({
        "project_id": "demo-project",
        "private_key": PRIVATE_KEY,
        "client_email": "push@demo-project.iam.gserviceaccount.com",
        "token_uri": format!("{}/token", server.uri())
    })
    .to_string();
    let file = write_key_file("print-access-token-valid", &document);

    let output = run(&[&file.to_string_lossy()]).await;
    std::fs::remove_file(&file).ok();

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "ya29.cli-token");
}
