//! End-to-end chat against a mock `/chat` backend.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn temp_home() -> TempDir {
    TempDir::new().expect("create temp chatpane home")
}

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

/// Replies with `echo: <message>`.
async fn echo_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("content-type", "application/json"))
        .respond_with(|req: &Request| {
            let body: serde_json::Value = serde_json::from_slice(&req.body).unwrap();
            let message = body["message"].as_str().unwrap_or_default();
            ResponseTemplate::new(200).set_body_json(json!({ "reply": format!("echo: {message}") }))
        })
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_piped_lines_print_transcript() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = echo_server().await;

    cargo_bin_cmd!("chatpane")
        .env("CHATPANE_HOME", home.path())
        .args(["--endpoint", &format!("{}/chat", server.uri())])
        .write_stdin("Hello\n   \nHow are you?\n")
        .assert()
        .success()
        .stdout(predicate::eq(
            "You: Hello\nBot: echo: Hello\nYou: How are you?\nBot: echo: How are you?\n",
        ));

    // The blank line never reached the backend.
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_piped_quit_command_stops_early() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = echo_server().await;

    cargo_bin_cmd!("chatpane")
        .env("CHATPANE_HOME", home.path())
        .args(["--endpoint", &format!("{}/chat", server.uri())])
        .write_stdin("one\n:q\ntwo\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("echo: one"))
        .stdout(predicate::str::contains("two").not());
}

#[tokio::test]
async fn test_server_error_prints_fallback() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("chatpane")
        .env("CHATPANE_HOME", home.path())
        .args(["--endpoint", &format!("{}/chat", server.uri())])
        .write_stdin("Hello\n")
        .assert()
        .success()
        .stdout(predicate::eq(
            "You: Hello\nBot: Sorry, something went wrong.\n",
        ));
}

#[tokio::test]
async fn test_send_prints_reply() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({ "message": "Hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "reply": "Hi there" })))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("chatpane")
        .env("CHATPANE_HOME", home.path())
        .args(["--endpoint", &format!("{}/chat", server.uri())])
        .args(["send", "Hello"])
        .assert()
        .success()
        .stdout(predicate::eq("Hi there\n"));
}

#[tokio::test]
async fn test_send_without_typewriter_uses_custom_fallback() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let home = temp_home();
    std::fs::write(
        home.path().join("config.toml"),
        "fallback_message = \"Backend unavailable.\"\n",
    )
    .unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    cargo_bin_cmd!("chatpane")
        .env("CHATPANE_HOME", home.path())
        .args(["--endpoint", &format!("{}/chat", server.uri())])
        .args(["--no-typewriter", "send", "Hello"])
        .assert()
        .success()
        .stdout(predicate::eq("Backend unavailable.\n"));
}

#[test]
fn test_send_rejects_blank_message() {
    let home = temp_home();

    cargo_bin_cmd!("chatpane")
        .env("CHATPANE_HOME", home.path())
        .args(["send", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Message is empty"));
}
