use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use inner_ear::client::terminal::Terminal;
use inner_ear::client::{CredentialStore, RelayClient};
use inner_ear::models::Role;

mod common;
use common::{spawn_app, text_body, GENERATE_PATH, TEST_API_KEY};

async fn gemini_replying(text: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(text_body(text)))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_first_run_asks_for_key_then_chats() {
    let gemini = gemini_replying("Sing the line before you play it.").await;
    let static_dir = tempfile::tempdir().expect("temp dir");
    let base_url = spawn_app(&gemini.uri(), static_dir.path()).await;

    let key_dir = tempfile::tempdir().expect("temp dir");
    let store = CredentialStore::new(key_dir.path().join(".inner_ear_api_key"));
    let relay = RelayClient::new(&base_url).expect("relay");

    let input = format!("{TEST_API_KEY}\nHow do I hear the changes?\n/quit\n");
    let mut output = Vec::new();
    let mut terminal = Terminal::new(input.as_bytes(), &mut output, relay, store.clone());
    terminal.run().await.expect("run");

    let turns: Vec<_> = terminal
        .session()
        .messages()
        .iter()
        .map(|m| (m.role, m.content.clone()))
        .collect();
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[1], (Role::User, "How do I hear the changes?".to_string()));
    assert_eq!(
        turns[2],
        (Role::Model, "Sing the line before you play it.".to_string())
    );
    drop(terminal);

    assert_eq!(store.load().as_deref(), Some(TEST_API_KEY));
    let printed = String::from_utf8(output).expect("utf8");
    assert!(printed.contains("Key verified and saved."));
    assert!(printed.contains("Sing the line before you play it."));
}

#[tokio::test]
async fn test_stored_key_skips_prompt_and_clear_key_forgets_it() {
    let relay_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"text": "Breathe."})))
        .expect(1)
        .mount(&relay_server)
        .await;

    let key_dir = tempfile::tempdir().expect("temp dir");
    let store = CredentialStore::new(key_dir.path().join("key"));
    store.save(TEST_API_KEY).expect("save");
    let relay = RelayClient::new(&relay_server.uri()).expect("relay");

    let input = "I'm nervous on stage\n/clear-key\n";
    let mut output = Vec::new();
    let mut terminal = Terminal::new(input.as_bytes(), &mut output, relay, store.clone());
    terminal.run().await.expect("run");

    assert!(!terminal.session().has_credential());
    drop(terminal);

    assert_eq!(store.load(), None);
    let printed = String::from_utf8(output).expect("utf8");
    assert!(!printed.contains("Enter your Gemini API key"));
    assert!(printed.contains("Breathe."));
    assert!(printed.contains("Stored API key removed."));
}

#[tokio::test]
async fn test_rejected_key_is_not_saved() {
    let relay_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/validate"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"valid": false, "error": "Invalid API Key"})),
        )
        .mount(&relay_server)
        .await;

    let key_dir = tempfile::tempdir().expect("temp dir");
    let store = CredentialStore::new(key_dir.path().join("key"));
    let relay = RelayClient::new(&relay_server.uri()).expect("relay");

    let input = "AIza-wrong\n\n";
    let mut output = Vec::new();
    let mut terminal = Terminal::new(input.as_bytes(), &mut output, relay, store.clone());
    terminal.run().await.expect("run");
    drop(terminal);

    assert_eq!(store.load(), None);
    let printed = String::from_utf8(output).expect("utf8");
    assert!(printed.contains("Connection failed: Invalid API Key"));
}

#[tokio::test]
async fn test_rejected_stored_key_is_removed_from_disk() {
    let relay_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "AUTH_ERROR"})))
        .expect(1)
        .mount(&relay_server)
        .await;

    let key_dir = tempfile::tempdir().expect("temp dir");
    let store = CredentialStore::new(key_dir.path().join("key"));
    store.save(TEST_API_KEY).expect("save");
    let relay = RelayClient::new(&relay_server.uri()).expect("relay");

    // Send one message, then cancel the re-prompt with a blank line.
    let input = "How do I practice time?\n\n";
    let mut output = Vec::new();
    let mut terminal = Terminal::new(input.as_bytes(), &mut output, relay, store.clone());
    terminal.run().await.expect("run");

    assert!(!terminal.session().has_credential());
    assert_eq!(terminal.session().messages().len(), 1);
    drop(terminal);

    assert_eq!(store.load(), None);
    let printed = String::from_utf8(output).expect("utf8");
    assert!(printed.contains("Your API key needs to be entered again."));
    assert!(!printed.contains("Key saved."));
}
