//! Telegram notifier against a mock Bot API server

use mockito::{Matcher, Server};
use notifier::{Notifier, TelegramConfig, TelegramNotifier};
use std::fs;
use tempfile::tempdir;

fn config_for(url: String) -> TelegramConfig {
    TelegramConfig {
        token: Some("TESTTOKEN".to_string()),
        chat_id: Some("4242".to_string()),
        api_base: url,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_send_text_success() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/botTESTTOKEN/sendMessage")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "chat_id": "4242",
            "text": "🚨 alert",
            "parse_mode": "HTML",
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"ok":true,"result":{"message_id":1}}"#)
        .create_async()
        .await;

    let notifier = TelegramNotifier::new(config_for(server.url()));
    assert!(notifier.send_text("🚨 alert").await);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_text_escapes_reserved_characters() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/botTESTTOKEN/sendMessage")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "text": "Pressure: BUY (Demand &gt; Supply), Consider LONG",
        })))
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"message_id":2}}"#)
        .create_async()
        .await;

    let notifier = TelegramNotifier::new(config_for(server.url()));
    assert!(notifier.send_text("Pressure: BUY (Demand > Supply), Consider LONG").await);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_text_rejected() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/botTESTTOKEN/sendMessage")
        .with_status(400)
        .with_body(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
        .create_async()
        .await;

    let notifier = TelegramNotifier::new(config_for(server.url()));
    assert!(!notifier.send_text("hello").await);

    let err = notifier.post_message("hello").await.unwrap_err();
    assert!(err.to_string().contains("chat not found"));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_unconfigured_notifier_makes_no_request() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let notifier = TelegramNotifier::new(TelegramConfig {
        token: None,
        chat_id: Some("4242".to_string()),
        api_base: server.url(),
        ..Default::default()
    });

    assert!(!notifier.is_enabled());
    assert!(!notifier.send_text("hello").await);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_image_uploads_file() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/botTESTTOKEN/sendPhoto")
        .match_header(
            "content-type",
            Matcher::Regex("multipart/form-data.*".to_string()),
        )
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.png");
    fs::write(&path, b"\x89PNG fake").unwrap();

    let notifier = TelegramNotifier::new(config_for(server.url()));
    assert!(notifier.send_image(&path, "Market snapshot").await);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_send_image_missing_file() {
    let server = Server::new_async().await;
    let notifier = TelegramNotifier::new(config_for(server.url()));
    assert!(!notifier.send_image(std::path::Path::new("/nonexistent/snap.png"), "x").await);
}
