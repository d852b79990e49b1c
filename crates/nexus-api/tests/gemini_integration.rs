//! Integration tests for `GeminiClient` against a raw TCP test server.
//!
//! The server returns canned HTTP responses and records each request body so
//! the tests can check what context was forwarded.
//!
//! Run with: `cargo test -p nexus-api --test gemini_integration -- --ignored`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nexus_api::GeminiClient;
use nexus_types::{ApiError, ConversationalModel, Message};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Build an HTTP response with a JSON body.
fn http_json_response(status_line: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status_line}\r\n\
         Content-Type: application/json\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\
         \r\n\
         {}",
        body.len(),
        body
    )
}

fn http_200_reply(text: &str) -> String {
    let body = serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
    .to_string();
    http_json_response("200 OK", &body)
}

struct TestServer {
    base_url: String,
    requests: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<serde_json::Value>>>,
}

/// Read one HTTP request: headers, then `Content-Length` bytes of body.
async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<(String, String)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        let text = String::from_utf8_lossy(&buf).to_string();
        if let Some(header_end) = text.find("\r\n\r\n") {
            let head = text[..header_end].to_string();
            let content_length = head
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            let body_start = header_end + 4;
            if buf.len() >= body_start + content_length {
                let body = String::from_utf8_lossy(&buf[body_start..body_start + content_length])
                    .to_string();
                return Some((head, body));
            }
        }
    }
}

/// Start a test server that answers the n-th connection with `responses[n]`.
/// A `None` response holds the connection open without answering.
async fn start_test_server(responses: Vec<Option<String>>) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests = Arc::new(AtomicUsize::new(0));
    let bodies = Arc::new(Mutex::new(Vec::new()));

    let requests_clone = Arc::clone(&requests);
    let bodies_clone = Arc::clone(&bodies);
    tokio::spawn(async move {
        let responses = Arc::new(responses);
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            let idx = requests_clone.fetch_add(1, Ordering::SeqCst);
            let responses = Arc::clone(&responses);
            let bodies = Arc::clone(&bodies_clone);

            tokio::spawn(async move {
                if let Some((head, body)) = read_request(&mut socket).await {
                    assert!(head.to_ascii_lowercase().contains("x-goog-api-key: test-key"));
                    if let Ok(json) = serde_json::from_str(&body) {
                        bodies.lock().unwrap().push(json);
                    }
                }
                match responses.get(idx).cloned().flatten() {
                    Some(response) => {
                        let _ = socket.write_all(response.as_bytes()).await;
                        let _ = socket.flush().await;
                        let _ = socket.shutdown().await;
                    }
                    None => tokio::time::sleep(Duration::from_secs(30)).await,
                }
            });
        }
    });

    TestServer {
        base_url: format!("http://{addr}"),
        requests,
        bodies,
    }
}

fn make_client(base_url: &str) -> GeminiClient {
    GeminiClient::new("test-key", base_url)
        .unwrap()
        .with_model("gemini-test")
        .with_timeout(Duration::from_millis(500))
}

#[tokio::test]
#[ignore]
async fn test_reply_text_and_forwarded_context() {
    let server = start_test_server(vec![Some(http_200_reply("Hi there"))]).await;
    let client = make_client(&server.base_url);

    let context = [Message::user("Hello"), Message::assistant("Hey!")];
    let reply = client
        .send_message(&context, "How are you?")
        .await
        .expect("request should succeed");
    assert_eq!(reply, "Hi there");

    let bodies = server.bodies.lock().unwrap();
    assert_eq!(bodies.len(), 1);
    let contents = bodies[0]["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[0]["role"], "user");
    assert_eq!(contents[0]["parts"][0]["text"], "Hello");
    assert_eq!(contents[1]["role"], "model");
    assert_eq!(contents[2]["parts"][0]["text"], "How are you?");
}

#[tokio::test]
#[ignore]
async fn test_quota_error_is_not_retried() {
    let body = r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#;
    let server = start_test_server(vec![
        Some(http_json_response("429 Too Many Requests", body)),
        Some(http_200_reply("should never be reached")),
    ])
    .await;
    let client = make_client(&server.base_url);

    let result = client.send_message(&[], "hello").await;
    match result {
        Err(ApiError::RateLimited { message }) => assert_eq!(message, "quota exceeded"),
        other => panic!("expected RateLimited, got: {other:?}"),
    }
    assert_eq!(server.requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
#[ignore]
async fn test_auth_error() {
    let body = r#"{"error":{"code":403,"message":"API key not valid"}}"#;
    let server = start_test_server(vec![Some(http_json_response("403 Forbidden", body))]).await;
    let client = make_client(&server.base_url);

    let result = client.send_message(&[], "hello").await;
    assert!(matches!(result, Err(ApiError::Auth { .. })), "{result:?}");
}

#[tokio::test]
#[ignore]
async fn test_unanswered_request_times_out() {
    let server = start_test_server(vec![None]).await;
    let client = make_client(&server.base_url);

    let result = client.send_message(&[], "hello").await;
    assert!(matches!(result, Err(ApiError::Timeout)), "{result:?}");
}

#[tokio::test]
#[ignore]
async fn test_connection_refused_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = make_client(&format!("http://{addr}"));
    let result = client.send_message(&[], "hello").await;
    assert!(matches!(result, Err(ApiError::Network(_))), "{result:?}");
}
