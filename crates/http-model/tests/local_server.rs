use std::time::Duration;

use chatbox_http_model::{HttpConfigBuilder, HttpProvider};
use chatbox_model::{
    CompletionProvider, CompletionProviderError, CompletionRequest, ErrorKind,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

/// Serves exactly one canned response and hands back the raw request.
async fn serve_once(
    status_line: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "{status_line}\r\ncontent-type: {content_type}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });
    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n")
        else {
            continue;
        };
        let headers =
            String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        if buf.len() >= header_end + 4 + content_length {
            break;
        }
    }
    String::from_utf8(buf).unwrap()
}

fn provider_for(base_url: &str) -> HttpProvider {
    HttpProvider::new(
        HttpConfigBuilder::with_base_url(base_url)
            .with_timeout(Duration::from_secs(5))
            .build(),
    )
}

#[tokio::test]
async fn test_posts_body_and_decodes_text() {
    let (base_url, server) = serve_once(
        "HTTP/1.1 200 OK",
        "application/json",
        r#"{"text":"hi there","id":"cmpl-1"}"#,
    )
    .await;

    let completion = provider_for(&base_url)
        .complete(&CompletionRequest::new("hello"))
        .await
        .unwrap();
    assert_eq!(completion.text, "hi there");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/chat HTTP/1.1"));
    assert!(request.ends_with(r#"{"Body":"hello"}"#));
}

#[tokio::test]
async fn test_missing_text_is_decode_error() {
    let (base_url, _server) = serve_once(
        "HTTP/1.1 200 OK",
        "application/json; charset=utf-8",
        r#"{"message":"nope"}"#,
    )
    .await;

    let err = provider_for(&base_url)
        .complete(&CompletionRequest::new("hello"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

#[tokio::test]
async fn test_non_json_content_type_is_decode_error() {
    let (base_url, _server) =
        serve_once("HTTP/1.1 200 OK", "text/html", "<html></html>").await;

    let err = provider_for(&base_url)
        .complete(&CompletionRequest::new("hello"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.message().contains("text/html"));
}

#[tokio::test]
async fn test_server_error_status() {
    let (base_url, _server) = serve_once(
        "HTTP/1.1 500 Internal Server Error",
        "application/json",
        r#"{"error":"boom"}"#,
    )
    .await;

    let err = provider_for(&base_url)
        .complete(&CompletionRequest::new("hello"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Status);
}

#[tokio::test]
async fn test_unreachable_service() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = provider_for(&format!("http://{addr}"))
        .complete(&CompletionRequest::new("hello"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[tokio::test]
async fn test_timeout() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    // Accept the connection but never answer.
    let _server = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        tokio::time::sleep(Duration::from_secs(10)).await;
        drop(socket);
    });

    let provider = HttpProvider::new(
        HttpConfigBuilder::with_base_url(format!("http://{addr}"))
            .with_timeout(Duration::from_millis(100))
            .build(),
    );
    let err = provider
        .complete(&CompletionRequest::new("hello"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Timeout);
}
