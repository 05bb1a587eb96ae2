use donation_beacon::domain::ports::BeaconTransport;
use donation_beacon::infrastructure::http::ReqwestTransport;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Accepts one connection, captures the request head and answers with `status_line`.
async fn stub_server(status_line: &'static str) -> (String, oneshot::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if buf.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let response = format!("HTTP/1.1 {status_line}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        tx.send(String::from_utf8_lossy(&buf).into_owned()).ok();
    });

    (format!("http://{addr}/collect"), rx)
}

/// Local requests must not be routed through a proxy from the environment.
fn transport() -> ReqwestTransport {
    ReqwestTransport::with_client(reqwest::Client::builder().no_proxy().build().unwrap())
}

#[tokio::test]
async fn test_beacon_is_a_plain_get() {
    let (endpoint, request) = stub_server("200 OK").await;
    let transport = transport();

    let response = transport
        .send(&format!("{endpoint}?v=1&tid=UA-123&ea=Donation%20Success"))
        .await;

    assert_eq!(response.status, Some(200));
    assert!(response.error.is_none());
    assert!(response.is_accepted());

    let request = request.await.unwrap();
    assert!(request.starts_with("GET /collect?v=1&tid=UA-123&ea=Donation%20Success HTTP/1.1\r\n"));
}

#[tokio::test]
async fn test_server_error_is_still_accepted() {
    let (endpoint, _request) = stub_server("500 Internal Server Error").await;
    let transport = transport();

    let response = transport.send(&format!("{endpoint}?v=1")).await;

    assert_eq!(response.status, Some(500));
    assert!(response.is_accepted());
}

#[tokio::test]
async fn test_connection_refused_is_not_accepted() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let transport = transport();
    let response = transport.send(&format!("http://{addr}/collect?v=1")).await;

    assert!(response.error.is_some());
    assert_eq!(response.status, None);
    assert!(!response.is_accepted());
}
