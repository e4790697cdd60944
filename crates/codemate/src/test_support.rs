//! Helpers shared by the HTTP tests.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one response whose body ends before its declared length, then hang up.
///
/// Returns the base URL of the server.
pub async fn truncated_body_server(status_line: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let response = format!(
        "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{{\"mess"
    );

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        // Drain the whole request so closing the socket does not reset it.
        while let Ok(Ok(n)) =
            tokio::time::timeout(Duration::from_millis(100), socket.read(&mut buf)).await
        {
            if n == 0 {
                break;
            }
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    format!("http://{addr}")
}
