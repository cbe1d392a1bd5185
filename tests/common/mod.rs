//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};

use axum_server::tls_rustls::RustlsConfig;
use tls_relay::config::RelayConfig;
use tls_relay::http::RelayServer;
use tls_relay::lifecycle::Shutdown;
use tls_relay::net::listener::Listener;

/// A relay under test. Holding the coordinator keeps the server alive;
/// `shutdown.trigger()` drains it.
pub struct TestRelay {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
}

/// Pin the process-default rustls provider. Both axum-server and reqwest
/// link rustls, with different provider features; an ambiguous default
/// panics at config-build time.
pub fn install_crypto_provider() {
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

/// Start the relay on an ephemeral port, forwarding to `upstream`.
pub async fn start_relay(upstream: SocketAddr, tls: Option<RustlsConfig>) -> TestRelay {
    install_crypto_provider();
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.upstream.host = upstream.ip().to_string();
    config.upstream.port = upstream.port();
    config.timeouts.shutdown_grace_secs = 2;

    let listener = Listener::bind(&config.listener).expect("bind relay listener");
    let addr = listener.local_addr();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = RelayServer::new(config).expect("build relay");

    tokio::spawn(async move {
        let _ = server.run(listener, tls, server_shutdown).await;
    });

    // Let the accept loop come up.
    tokio::time::sleep(Duration::from_millis(50)).await;

    TestRelay { addr, shutdown }
}

/// Start a mock backend that answers every request with a fixed 200
/// response. Returns the bound address.
#[allow(dead_code)]
pub async fn start_mock_backend(response: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let _ = read_request(&mut socket).await;
                        let response_str = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that captures the raw request head of each connection
/// and answers 200. Heads are delivered on the returned channel.
#[allow(dead_code)]
pub async fn start_capturing_backend() -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let (head, _) = read_request(&mut socket).await;
                        let _ = tx.send(head);
                        let _ = socket
                            .write_all(
                                b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
                            )
                            .await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// Start a backend that echoes each request body back verbatim.
#[allow(dead_code)]
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    tokio::spawn(async move {
                        let (head, mut body) = read_request(&mut socket).await;
                        let want = content_length(&head);
                        while body.len() < want {
                            let mut chunk = vec![0u8; 64 * 1024];
                            match socket.read(&mut chunk).await {
                                Ok(0) | Err(_) => break,
                                Ok(n) => body.extend_from_slice(&chunk[..n]),
                            }
                        }
                        let header = format!(
                            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                            body.len()
                        );
                        let _ = socket.write_all(header.as_bytes()).await;
                        let _ = socket.write_all(&body).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Start a backend that sends response headers and then drip-feeds an
/// endless body. The returned receiver resolves when its client socket
/// goes away (the relay released the upstream connection).
#[allow(dead_code)]
pub async fn start_abort_probe_backend() -> (SocketAddr, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        if let Ok((mut socket, _)) = listener.accept().await {
            let _ = read_request(&mut socket).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\n\r\n")
                .await;
            let chunk = [0u8; 1024];
            loop {
                if socket.write_all(&chunk).await.is_err() {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(25)).await;
            }
            let _ = tx.send(());
        }
    });

    (addr, rx)
}

/// Read an HTTP request head off the socket. Returns the head (up to the
/// blank line) and any body bytes already buffered past it.
async fn read_request(socket: &mut TcpStream) -> (String, Vec<u8>) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        if let Some(pos) = find_blank_line(&buf) {
            let head = String::from_utf8_lossy(&buf[..pos]).to_string();
            let rest = buf[pos + 4..].to_vec();
            return (head, rest);
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return (String::from_utf8_lossy(&buf).to_string(), Vec::new()),
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

fn find_blank_line(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

fn content_length(head: &str) -> usize {
    head.lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse().ok()
            } else {
                None
            }
        })
        .unwrap_or(0)
}
