//! Shared utilities for gateway integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{routing::post, Json, Router};
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use local_gateway::contract::ContractDocument;
use local_gateway::{ContractStore, GatewayConfig, GatewayServer, Shutdown};

pub const INVOCATION_PATH: &str = "/2015-03-31/functions/function/invocations";

pub const CONTRACT: &str = r#"
openapi: 3.0.3
info:
  title: Shop
  version: "1"
servers:
  - url: http://shop.local
paths:
  /users/{userId}:
    get:
      operationId: getUser
  /users/me:
    get:
      operationId: getMe
  /users/{userId}/orders/{orderId}:
    get:
      operationId: getOrder
  /orders:
    post:
      operationId: createOrder
"#;

/// Envelopes received by a mock function, in arrival order.
pub type Captured = Arc<Mutex<Vec<Value>>>;

/// Start a mock backend function that records each envelope and answers
/// with `reply(envelope)`.
pub async fn start_function<F>(reply: F) -> (SocketAddr, Captured)
where
    F: Fn(&Value) -> Value + Send + Sync + 'static,
{
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let reply = Arc::new(reply);

    let sink = captured.clone();
    let app = Router::new().route(
        INVOCATION_PATH,
        post(move |Json(event): Json<Value>| {
            let sink = sink.clone();
            let reply = reply.clone();
            async move {
                let answer = reply(&event);
                sink.lock().unwrap().push(event);
                Json(answer)
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, captured)
}

/// Start a backend that answers every connection with a fixed raw HTTP reply.
#[allow(dead_code)]
pub async fn start_raw_backend(status_line: &'static str, body: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 8192];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    addr
}

/// Start a backend that accepts connections and never answers.
#[allow(dead_code)]
pub async fn start_hanging_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(30)).await;
                drop(socket);
            });
        }
    });

    addr
}

/// A port with nothing listening on it.
#[allow(dead_code)]
pub fn closed_port_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Start a gateway in front of `backend`, serving [`CONTRACT`].
pub async fn start_gateway<F>(backend: SocketAddr, tweak: F) -> (SocketAddr, Shutdown)
where
    F: FnOnce(&mut GatewayConfig),
{
    let mut config = GatewayConfig::default();
    config.backend.hostname = backend.ip().to_string();
    config.backend.port = backend.port();
    tweak(&mut config);

    let contract = ContractStore::new(ContractDocument::from_yaml(CONTRACT).unwrap()).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = GatewayServer::new(config, contract).unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
