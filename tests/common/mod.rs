//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use token_proxy::config::ProxyConfig;
use token_proxy::http::HttpServer;
use token_proxy::lifecycle::Shutdown;
use token_proxy::net::Listener;

/// One request as seen by the mock backend.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub head: String,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim().eq_ignore_ascii_case(name).then(|| value.trim())
        })
    }
}

/// What the mock backend answers with.
pub struct Reply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: String,
    /// Content-Length to announce instead of the real body length.
    pub declared_length: Option<usize>,
}

impl Reply {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("application/json"),
            body: body.to_string(),
            declared_length: None,
        }
    }

    /// Announce `declared_length` bytes but close the connection after `body`.
    pub fn truncated(status: u16, body: &str, declared_length: usize) -> Self {
        Self {
            declared_length: Some(declared_length),
            ..Self::json(status, body)
        }
    }
}

pub struct MockBackend {
    pub addr: SocketAddr,
    calls: Arc<AtomicU32>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockBackend {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Start a programmable mock backend on an ephemeral port.
pub async fn start_programmable_backend<F>(f: F) -> MockBackend
where
    F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicU32::new(0));
    let requests = Arc::new(Mutex::new(Vec::new()));
    let f = Arc::new(f);

    let (c, r) = (calls.clone(), requests.clone());
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let (f, c, r) = (f.clone(), c.clone(), r.clone());
            tokio::spawn(async move {
                let Some((mut socket, request)) = read_request(socket).await else {
                    return;
                };
                c.fetch_add(1, Ordering::SeqCst);
                let reply = f(&request);
                r.lock().unwrap().push(request);

                let mut head = format!(
                    "HTTP/1.1 {} {}\r\nContent-Length: {}\r\nConnection: close\r\n",
                    reply.status,
                    reason(reply.status),
                    reply.declared_length.unwrap_or(reply.body.len())
                );
                if let Some(content_type) = reply.content_type {
                    head.push_str(&format!("Content-Type: {}\r\n", content_type));
                }
                head.push_str("\r\n");

                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(reply.body.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockBackend {
        addr,
        calls,
        requests,
    }
}

async fn read_request(mut socket: TcpStream) -> Option<(TcpStream, RecordedRequest)> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut request = RecordedRequest {
        head,
        body: buf[head_end..].to_vec(),
    };
    let content_length: usize = request
        .header("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    while request.body.len() < content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        request.body.extend_from_slice(&chunk[..n]);
    }

    Some((socket, request))
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Run the proxy on an ephemeral port. Keep the `Shutdown` alive for the test.
pub async fn start_proxy(
    mut config: ProxyConfig,
) -> (SocketAddr, Shutdown, tokio::task::JoinHandle<Result<(), std::io::Error>>) {
    config.listener.host = "127.0.0.1".into();
    config.listener.port = 0;

    let listener = Listener::bind(&config.listener).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, false);
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    (addr, shutdown, handle)
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
