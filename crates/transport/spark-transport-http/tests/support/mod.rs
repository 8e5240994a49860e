//! 集成测试共用的 HTTP 回显服务。
//!
//! 服务以 `axum` 构建，运行在独立线程的 Tokio current-thread 运行时上；每个请求先被完整记录，
//! 再按 [`Reply`] 回复。连接数经 `tap_io` 在接受连接时累计。

#![allow(dead_code)]

use std::{
    future::IntoFuture,
    net::{SocketAddr, TcpListener as StdListener},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread::JoinHandle,
};

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::IntoResponse,
    routing::post,
    serve::ListenerExt,
};
use parking_lot::Mutex;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::oneshot,
};

#[derive(Clone, Copy, Debug)]
pub enum Reply {
    /// `200 OK`，响应体为请求体原样。
    Echo,
    /// 给定状态码，空响应体。
    Status(u16),
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect()
    }
}

#[derive(Debug)]
struct Shared {
    reply: Reply,
    requests: Mutex<Vec<RecordedRequest>>,
    connections: AtomicUsize,
}

pub struct EchoServer {
    addr: SocketAddr,
    shared: Arc<Shared>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl EchoServer {
    pub fn start(reply: Reply) -> Self {
        let listener = StdListener::bind("127.0.0.1:0").expect("bind echo server");
        listener
            .set_nonblocking(true)
            .expect("switch listener to non-blocking");
        let addr = listener.local_addr().expect("echo server address");
        let shared = Arc::new(Shared {
            reply,
            requests: Mutex::new(Vec::new()),
            connections: AtomicUsize::new(0),
        });
        let (shutdown, stop) = oneshot::channel::<()>();

        let served = Arc::clone(&shared);
        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("echo server runtime");
            runtime.block_on(async move {
                let counter = Arc::clone(&served);
                let listener = TcpListener::from_std(listener)
                    .expect("register listener")
                    .tap_io(move |_stream: &mut TcpStream| {
                        counter.connections.fetch_add(1, Ordering::SeqCst);
                    });
                let app = Router::new().route("/rpc", post(record)).with_state(served);
                let server = axum::serve(listener, app).into_future();
                tokio::select! {
                    _ = stop => {}
                    result = server => result.expect("echo server stopped"),
                }
            });
        });

        Self {
            addr,
            shared,
            shutdown: Some(shutdown),
            thread: Some(thread),
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/rpc", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.requests.lock().clone()
    }

    /// 已接受的 TCP 连接数。
    pub fn connections(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }
}

impl Drop for EchoServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// 返回一个当前无人监听的本地地址。
pub fn unreachable_url() -> String {
    let listener = StdListener::bind("127.0.0.1:0").expect("bind placeholder listener");
    let addr = listener.local_addr().expect("placeholder address");
    drop(listener);
    format!("http://{addr}/rpc")
}

async fn record(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let (status, reply) = match shared.reply {
        Reply::Echo => (StatusCode::OK, body.clone()),
        Reply::Status(code) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Bytes::new(),
        ),
    };
    shared.requests.lock().push(RecordedRequest {
        method,
        uri,
        headers,
        body,
    });
    (status, [(header::CONTENT_TYPE, "application/x-thrift")], reply)
}
