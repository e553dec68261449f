//! Operator-facing HTTP endpoint.
//!
//! - `GET /`        liveness text
//! - `GET /logs`    most recent log lines as a JSON array, oldest first
//! - `GET /metrics` Prometheus text format

use std::convert::Infallible;
use std::net::SocketAddr;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::log_buffer::LogBuffer;
use crate::metrics;

pub const LIVENESS_TEXT: &str = "🤖 Comment responder is running";

/// Shared state behind the routes.
#[derive(Debug, Clone)]
pub struct StatusState {
    logs: LogBuffer,
    log_lines: usize,
}

impl StatusState {
    pub fn new(logs: LogBuffer, log_lines: usize) -> Self {
        Self { logs, log_lines }
    }
}

fn text_response(status: StatusCode, content_type: &str, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    if let Ok(value) = content_type.parse() {
        response
            .headers_mut()
            .insert(hyper::header::CONTENT_TYPE, value);
    }
    response
}

fn logs_response(state: &StatusState) -> Response<Full<Bytes>> {
    let lines = state.logs.recent(state.log_lines);
    match serde_json::to_vec(&lines) {
        Ok(body) => text_response(StatusCode::OK, "application/json", body),
        Err(err) => {
            error!("Failed to encode log lines: {}", err);
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "text/plain", "encode error")
        }
    }
}

fn metrics_response() -> Response<Full<Bytes>> {
    match metrics::render() {
        Ok((content_type, body)) => text_response(StatusCode::OK, &content_type, body),
        Err(err) => {
            error!("Failed to encode metrics: {}", err);
            text_response(StatusCode::INTERNAL_SERVER_ERROR, "text/plain", "encode error")
        }
    }
}

/// Route a request; used by the server and directly by tests.
pub fn route(method: &Method, path: &str, state: &StatusState) -> Response<Full<Bytes>> {
    if method != Method::GET {
        return text_response(StatusCode::METHOD_NOT_ALLOWED, "text/plain", Bytes::new());
    }
    match path {
        "/" => text_response(StatusCode::OK, "text/plain; charset=utf-8", LIVENESS_TEXT),
        "/logs" => logs_response(state),
        "/metrics" => metrics_response(),
        _ => text_response(StatusCode::NOT_FOUND, "text/plain", Bytes::new()),
    }
}

async fn handle_request(
    req: Request<Incoming>,
    state: StatusState,
) -> Result<Response<Full<Bytes>>, Infallible> {
    Ok(route(req.method(), req.uri().path(), &state))
}

/// Accept connections on an already bound listener until the task is dropped.
pub async fn serve(listener: TcpListener, state: StatusState) -> anyhow::Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| handle_request(req, state.clone()));
            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                warn!(?peer, "Status connection error: {}", err);
            }
        });
    }
}

/// Bind `addr` and spawn the status endpoint.
pub async fn spawn_status_server(addr: SocketAddr, state: StatusState) -> anyhow::Result<SocketAddr> {
    metrics::init_collectors();
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "Status endpoint started");

    tokio::spawn(async move {
        if let Err(err) = serve(listener, state).await {
            error!(addr = %local, "Status server failed: {}", err);
        }
    });
    Ok(local)
}
