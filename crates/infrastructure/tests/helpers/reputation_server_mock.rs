#![allow(dead_code)]
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub const RANKING_PATH: &str = "/domain/ranking";

/// How the mock answers a given domain.
#[derive(Debug, Clone)]
pub enum MockAnswer {
    Score(f64, Vec<&'static str>),
    Throttled(Option<&'static str>),
    Status(u16, &'static str),
    Raw(&'static str),
}

#[derive(Default)]
struct MockState {
    answers: HashMap<String, MockAnswer>,
    auth_seen: Mutex<Vec<Option<String>>>,
    requests: Mutex<Vec<String>>,
}

/// Local HTTP server standing in for the reputation service.
///
/// Serves `GET /domain/ranking/{domain}`; unknown domains get a score of 50.
pub struct MockReputationServer {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockReputationServer {
    pub async fn start(
        answers: Vec<(&str, MockAnswer)>,
    ) -> Result<(Self, SocketAddr), std::io::Error> {
        let state = Arc::new(MockState {
            answers: answers
                .into_iter()
                .map(|(domain, answer)| (domain.to_string(), answer))
                .collect(),
            ..Default::default()
        });

        let app = Router::new()
            .route("/domain/ranking/{domain}", get(ranking))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let local_addr = listener.local_addr()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok((
            Self {
                addr: local_addr,
                state,
                shutdown_tx: Some(shutdown_tx),
            },
            local_addr,
        ))
    }

    pub fn base_url(&self) -> String {
        format!("http://{}{}", self.addr, RANKING_PATH)
    }

    pub fn auth_seen(&self) -> Vec<Option<String>> {
        self.state.auth_seen.lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }
}

impl Drop for MockReputationServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn ranking(
    State(state): State<Arc<MockState>>,
    Path(domain): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.auth_seen.lock().unwrap().push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    );
    state.requests.lock().unwrap().push(domain.clone());

    match state.answers.get(&domain).cloned() {
        None => Json(json!({ "reputation": 50, "categories": [] })).into_response(),
        Some(MockAnswer::Score(score, categories)) => {
            Json(json!({ "reputation": score, "categories": categories })).into_response()
        }
        Some(MockAnswer::Throttled(retry_after)) => {
            let mut response = StatusCode::TOO_MANY_REQUESTS.into_response();
            if let Some(value) = retry_after {
                response
                    .headers_mut()
                    .insert("retry-after", HeaderValue::from_static(value));
            }
            response
        }
        Some(MockAnswer::Status(code, body)) => (
            StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
        )
            .into_response(),
        Some(MockAnswer::Raw(body)) => (StatusCode::OK, body).into_response(),
    }
}
