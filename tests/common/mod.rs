//! In-process stand-in for the coordination service.
#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use tokio::net::TcpListener;

pub const TOKEN: &str = "abc";

#[derive(Default)]
pub struct ServiceState {
    /// Lock calls answered with 409 before one is granted.
    pub busy_for: usize,
    pub refresh_rejected: bool,
    pub unlock_rejected: bool,
    pub inspect_status: Option<StatusCode>,
    /// `(operation, mutex name)` in arrival order.
    pub hits: Vec<(&'static str, String)>,
}

#[derive(Clone, Default)]
pub struct MutexService {
    state: Arc<Mutex<ServiceState>>,
}

impl MutexService {
    pub fn configure(&self, f: impl FnOnce(&mut ServiceState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn hits(&self) -> Vec<(&'static str, String)> {
        self.state.lock().unwrap().hits.clone()
    }

    pub fn count(&self, operation: &str) -> usize {
        self.hits().iter().filter(|(op, _)| *op == operation).count()
    }

    /// Serves on an ephemeral local port and returns the base address.
    pub async fn start(&self) -> String {
        let app = Router::new()
            .route("/v1/mutex/:name", get(inspect))
            .route("/v1/mutex/:name/lock", get(lock))
            .route("/v1/mutex/:name/refresh/:token", get(refresh))
            .route("/v1/mutex/:name/unlock/:token", get(unlock))
            .with_state(self.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }
}

/// An address nothing listens on.
pub async fn dead_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn grant_body() -> String {
    format!(
        r#"{{"token":"{}","expiresAt":"2030-01-01T00:00:00Z"}}"#,
        TOKEN
    )
}

async fn inspect(State(service): State<MutexService>, Path(name): Path<String>) -> impl IntoResponse {
    let mut state = service.state.lock().unwrap();
    state.hits.push(("inspect", name.clone()));
    match state.inspect_status {
        Some(status) => (status, String::new()),
        None => (
            StatusCode::OK,
            format!(r#"{{"name":"{}","locked":true}}"#, name),
        ),
    }
}

async fn lock(State(service): State<MutexService>, Path(name): Path<String>) -> impl IntoResponse {
    let mut state = service.state.lock().unwrap();
    state.hits.push(("lock", name));
    if state.busy_for > 0 {
        state.busy_for -= 1;
        (StatusCode::CONFLICT, "locked".to_string())
    } else {
        (StatusCode::OK, grant_body())
    }
}

async fn refresh(
    State(service): State<MutexService>,
    Path((name, token)): Path<(String, String)>,
) -> impl IntoResponse {
    let mut state = service.state.lock().unwrap();
    state.hits.push(("refresh", name));
    if state.refresh_rejected || token != TOKEN {
        (StatusCode::NOT_FOUND, String::new())
    } else {
        (StatusCode::OK, grant_body())
    }
}

async fn unlock(
    State(service): State<MutexService>,
    Path((name, token)): Path<(String, String)>,
) -> impl IntoResponse {
    let mut state = service.state.lock().unwrap();
    state.hits.push(("unlock", name));
    if state.unlock_rejected || token != TOKEN {
        (StatusCode::NOT_FOUND, String::new())
    } else {
        (StatusCode::OK, r#"{"unlocked":true}"#.to_string())
    }
}
