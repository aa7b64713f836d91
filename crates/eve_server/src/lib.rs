//! Read-only HTTP query surface over running macrocosms.
//!
//! Routes:
//! - `GET /api/sims`: every hosted macrocosm with its frontier
//! - `GET /api/sim/macrocosm/:id`: the flattened lattice
//! - `GET /api/sim/macrocosm/:id/system`: the persisted frames, in order

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use eve_core::Macrocosm;
use eve_data::Vector;
use eve_io::StorageManager;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Shared state: the hosted macrocosms and the frame log they append to.
pub struct AppState {
    pub macrocosms: BTreeMap<usize, Arc<Macrocosm>>,
    pub storage: Option<Arc<StorageManager>>,
}

impl AppState {
    pub fn new(macrocosms: impl IntoIterator<Item = Arc<Macrocosm>>) -> Self {
        Self {
            macrocosms: macrocosms
                .into_iter()
                .map(|m| (m.identifier(), m))
                .collect(),
            storage: None,
        }
    }

    #[must_use]
    pub fn with_storage(mut self, storage: Arc<StorageManager>) -> Self {
        self.storage = Some(storage);
        self
    }

    fn macrocosm(&self, id: usize) -> Result<Arc<Macrocosm>, Response> {
        self.macrocosms
            .get(&id)
            .cloned()
            .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("no macrocosm {}", id)))
    }
}

#[derive(Serialize, Debug)]
struct SimSummary {
    identifier: usize,
    head: [Vector; 2],
    shell: [Vector; 2],
    particles: usize,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/sims", get(get_sims))
        .route("/api/sim/macrocosm/:id", get(get_macrocosm))
        .route("/api/sim/macrocosm/:id/system", get(get_system_frames))
        .with_state(state)
}

/// REST endpoint: every hosted macrocosm with its frontier
async fn get_sims(State(state): State<Arc<AppState>>) -> Json<Vec<SimSummary>> {
    Json(
        state
            .macrocosms
            .values()
            .map(|m| {
                let frontier = m.frontier();
                SimSummary {
                    identifier: m.identifier(),
                    head: frontier.head,
                    shell: frontier.shell,
                    particles: m.len(),
                }
            })
            .collect(),
    )
}

/// REST endpoint: flattened lattice of one macrocosm
async fn get_macrocosm(State(state): State<Arc<AppState>>, Path(id): Path<usize>) -> Response {
    let macrocosm = match state.macrocosm(id) {
        Ok(m) => m,
        Err(response) => return response,
    };
    // Flattening takes the lattice lock once per point; keep it off the
    // async workers.
    match tokio::task::spawn_blocking(move || macrocosm.flatten()).await {
        Ok(flat) => Json(flat).into_response(),
        Err(e) => {
            tracing::error!(macrocosm = id, "Flatten task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to flatten macrocosm")
        }
    }
}

/// REST endpoint: persisted system frames of one macrocosm
async fn get_system_frames(
    State(state): State<Arc<AppState>>,
    Path(id): Path<usize>,
) -> Response {
    if let Err(response) = state.macrocosm(id) {
        return response;
    }
    let Some(storage) = state.storage.clone() else {
        return Json(Vec::<eve_io::StoredFrame>::new()).into_response();
    };
    match tokio::task::spawn_blocking(move || storage.frames(id)).await {
        Ok(Ok(frames)) => Json(frames).into_response(),
        Ok(Err(e)) => {
            tracing::error!(macrocosm = id, "Failed to query frames: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to query storage")
        }
        Err(e) => {
            tracing::error!(macrocosm = id, "Frame query task failed: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to query storage")
        }
    }
}
