use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{enabled_builds, Artifact, ArtifactSetId, BuildEntry};
use super::orchestrator::RunState;
use super::service::{ScoringService, SubmitOutcome};

/// Router builder exposing HTTP endpoints for scoring submission and status.
pub fn scoring_router(service: Arc<ScoringService>) -> Router {
    Router::new()
        .route(
            "/api/v1/artifacts/:artifact_set_id/score",
            post(submit_handler).get(status_handler),
        )
        .with_state(service)
}

/// Boundary payload: the artifact list plus the configured build map. The
/// enabled flag is honored here, so the engine only ever sees enabled
/// builds.
#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    artifacts: Vec<Artifact>,
    #[serde(default)]
    builds: BTreeMap<String, BuildEntry>,
}

pub(crate) async fn submit_handler(
    State(service): State<Arc<ScoringService>>,
    Path(artifact_set_id): Path<String>,
    axum::Json(payload): axum::Json<ScoreRequest>,
) -> Response {
    let set_id = ArtifactSetId(artifact_set_id);
    let builds = enabled_builds(payload.builds);

    match service.submit(set_id, payload.artifacts, builds) {
        SubmitOutcome::Complete {
            fingerprint,
            tables,
        } => {
            let payload = json!({
                "state": RunState::Complete.label(),
                "fingerprint": fingerprint.to_string(),
                "results": &*tables,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        SubmitOutcome::Started { fingerprint } | SubmitOutcome::AlreadyRunning { fingerprint } => {
            let payload = json!({
                "state": RunState::Running.label(),
                "fingerprint": fingerprint.to_string(),
            });
            (StatusCode::ACCEPTED, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn status_handler(
    State(service): State<Arc<ScoringService>>,
    Path(artifact_set_id): Path<String>,
) -> Response {
    let set_id = ArtifactSetId(artifact_set_id);
    match service.status(&set_id) {
        Some(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        None => {
            let payload = json!({
                "state": RunState::Idle.label(),
                "error": "no scoring run for this artifact set",
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}
