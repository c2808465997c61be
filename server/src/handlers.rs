use std::path::PathBuf;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use pdfmark_shared::AnnotationSet;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::error::{AppError, Result};
use crate::logic::{normalize_document_id, prepare_for_storage};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct SaveResponse {
    message: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn document_id(raw: &str) -> Result<String> {
    normalize_document_id(raw)
        .ok_or_else(|| AppError::BadRequest(format!("invalid document id {raw:?}")))
}

pub async fn get_annotations(
    Path(pdf_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AnnotationSet>> {
    let pdf_id = document_id(&pdf_id)?;
    let set = state.storage.load(&pdf_id).await?.unwrap_or_default();
    tracing::debug!(
        "loaded {} highlights and {} strokes for {pdf_id}",
        set.highlights.len(),
        set.strokes.len()
    );
    Ok(Json(set))
}

/// Replaces everything stored for the document with the request body.
pub async fn put_annotations(
    Path(pdf_id): Path<String>,
    State(state): State<AppState>,
    payload: std::result::Result<Json<AnnotationSet>, JsonRejection>,
) -> Result<Json<SaveResponse>> {
    let pdf_id = document_id(&pdf_id)?;
    let Json(set) = payload?;
    let set = prepare_for_storage(set)?;
    state.storage.save(&pdf_id, &set).await?;
    tracing::info!(
        "saved {} highlights and {} strokes for {pdf_id}",
        set.highlights.len(),
        set.strokes.len()
    );
    Ok(Json(SaveResponse {
        message: "Annotations saved successfully".to_string(),
    }))
}

pub fn router(state: AppState, public_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/health", get(health_check))
        .route(
            "/pdfs/:pdf_id/annotations",
            get(get_annotations)
                .put(put_annotations)
                .post(put_annotations),
        );
    if let Some(public_dir) = public_dir {
        app = app.fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true));
    }
    app.layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
