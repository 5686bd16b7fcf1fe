//! SMS ingest endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Redirect;
use axum::{Form, Json};

use crate::parse;
use crate::persistence::Transaction;
use crate::server::state::AppState;
use crate::server::types::{ErrorResponse, IngestForm, IngestRequest, IngestResponse, SeedResponse};

/// Sample messages mirrored from the original seed data
const SAMPLE_MESSAGES: [&str; 5] = [
    "[현대카드] 10/07 13:45 12,300원 일시불 CU당산점 승인",
    "[신한카드] 10/07 08:12 5,500원 카카오T 서울택시 승인",
    "[국민카드] 10/06 19:03 18,000원 일시불 배달의민족 승인",
    "[현대카드] 10/06 19:05 18,000원 취소 배달의민족",
    "[STARBUCKS] 10/05 09:10 4,800원 일시불 STARBUCKS 영등포 승인",
];

type ApiError = (StatusCode, Json<ErrorResponse>);

fn internal(e: anyhow::Error) -> ApiError {
    tracing::error!(error = %e, "transaction write failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// POST /ingest - parse a pasted SMS line and redirect to its day
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Form(form): Form<IngestForm>,
) -> Result<Redirect, ApiError> {
    let entry = parse::parse_entry(&form.raw_text, state.default_year());
    let tx = Transaction::from_entry(&entry);
    state.store.insert(&tx).await.map_err(internal)?;

    Ok(Redirect::to(&format!("/?date={}", entry.yyyy_mm_dd)))
}

/// POST /ingest-json - parse and insert, returning the parsed entry
pub async fn ingest_json(
    State(state): State<Arc<AppState>>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    let entry = parse::parse_entry(&request.raw_text, state.default_year());
    let tx = Transaction::from_entry(&entry);
    state.store.insert(&tx).await.map_err(internal)?;

    Ok(Json(IngestResponse { ok: true, entry }))
}

/// GET /seed - insert the sample messages
pub async fn seed(
    State(state): State<Arc<AppState>>,
) -> Result<Json<SeedResponse>, ApiError> {
    for raw in SAMPLE_MESSAGES {
        let entry = parse::parse_entry(raw, state.default_year());
        let tx = Transaction::from_entry(&entry);
        state.store.insert(&tx).await.map_err(internal)?;
    }

    Ok(Json(SeedResponse {
        ok: true,
        added: SAMPLE_MESSAGES.len(),
    }))
}
