//! Request and response types for the HTTP service

use serde::{Deserialize, Serialize};

use crate::parse::ParsedEntry;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query string for the daily view: /?date=2024-10-07
#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

/// Form body for POST /ingest
#[derive(Debug, Deserialize)]
pub struct IngestForm {
    pub raw_text: String,
}

/// JSON body for POST /ingest-json
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub raw_text: String,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub ok: bool,
    pub entry: ParsedEntry,
}

#[derive(Debug, Serialize)]
pub struct SeedResponse {
    pub ok: bool,
    pub added: usize,
}
