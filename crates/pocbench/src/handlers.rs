//! Route handlers.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use pocbench_core::{Customer, Error, InteractionRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{app::AppState, cpu, error::ApiError};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusBody {
    pub status: &'static str,
}

pub async fn plaintext() -> &'static str {
    "Hello, World!"
}

pub async fn health() -> Json<StatusBody> {
    Json(StatusBody { status: "healthy" })
}

pub async fn json_echo(
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<StatusBody>, ApiError> {
    let _ = body.map_err(|e| ApiError::InvalidJson(e.body_text()))?;
    Ok(Json(StatusBody { status: "ok" }))
}

// ═══════════════════════════════════════════════════════════════════════════
// CPU
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
pub struct CpuRequest {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CpuResponse {
    pub processed_name: String,
}

pub async fn cpu(
    body: Result<Json<CpuRequest>, JsonRejection>,
) -> Result<Json<CpuResponse>, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::InvalidRequest)?;
    let name = request
        .name
        .filter(|n| !n.is_empty())
        .ok_or(ApiError::InvalidRequest)?;
    Ok(Json(CpuResponse {
        processed_name: cpu::process_name(&name),
    }))
}

// ═══════════════════════════════════════════════════════════════════════════
// DATABASE
// ═══════════════════════════════════════════════════════════════════════════

pub async fn db_read(State(state): State<AppState>) -> Result<Json<Customer>, ApiError> {
    state
        .coordinator
        .store()
        .find_customer(state.db_read_customer_id)
        .await
        .map_err(ApiError::Database)?
        .map(Json)
        .ok_or(ApiError::UserNotFound)
}

/// Inbound `/interaction` body. Every field is optional here so presence can
/// be reported as `INVALID_REQUEST` rather than a deserialization failure.
#[derive(Debug, Default, Deserialize)]
pub struct InteractionRequest {
    #[serde(rename = "customerId")]
    pub customer_id: Option<i64>,
    pub note: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl InteractionRequest {
    /// Field presence: all three set, strings non-blank, id non-zero.
    pub fn require_fields(self) -> Result<(i64, String, String), Error> {
        let customer_id = self
            .customer_id
            .filter(|id| *id != 0)
            .ok_or(Error::missing_field("customerId"))?;
        let note = self
            .note
            .filter(|n| !n.trim().is_empty())
            .ok_or(Error::missing_field("note"))?;
        let kind = self
            .kind
            .filter(|k| !k.trim().is_empty())
            .ok_or(Error::missing_field("type"))?;
        Ok((customer_id, note, kind))
    }
}

pub async fn create_interaction(
    State(state): State<AppState>,
    body: Result<Json<InteractionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<InteractionRecord>), ApiError> {
    let Json(request) = body.map_err(|e| ApiError::MalformedInteraction(e.body_text()))?;
    let (customer_id, note, kind) = request.require_fields()?;

    let record = state
        .coordinator
        .create_interaction(customer_id, &note, &kind)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}
