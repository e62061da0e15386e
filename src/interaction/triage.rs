//! The triage endpoint and the pipeline behind it.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::{info, instrument, warn};

use crate::{
    base::{
        error::TriageError,
        prompts::build_prompt,
        types::{TicketPayload, TriageResult},
    },
    runtime::Runtime,
    service::llm::LlmClient,
};

/// `POST /triage`.
#[instrument(skip_all)]
pub async fn handle_triage(State(runtime): State<Runtime>, payload: Result<Json<TicketPayload>, JsonRejection>) -> Result<Json<TriageResult>, TriageError> {
    let Json(payload) = payload.map_err(|rejection| TriageError::InvalidTicket(rejection.body_text()))?;

    triage_ticket(payload, &runtime.llm).await.map(Json)
}

/// Triage a single ticket with one model call.
///
/// Either the whole result validates, or the request fails; nothing is retried.
#[instrument(skip_all, fields(ticket_id = %payload.ticket_id))]
pub async fn triage_ticket(payload: TicketPayload, llm: &LlmClient) -> Result<TriageResult, TriageError> {
    payload.validate()?;

    let prompt = build_prompt(&payload);

    let output = llm.generate_triage(&prompt).await.map_err(|err| {
        warn!("{} call failed: {err:#}", llm.provider_name());

        TriageError::Upstream {
            provider: llm.provider_name(),
            message: format!("{err:#}"),
        }
    })?;

    let result = TriageResult::from_model_value(output.into_value()?, &payload.ticket_id)?;

    info!(intent = ?result.intent, priority = ?result.priority, "Ticket triaged.");

    Ok(result)
}
