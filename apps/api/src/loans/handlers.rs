//! Axum route handler for the loan suggestion endpoint.

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::config::ResponseFormat;
use crate::errors::AppError;
use crate::llm_client::TextGenerator;
use crate::loans::interpreter::{Interpreted, ResponseInterpreter};
use crate::loans::models::FarmerRequest;
use crate::loans::prompts::build_prompt;
use crate::state::AppState;

/// POST /get-loans
///
/// Forwards the farmer's attributes to the model and returns either the
/// interpreted loan records or, under the raw format, the trimmed reply
/// as a JSON string.
pub async fn handle_get_loans(
    State(state): State<AppState>,
    Json(request): Json<FarmerRequest>,
) -> Result<Response, AppError> {
    let result = suggest_loans(
        state.model.as_ref(),
        state.interpreter.as_ref(),
        state.config.response_format,
        &request,
    )
    .await?;

    Ok(match result {
        Interpreted::Records(records) => Json(records).into_response(),
        Interpreted::Raw(text) => Json(text).into_response(),
    })
}

/// Core pipeline: prompt → single model call → interpretation.
/// Stateless; the response is derived solely from the one reply and the
/// configured interpreter.
pub async fn suggest_loans(
    model: &dyn TextGenerator,
    interpreter: &dyn ResponseInterpreter,
    format: ResponseFormat,
    request: &FarmerRequest,
) -> Result<Interpreted, AppError> {
    let prompt = build_prompt(request, format);

    let raw = model
        .generate(&prompt)
        .await
        .map_err(|e| AppError::Model(e.to_string()))?;

    // Diagnostic only — the raw reply is logged before any interpretation.
    debug!("raw model output:\n{raw}");

    Ok(interpreter.interpret(&raw)?)
}
