use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::loans::interpreter::ResponseInterpreter;

/// Shared application state injected into route handlers via Axum extractors.
/// Entirely stateless across requests: the model client holds only a fixed
/// credential and the interpreter is pure.
#[derive(Clone)]
pub struct AppState {
    /// The text-generation backend. `Arc<dyn TextGenerator>` so tests can
    /// substitute a canned fake for the real Gemini client.
    pub model: Arc<dyn TextGenerator>,
    /// The response interpreter chosen at startup via LOAN_RESPONSE_FORMAT.
    pub interpreter: Arc<dyn ResponseInterpreter>,
    pub config: Config,
}
