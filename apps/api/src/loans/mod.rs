//! Loan suggestion endpoint: prompt construction, the single model call,
//! and response interpretation.

pub mod handlers;
pub mod interpreter;
pub mod models;
pub mod prompts;
