use serde::{Deserialize, Serialize};

/// Inbound request body for POST /get-loans.
/// No range validation — the fields are interpolated into the prompt as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct FarmerRequest {
    /// Annual income in rupees.
    pub earning: i64,
    pub location: String,
    pub crop: String,
}

/// One structured loan suggestion extracted from the model's reply.
/// All fields are free-form text: `amount` and `chance` are whatever the
/// model printed (e.g. "₹50,000", "85%"), `link` is an unvalidated URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_name: String,
    pub bank: String,
    pub amount: String,
    pub chance: String,
    pub link: String,
}
