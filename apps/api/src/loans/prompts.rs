//! Prompt construction for loan suggestions.
//!
//! The prompt is a deterministic template: the three farmer fields are
//! substituted into a fixed instruction, followed by output-shape
//! instructions matching the configured response format. No branching
//! depends on input values beyond substitution.

use crate::config::ResponseFormat;
use crate::loans::models::FarmerRequest;

const BASE_TEMPLATE: &str = r#"You are an expert government loan and microfinance assistant for Indian farmers.

Given the following:
- Location: {location}
- Annual Income: ₹{earning}
- Crop: {crop}

Suggest up to 5 relevant government or microfinance loan schemes for this farmer.
"#;

const JSON_INSTRUCTIONS: &str = r#"
Return the response **only as a JSON array** with the following fields:
- loan_name
- bank
- amount
- chance
- link

Example output format:
[
  {
    "loan_name": "Kisan Credit Card",
    "bank": "State Bank of India",
    "amount": "₹50,000",
    "chance": "85%",
    "link": "https://example.com/kcc"
  }
]
Do not include any explanation — return only the JSON.
"#;

const KEY_VALUE_INSTRUCTIONS: &str = r#"
Return the response as plain text with exactly one "key: value" pair per line,
using these 25 keys (for i from 1 to 5):
loan{i}_name, loan{i}_bank, loan{i}_amount, loan{i}_chance, loan{i}_link

Example:
loan1_name: Kisan Credit Card
loan1_bank: State Bank of India
loan1_amount: ₹50,000
loan1_chance: 85%
loan1_link: https://example.com/kcc

Do not include any explanation — return only the key-value lines.
"#;

const TABLE_INSTRUCTIONS: &str = r#"
Return the response as a pipe-delimited table with this exact header row:
Loan Name | Bank | Amount (₹) | Chance (%) | Link

followed by one row per loan scheme, five columns per row.

Do not include any explanation — return only the table.
"#;

const RAW_INSTRUCTIONS: &str = r#"
Describe each scheme in plain text: its name, the issuing bank, the loan
amount, the approval chance, and a link to apply.
"#;

/// Builds the full prompt for one request under the configured format.
pub fn build_prompt(request: &FarmerRequest, format: ResponseFormat) -> String {
    let base = BASE_TEMPLATE
        .replace("{location}", &request.location)
        .replace("{earning}", &request.earning.to_string())
        .replace("{crop}", &request.crop);

    let instructions = match format {
        ResponseFormat::Raw => RAW_INSTRUCTIONS,
        ResponseFormat::KeyValue => KEY_VALUE_INSTRUCTIONS,
        ResponseFormat::Json => JSON_INSTRUCTIONS,
        ResponseFormat::Table => TABLE_INSTRUCTIONS,
    };

    format!("{base}{instructions}")
}
