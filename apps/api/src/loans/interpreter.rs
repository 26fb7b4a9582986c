//! Response interpreters — convert the model's raw text reply into loan
//! records (or a raw blob), one strategy per configured output shape.
//!
//! Every interpreter has the same signature: raw text in, `Interpreted`
//! out. Strategy selection happens once at startup; `AppState` carries
//! the chosen interpreter as `Arc<dyn ResponseInterpreter>`.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::config::ResponseFormat;
use crate::loans::models::LoanRecord;

/// The prompt asks for at most five suggestions; interpreters never
/// return more than this even if the model over-delivers.
const MAX_LOANS: usize = 5;

/// What an interpreter produced from one reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interpreted {
    Records(Vec<LoanRecord>),
    Raw(String),
}

#[derive(Debug, Error)]
pub enum InterpretError {
    /// The reply was not parseable in the expected shape at all.
    #[error("malformed model response")]
    Malformed,

    /// The reply parsed, but a record was missing a required field.
    #[error("{0}")]
    InvalidRecord(String),

    /// The reply parsed, but produced zero records.
    #[error("no loan records found in model response")]
    NoResults,
}

impl From<InterpretError> for crate::errors::AppError {
    fn from(err: InterpretError) -> Self {
        use crate::errors::AppError;
        match err {
            InterpretError::Malformed => AppError::MalformedResponse,
            InterpretError::InvalidRecord(msg) => AppError::InvalidRecord(msg),
            InterpretError::NoResults => {
                AppError::NoResults("no loan records found in model response".to_string())
            }
        }
    }
}

/// One parsing strategy. Implementations must be pure: the result is a
/// function of the raw text alone.
pub trait ResponseInterpreter: Send + Sync {
    fn interpret(&self, raw: &str) -> Result<Interpreted, InterpretError>;
}

/// Returns the interpreter matching the configured response format.
pub fn interpreter_for(format: ResponseFormat) -> Arc<dyn ResponseInterpreter> {
    match format {
        ResponseFormat::Raw => Arc::new(PassthroughInterpreter),
        ResponseFormat::KeyValue => Arc::new(KeyValueInterpreter),
        ResponseFormat::Json => Arc::new(JsonInterpreter),
        ResponseFormat::Table => Arc::new(TableInterpreter),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Passthrough
// ────────────────────────────────────────────────────────────────────────────

/// Returns the trimmed reply verbatim. Never fails on content.
pub struct PassthroughInterpreter;

impl ResponseInterpreter for PassthroughInterpreter {
    fn interpret(&self, raw: &str) -> Result<Interpreted, InterpretError> {
        Ok(Interpreted::Raw(raw.trim().to_string()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Key-value lines
// ────────────────────────────────────────────────────────────────────────────

/// Rebuilds exactly five records from `loan{i}_*` keys in "key: value"
/// lines. Missing or malformed keys degrade to empty fields rather than
/// errors — the output shape is always five records, so there is no
/// empty-result condition to report.
pub struct KeyValueInterpreter;

impl ResponseInterpreter for KeyValueInterpreter {
    fn interpret(&self, raw: &str) -> Result<Interpreted, InterpretError> {
        let mut fields: HashMap<&str, &str> = HashMap::new();
        for line in raw.lines() {
            if let Some((key, value)) = line.split_once(':') {
                fields.insert(key.trim(), value.trim());
            }
        }

        let lookup = |key: &str| fields.get(key).copied().unwrap_or_default().to_string();

        let records = (1..=MAX_LOANS)
            .map(|i| LoanRecord {
                loan_name: lookup(&format!("loan{i}_name")),
                bank: lookup(&format!("loan{i}_bank")),
                amount: lookup(&format!("loan{i}_amount")),
                chance: lookup(&format!("loan{i}_chance")),
                link: lookup(&format!("loan{i}_link")),
            })
            .collect();

        Ok(Interpreted::Records(records))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Schema-validated JSON
// ────────────────────────────────────────────────────────────────────────────

/// Parses the reply as a JSON array and validates each element carries
/// the five required string fields. Parse failure, field absence, and an
/// empty array are three distinct failures.
pub struct JsonInterpreter;

impl ResponseInterpreter for JsonInterpreter {
    fn interpret(&self, raw: &str) -> Result<Interpreted, InterpretError> {
        let text = strip_json_fences(raw);

        let value: Value = serde_json::from_str(text).map_err(|_| InterpretError::Malformed)?;
        let items = value.as_array().ok_or(InterpretError::Malformed)?;

        let records = items
            .iter()
            .take(MAX_LOANS)
            .map(record_from_json)
            .collect::<Result<Vec<_>, _>>()?;

        if records.is_empty() {
            return Err(InterpretError::NoResults);
        }

        Ok(Interpreted::Records(records))
    }
}

fn record_from_json(item: &Value) -> Result<LoanRecord, InterpretError> {
    let field = |name: &str| {
        item.get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| InterpretError::InvalidRecord(format!("missing field '{name}'")))
    };

    Ok(LoanRecord {
        loan_name: field("loan_name")?,
        bank: field("bank")?,
        amount: field("amount")?,
        chance: field("chance")?,
        link: field("link")?,
    })
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pipe-delimited table
// ────────────────────────────────────────────────────────────────────────────

/// Scans the reply for 5-column pipe-delimited rows, excluding the header
/// and markdown separator rows. Rows that do not split into exactly five
/// cells are skipped; zero matching rows is an empty-result failure.
pub struct TableInterpreter;

impl ResponseInterpreter for TableInterpreter {
    fn interpret(&self, raw: &str) -> Result<Interpreted, InterpretError> {
        let records: Vec<LoanRecord> = raw
            .lines()
            .filter(|line| line.contains('|'))
            .filter_map(parse_table_row)
            .take(MAX_LOANS)
            .collect();

        if records.is_empty() {
            return Err(InterpretError::NoResults);
        }

        Ok(Interpreted::Records(records))
    }
}

fn parse_table_row(line: &str) -> Option<LoanRecord> {
    let cells: Vec<&str> = line.split('|').map(str::trim).collect();
    if cells.len() != 5 {
        return None;
    }
    if is_header_row(&cells) || is_separator_row(&cells) {
        return None;
    }

    Some(LoanRecord {
        loan_name: cells[0].to_string(),
        bank: cells[1].to_string(),
        amount: cells[2].to_string(),
        chance: cells[3].to_string(),
        link: cells[4].to_string(),
    })
}

fn is_header_row(cells: &[&str]) -> bool {
    cells[0].eq_ignore_ascii_case("loan name")
}

fn is_separator_row(cells: &[&str]) -> bool {
    cells
        .iter()
        .all(|cell| !cell.is_empty() && cell.chars().all(|c| c == '-' || c == ':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(result: Result<Interpreted, InterpretError>) -> Vec<LoanRecord> {
        match result.unwrap() {
            Interpreted::Records(records) => records,
            Interpreted::Raw(_) => panic!("expected records"),
        }
    }

    // ── Passthrough ─────────────────────────────────────────────────────

    #[test]
    fn test_passthrough_returns_trimmed_text_verbatim() {
        let raw = "\n  Here are some loan schemes for you.  \n";
        let result = PassthroughInterpreter.interpret(raw).unwrap();
        assert_eq!(
            result,
            Interpreted::Raw("Here are some loan schemes for you.".to_string())
        );
    }

    // ── Key-value ───────────────────────────────────────────────────────

    #[test]
    fn test_key_value_partial_input_pads_to_five_records() {
        let raw = "loan1_name: Kisan Credit Card\nloan1_bank: SBI";
        let records = records(KeyValueInterpreter.interpret(raw));

        assert_eq!(records.len(), 5);
        assert_eq!(records[0].loan_name, "Kisan Credit Card");
        assert_eq!(records[0].bank, "SBI");
        assert_eq!(records[0].amount, "");
        assert_eq!(records[0].chance, "");
        assert_eq!(records[0].link, "");
        for record in &records[1..] {
            assert_eq!(*record, LoanRecord::default());
        }
    }

    #[test]
    fn test_key_value_full_block_fills_all_fields() {
        let mut raw = String::new();
        for i in 1..=5 {
            raw.push_str(&format!(
                "loan{i}_name: Scheme {i}\nloan{i}_bank: Bank {i}\nloan{i}_amount: ₹{i}0,000\nloan{i}_chance: {i}0%\nloan{i}_link: https://example.com/{i}\n"
            ));
        }
        let records = records(KeyValueInterpreter.interpret(&raw));

        assert_eq!(records.len(), 5);
        assert_eq!(records[2].loan_name, "Scheme 3");
        assert_eq!(records[2].amount, "₹30,000");
        assert_eq!(records[4].link, "https://example.com/5");
    }

    #[test]
    fn test_key_value_ignores_lines_without_delimiter() {
        let raw = "Here are the loans\nloan1_name: KCC\nThanks!";
        let records = records(KeyValueInterpreter.interpret(raw));
        assert_eq!(records[0].loan_name, "KCC");
    }

    #[test]
    fn test_key_value_trims_value_whitespace() {
        let raw = "loan1_name:   Kisan Credit Card   ";
        let records = records(KeyValueInterpreter.interpret(raw));
        assert_eq!(records[0].loan_name, "Kisan Credit Card");
    }

    // ── JSON ────────────────────────────────────────────────────────────

    const JSON_THREE: &str = r#"[
        {"loan_name": "Kisan Credit Card", "bank": "SBI", "amount": "₹50,000", "chance": "85%", "link": "https://example.com/kcc"},
        {"loan_name": "PM-Kisan", "bank": "NABARD", "amount": "₹6,000", "chance": "90%", "link": "https://example.com/pmkisan"},
        {"loan_name": "Mudra Loan", "bank": "Bank of Baroda", "amount": "₹1,00,000", "chance": "60%", "link": "https://example.com/mudra"}
    ]"#;

    #[test]
    fn test_json_three_elements_copied_verbatim() {
        let records = records(JsonInterpreter.interpret(JSON_THREE));

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].loan_name, "Kisan Credit Card");
        assert_eq!(records[0].bank, "SBI");
        assert_eq!(records[0].amount, "₹50,000");
        assert_eq!(records[0].chance, "85%");
        assert_eq!(records[0].link, "https://example.com/kcc");
        assert_eq!(records[2].loan_name, "Mudra Loan");
    }

    #[test]
    fn test_json_accepts_fenced_output() {
        let fenced = format!("```json\n{JSON_THREE}\n```");
        let records = records(JsonInterpreter.interpret(&fenced));
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_json_non_json_is_malformed() {
        let result = JsonInterpreter.interpret("not json");
        assert!(matches!(result, Err(InterpretError::Malformed)));
    }

    #[test]
    fn test_json_object_instead_of_array_is_malformed() {
        let result = JsonInterpreter.interpret(r#"{"loan_name": "KCC"}"#);
        assert!(matches!(result, Err(InterpretError::Malformed)));
    }

    #[test]
    fn test_json_empty_array_is_no_results() {
        let result = JsonInterpreter.interpret("[]");
        assert!(matches!(result, Err(InterpretError::NoResults)));
    }

    #[test]
    fn test_json_missing_field_is_invalid_record() {
        let raw = r#"[{"loan_name": "KCC", "bank": "SBI", "amount": "₹50,000", "chance": "85%"}]"#;
        let result = JsonInterpreter.interpret(raw);
        match result {
            Err(InterpretError::InvalidRecord(msg)) => assert!(msg.contains("link")),
            other => panic!("expected InvalidRecord, got {other:?}"),
        }
    }

    #[test]
    fn test_json_caps_at_five_records() {
        let element = r#"{"loan_name": "X", "bank": "Y", "amount": "1", "chance": "2", "link": "3"}"#;
        let raw = format!("[{}]", vec![element; 7].join(","));
        let records = records(JsonInterpreter.interpret(&raw));
        assert_eq!(records.len(), 5);
    }

    // ── Table ───────────────────────────────────────────────────────────

    #[test]
    fn test_table_header_excluded_and_cells_trimmed() {
        let raw = "Loan Name | Bank | Amount (₹) | Chance (%) | Link\nKCC | SBI | ₹50000 | 85% | http://x";
        let records = records(TableInterpreter.interpret(raw));

        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0],
            LoanRecord {
                loan_name: "KCC".to_string(),
                bank: "SBI".to_string(),
                amount: "₹50000".to_string(),
                chance: "85%".to_string(),
                link: "http://x".to_string(),
            }
        );
    }

    #[test]
    fn test_table_skips_markdown_separator_row() {
        let raw = "Loan Name | Bank | Amount (₹) | Chance (%) | Link\n--- | --- | --- | --- | ---\nKCC | SBI | ₹50000 | 85% | http://x";
        let records = records(TableInterpreter.interpret(raw));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].loan_name, "KCC");
    }

    #[test]
    fn test_table_skips_rows_with_wrong_column_count() {
        let raw = "KCC | SBI | ₹50000\nPM-Kisan | NABARD | ₹6000 | 90% | http://y";
        let records = records(TableInterpreter.interpret(raw));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].loan_name, "PM-Kisan");
    }

    #[test]
    fn test_table_zero_rows_is_no_results() {
        let raw = "Sorry, I could not find any loan schemes.";
        let result = TableInterpreter.interpret(raw);
        assert!(matches!(result, Err(InterpretError::NoResults)));
    }

    // ── Fence stripping ─────────────────────────────────────────────────

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }
}
