use crate::ledger::Ledger;
use crate::record::{CellValue, Record};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info};

pub const PDF_LINK_FIELD: &str = "PDF Link";

pub const REQUIRED_POLICY_FIELDS: &[&str] = &[
    "Company Name",
    "LOB Description",
    "Type",
    "Policy No",
    "Insured Name",
    "Prefix",
    "Policy Start Date",
    "Expiry Date",
    "Sum Insured (in ₹)",
    "Premium (in ₹)",
    "GST (in ₹)",
    "Total Premium (in ₹)",
];

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SubmissionResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl SubmissionResponse {
    fn failure(error: impl Into<String>, details: Option<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            details,
            data: None,
        }
    }
}

/// Required keys that are absent, null, empty or `false`.
pub fn missing_required_fields(record: &Record) -> Vec<&'static str> {
    REQUIRED_POLICY_FIELDS
        .iter()
        .copied()
        .filter(|field| match record.get(field) {
            None => true,
            Some(value) => value.is_blank() || *value == CellValue::Bool(false),
        })
        .collect()
}

/// Fills the link field with the "no document" sentinel when it is blank.
pub fn with_link_default(mut record: Record, sentinel: &str) -> Record {
    let blank = record.get(PDF_LINK_FIELD).is_none_or(CellValue::is_blank);
    if blank {
        record.insert(PDF_LINK_FIELD, sentinel);
    }
    record
}

/// Validates a submitted policy body and appends it to the ledger.
pub async fn submit_policy(ledger: &Ledger, body: Value) -> SubmissionResponse {
    let record = match Record::from_value(body) {
        Ok(record) => record,
        Err(err) => return SubmissionResponse::failure(err.reason(), None),
    };

    let missing = missing_required_fields(&record);
    if !missing.is_empty() {
        error!(fields = ?missing, "policy submission missing required fields");
        return SubmissionResponse::failure(
            format!("Missing required fields: {}", missing.join(", ")),
            None,
        );
    }

    let record = with_link_default(record, &ledger.config().link_fields.sentinel);
    match ledger.append(&record).await {
        Ok(outcome) => {
            info!(row = outcome.row, "policy saved");
            SubmissionResponse {
                success: true,
                message: Some("Policy data saved successfully".to_string()),
                error: None,
                details: None,
                data: serde_json::to_value(&outcome).ok(),
            }
        }
        Err(err) => {
            error!(error = %err, "failed to save policy");
            SubmissionResponse::failure("Failed to save policy data", Some(err.to_string()))
        }
    }
}

/// Every stored policy, most recent first.
pub async fn list_policies(ledger: &Ledger) -> crate::error::LedgerResult<Vec<Record>> {
    ledger.list_sorted().await
}
