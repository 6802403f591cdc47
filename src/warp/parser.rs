//! Parsing of warp-cli textual output
//!
//! The tool's output is consumed line by line and discarded after
//! extraction; nothing here keeps structure beyond the extracted fields.

use thiserror::Error;

use crate::core::state::AccountSnapshot;

/// Literal substring that marks a confirmed connection in `warp-cli status`
pub const CONNECTED_MARKER: &str = "Connected";

/// Recognized field markers in `warp-cli account` output.
/// "Quota" is checked before "Premium Data" (a line matching both counts as
/// quota, matching the original tool's labeling).
const QUOTA_MARKER: &str = "Quota";
const PREMIUM_DATA_MARKER: &str = "Premium Data";
const ACCOUNT_TYPE_MARKER: &str = "Account type";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// No recognized field at all - covers the empty output a failed
    /// subprocess call degrades to
    #[error("no recognized account fields in output")]
    NoAccountFields,
    /// A numeric field carried a non-numeric value; the whole call fails
    /// rather than defaulting the field to zero
    #[error("invalid value for {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// True iff the status output reports a confirmed connection
pub fn status_is_connected(output: &str) -> bool {
    output.contains(CONNECTED_MARKER)
}

/// Parse `warp-cli account` output into a snapshot.
///
/// Recognized lines carry their value after the first colon; unrecognized
/// lines are ignored and field order does not matter. Fields absent from the
/// output default to zero/empty, but output with no recognized field at all
/// is an error so a failed subprocess call can never zero out a snapshot.
pub fn parse_account(output: &str) -> Result<AccountSnapshot, ParseError> {
    let mut quota: Option<u64> = None;
    let mut premium_data: Option<u64> = None;
    let mut account_type: Option<String> = None;

    for line in output.lines() {
        if line.contains(QUOTA_MARKER) {
            quota = Some(parse_numeric_field(QUOTA_MARKER, line)?);
        } else if line.contains(PREMIUM_DATA_MARKER) {
            premium_data = Some(parse_numeric_field(PREMIUM_DATA_MARKER, line)?);
        } else if line.contains(ACCOUNT_TYPE_MARKER) {
            account_type = Some(field_value(line).to_string());
        }
    }

    if quota.is_none() && premium_data.is_none() && account_type.is_none() {
        return Err(ParseError::NoAccountFields);
    }

    Ok(AccountSnapshot {
        quota_bytes: quota.unwrap_or(0),
        premium_data_bytes: premium_data.unwrap_or(0),
        account_type: account_type.unwrap_or_default(),
    })
}

/// Value of a recognized line: everything after the first colon, trimmed
fn field_value(line: &str) -> &str {
    line.splitn(2, ':').nth(1).unwrap_or("").trim()
}

fn parse_numeric_field(field: &'static str, line: &str) -> Result<u64, ParseError> {
    let value = field_value(line);
    value.parse().map_err(|_| ParseError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
