//! Interpretation of webhook response bodies.
//!
//! The same rules apply to the body returned by a submission and to the
//! body returned by a status check.

use crate::error::{Error, Result};
use serde_json::Value;

const UPLOAD_CONFIRMATION: &str = "file uploaded";

/// True when the webhook only acknowledged the upload ("File Uploaded",
/// any case, surrounding whitespace ignored).
pub fn is_confirmation(body: &str) -> bool {
    body.trim().eq_ignore_ascii_case(UPLOAD_CONFIRMATION)
}

/// True when a status check says nothing new: empty or confirmation only.
pub fn is_pending(body: &str) -> bool {
    body.trim().is_empty() || is_confirmation(body)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryBody {
    /// `[{"text": "..."}]`
    List(String),
    /// `{"text": "..."}`
    Object(String),
    /// `"..."`
    Text(String),
    /// Any other JSON value, pretty printed.
    Other(String),
    /// Body that is not JSON at all.
    Raw(String),
    /// Empty body or a bare upload confirmation.
    Invalid,
}

impl SummaryBody {
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) => Self::from_json(value).unwrap_or_else(|| Self::from_raw(body)),
            Err(_) => Self::from_raw(body),
        }
    }

    // None when the structured value held no usable text; the caller then
    // falls back to the raw body.
    fn from_json(value: Value) -> Option<Self> {
        if let Some(text) = value
            .as_array()
            .and_then(|items| items.first())
            .and_then(text_field)
        {
            return Some(SummaryBody::List(text.to_string()));
        }

        if let Some(text) = text_field(&value) {
            return Some(SummaryBody::Object(text.to_string()));
        }

        match value {
            Value::String(text) if text.is_empty() => None,
            Value::String(text) => Some(SummaryBody::Text(text)),
            other => serde_json::to_string_pretty(&other)
                .ok()
                .map(SummaryBody::Other),
        }
    }

    fn from_raw(body: &str) -> Self {
        if is_pending(body) {
            SummaryBody::Invalid
        } else {
            SummaryBody::Raw(body.to_string())
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            SummaryBody::List(_) => "list",
            SummaryBody::Object(_) => "object",
            SummaryBody::Text(_) => "string",
            SummaryBody::Other(_) => "other",
            SummaryBody::Raw(_) => "raw",
            SummaryBody::Invalid => "invalid",
        }
    }

    pub fn into_summary(self) -> Result<String> {
        match self {
            SummaryBody::List(text)
            | SummaryBody::Object(text)
            | SummaryBody::Text(text)
            | SummaryBody::Other(text)
            | SummaryBody::Raw(text) => Ok(text),
            SummaryBody::Invalid => Err(Error::EmptyResponse),
        }
    }
}

fn text_field(value: &Value) -> Option<&str> {
    value
        .get("text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}
