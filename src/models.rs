//! Typed payloads carried by flag-change events.
//!
//! Event data arrives as JSON; these types give consumers a typed view via
//! [`Event::json`](crate::sse::Event::json) without forcing it on anyone who
//! prefers the raw string.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The dynamic "active" value of a flag.
///
/// The service reports it as a bare JSON scalar (bool, number, or string);
/// modeling it as a tagged variant keeps comparison and formatting exhaustive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagValue::Bool(v) => write!(f, "{}", v),
            FlagValue::Number(v) => write!(f, "{}", v),
            FlagValue::String(v) => write!(f, "{}", v),
        }
    }
}

/// Change notification payload sent by the flag-management service.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FlagChange {
    /// Feature identifier the change applies to.
    pub feature: String,
    /// Owning project, if the server scopes by project.
    #[serde(default)]
    pub project: Option<String>,
    /// New evaluated value; absent for deletions.
    #[serde(default)]
    pub active: Option<FlagValue>,
    /// Tags attached to the feature at the time of the change.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Server-side timestamp of the change.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}
