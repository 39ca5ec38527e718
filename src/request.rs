//! Subscription scope for a watch invocation.
//!
//! A `WatchRequest` is built once and configures every connection attempt of
//! a watch. Only fields that are actually set become query parameters.

use chrono::{DateTime, Utc};

/// Immutable description of what a watch subscribes to.
///
/// All fields are optional; the default request watches everything the token
/// is allowed to see. A non-empty `payload` switches the HTTP method from
/// GET to POST with a JSON body.
#[derive(Debug, Clone, Default)]
pub struct WatchRequest {
    /// Evaluation user the server should evaluate flags against.
    pub user: Option<String>,
    /// Context path; sent with a leading `/` regardless of how it was given.
    pub context: Option<String>,
    /// Restrict to these feature ids.
    pub features: Vec<String>,
    /// Restrict to these projects.
    pub projects: Vec<String>,
    /// Ask the server to include condition details in payloads.
    pub include_conditions: bool,
    /// Point-in-time evaluation date.
    pub evaluation_date: Option<DateTime<Utc>>,
    /// Match features carrying at least one of these tags.
    pub tags_any: Vec<String>,
    /// Match features carrying all of these tags.
    pub tags_all: Vec<String>,
    /// Exclude features carrying any of these tags.
    pub tags_none: Vec<String>,
    /// Server-side refresh interval, seconds.
    pub refresh_interval: Option<u64>,
    /// Server-side keep-alive interval, seconds.
    pub keepalive_interval: Option<u64>,
    /// Optional JSON payload; presence selects POST over GET.
    pub payload: Option<serde_json::Value>,
}

impl WatchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the subscription request goes out as a POST.
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Query parameters for every set field, list values comma-joined.
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(user) = &self.user {
            if !user.is_empty() {
                params.push(("user", user.clone()));
            }
        }
        if let Some(context) = &self.context {
            if !context.is_empty() {
                params.push(("context", normalize_context(context)));
            }
        }
        if !self.features.is_empty() {
            params.push(("features", self.features.join(",")));
        }
        if !self.projects.is_empty() {
            params.push(("projects", self.projects.join(",")));
        }
        if self.include_conditions {
            params.push(("conditions", "true".to_string()));
        }
        if let Some(date) = &self.evaluation_date {
            params.push(("date", date.to_rfc3339()));
        }
        if !self.tags_any.is_empty() {
            params.push(("tags_any", self.tags_any.join(",")));
        }
        if !self.tags_all.is_empty() {
            params.push(("tags_all", self.tags_all.join(",")));
        }
        if !self.tags_none.is_empty() {
            params.push(("tags_none", self.tags_none.join(",")));
        }
        if let Some(secs) = self.refresh_interval {
            if secs > 0 {
                params.push(("refresh_interval", secs.to_string()));
            }
        }
        if let Some(secs) = self.keepalive_interval {
            if secs > 0 {
                params.push(("keepalive_interval", secs.to_string()));
            }
        }
        params
    }
}

/// Context paths are sent with exactly one leading separator.
fn normalize_context(context: &str) -> String {
    if context.starts_with('/') {
        context.to_string()
    } else {
        format!("/{}", context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn param<'a>(params: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_default_request_has_no_params() {
        assert!(WatchRequest::new().query_params().is_empty());
        assert!(!WatchRequest::new().has_payload());
    }

    #[test]
    fn test_lists_are_comma_joined() {
        let request = WatchRequest {
            features: vec!["a".to_string(), "b".to_string()],
            projects: vec!["web".to_string(), "ios".to_string()],
            tags_any: vec!["beta".to_string(), "ops".to_string()],
            ..Default::default()
        };
        let params = request.query_params();
        assert_eq!(param(&params, "features"), Some("a,b"));
        assert_eq!(param(&params, "projects"), Some("web,ios"));
        assert_eq!(param(&params, "tags_any"), Some("beta,ops"));
    }

    #[test]
    fn test_context_gains_leading_separator() {
        let request = WatchRequest {
            context: Some("env/prod".to_string()),
            ..Default::default()
        };
        assert_eq!(param(&request.query_params(), "context"), Some("/env/prod"));

        let request = WatchRequest {
            context: Some("/env/prod".to_string()),
            ..Default::default()
        };
        assert_eq!(param(&request.query_params(), "context"), Some("/env/prod"));
    }

    #[test]
    fn test_conditions_flag_only_when_true() {
        let request = WatchRequest {
            include_conditions: true,
            ..Default::default()
        };
        assert_eq!(param(&request.query_params(), "conditions"), Some("true"));

        let request = WatchRequest::new();
        assert_eq!(param(&request.query_params(), "conditions"), None);
    }

    #[test]
    fn test_evaluation_date_is_iso8601() {
        let request = WatchRequest {
            evaluation_date: Some(Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap()),
            ..Default::default()
        };
        let params = request.query_params();
        let date = param(&params, "date").unwrap();
        assert!(date.starts_with("2026-08-01T12:00:00"));
    }

    #[test]
    fn test_zero_intervals_omitted() {
        let request = WatchRequest {
            refresh_interval: Some(0),
            keepalive_interval: Some(30),
            ..Default::default()
        };
        let params = request.query_params();
        assert_eq!(param(&params, "refresh_interval"), None);
        assert_eq!(param(&params, "keepalive_interval"), Some("30"));
    }

    #[test]
    fn test_empty_strings_omitted() {
        let request = WatchRequest {
            user: Some(String::new()),
            context: Some(String::new()),
            ..Default::default()
        };
        assert!(request.query_params().is_empty());
    }

    #[test]
    fn test_payload_switches_method() {
        let request = WatchRequest {
            payload: Some(serde_json::json!({"segment": "internal"})),
            ..Default::default()
        };
        assert!(request.has_payload());
    }
}
