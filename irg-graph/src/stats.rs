//! Summary statistics accumulated over a run
//!
//! All sets only grow. Ordered collections keep summaries and listings
//! deterministic across runs over the same input.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use serde_json::Value;

use crate::UNKNOWN_IDENTITY_TYPE;

/// Per-run statistics over every record seen, graph-relevant or not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stats {
    /// Error code → distinct first clauses of its error messages
    pub error_code_messages: BTreeMap<String, BTreeSet<String>>,
    pub event_names: BTreeSet<String>,
    pub identity_types: BTreeSet<String>,
}

impl Stats {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an identity type, `"unknown"` when absent.
    pub fn record_identity_type(&mut self, identity_type: Option<&str>) {
        let identity_type = identity_type.unwrap_or(UNKNOWN_IDENTITY_TYPE);
        if !self.identity_types.contains(identity_type) {
            self.identity_types.insert(identity_type.to_string());
        }
    }

    pub fn record_event_name(&mut self, event_name: &str) {
        if !self.event_names.contains(event_name) {
            self.event_names.insert(event_name.to_string());
        }
    }

    /// Record an error occurrence.
    ///
    /// The code entry is created even when there is no message. Messages are
    /// truncated at their first `.` so variable trailing detail collapses
    /// into one entry.
    pub fn record_error(&mut self, code: &str, message: Option<&str>) {
        let messages = self.error_code_messages.entry(code.to_string()).or_default();
        if let Some(message) = message {
            messages.insert(first_clause(message).to_string());
        }
    }

    /// Record the readable fields of a record that failed to decode.
    ///
    /// Only string values count; fields of any other type are treated as
    /// absent. Non-object values are ignored.
    pub fn record_raw(&mut self, record: &Value) {
        if !record.is_object() {
            return;
        }
        let field = |value: &Value, key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);

        let identity_type = record
            .get("userIdentity")
            .and_then(|identity| field(identity, "type"));
        self.record_identity_type(identity_type.as_deref());
        if let Some(event_name) = field(record, "eventName") {
            self.record_event_name(&event_name);
        }
        if let Some(code) = field(record, "errorCode") {
            self.record_error(&code, field(record, "errorMessage").as_deref());
        }
    }

    /// Distinct messages seen for an error code
    pub fn error_messages(&self, code: &str) -> Option<&BTreeSet<String>> {
        self.error_code_messages.get(code)
    }

    /// One `<category>, <count>` line per tracked category.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (category, count) in [
            ("eventName", self.event_names.len()),
            ("userIdentity.type", self.identity_types.len()),
            ("errorCode", self.error_code_messages.len()),
        ] {
            // Writing to a String cannot fail
            let _ = writeln!(out, "{}, {}", category, count);
        }
        out
    }
}

/// Text up to (excluding) the first `.`, or the whole message.
fn first_clause(message: &str) -> &str {
    message.split('.').next().unwrap_or(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefix() {
        let mut stats = Stats::new();
        stats.record_error("AccessDenied", Some("User is not authorized. extra text"));

        let messages = stats.error_messages("AccessDenied").unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages.contains("User is not authorized"));
    }

    #[test]
    fn test_error_message_without_period_is_kept_whole() {
        let mut stats = Stats::new();
        stats.record_error("Throttling", Some("Rate exceeded"));

        assert!(stats.error_messages("Throttling").unwrap().contains("Rate exceeded"));
    }

    #[test]
    fn test_error_messages_deduplicate_by_prefix() {
        let mut stats = Stats::new();
        stats.record_error("AccessDenied", Some("User is not authorized. on bucket1"));
        stats.record_error("AccessDenied", Some("User is not authorized. on bucket2"));
        stats.record_error("AccessDenied", Some("Explicit deny"));

        assert_eq!(stats.error_messages("AccessDenied").unwrap().len(), 2);
        assert_eq!(stats.error_code_messages.len(), 1);
    }

    #[test]
    fn test_error_without_message_creates_empty_entry() {
        let mut stats = Stats::new();
        stats.record_error("InternalError", None);

        assert!(stats.error_messages("InternalError").unwrap().is_empty());
    }

    #[test]
    fn test_leading_period_yields_empty_prefix() {
        let mut stats = Stats::new();
        stats.record_error("Odd", Some(".starts with a period"));

        assert!(stats.error_messages("Odd").unwrap().contains(""));
    }

    #[test]
    fn test_identity_type_defaults_to_unknown() {
        let mut stats = Stats::new();
        stats.record_identity_type(None);
        stats.record_identity_type(Some("IAMUser"));
        stats.record_identity_type(Some("IAMUser"));

        assert_eq!(stats.identity_types.len(), 2);
        assert!(stats.identity_types.contains("unknown"));
        assert!(stats.identity_types.contains("IAMUser"));
    }

    #[test]
    fn test_record_raw_reads_string_fields_only() {
        let mut stats = Stats::new();
        stats.record_raw(&serde_json::json!({
            "eventName": "CopyObject",
            "userIdentity": { "type": 7 },
            "errorCode": "AccessDenied",
            "errorMessage": ["not", "text"],
            "resources": "arn:aws:s3:::bucket1"
        }));
        stats.record_raw(&serde_json::json!(["not", "a", "record"]));

        assert!(stats.event_names.contains("CopyObject"));
        assert_eq!(stats.identity_types.iter().collect::<Vec<_>>(), vec!["unknown"]);
        assert!(stats.error_messages("AccessDenied").unwrap().is_empty());
    }

    #[test]
    fn test_summary_format() {
        let mut stats = Stats::new();
        stats.record_event_name("GetObject");
        stats.record_event_name("PutObject");
        stats.record_event_name("GetObject");
        stats.record_identity_type(Some("IAMUser"));

        assert_eq!(
            stats.summary(),
            "eventName, 2\nuserIdentity.type, 1\nerrorCode, 0\n"
        );
    }
}
