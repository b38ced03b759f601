//! Audit-trail record model
//!
//! A record describes one API call. Only a handful of fields drive graph
//! construction; everything else is carried along untouched in flattened
//! maps so edges can hold whole records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::RecordError;
use crate::UNKNOWN_IDENTITY_TYPE;

/// One decoded audit event.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,

    /// Present (and non-null) only when the API call failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_identity: Option<UserIdentity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<Resource>>,

    /// Remaining top-level fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The actor of a record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub identity_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    #[serde(rename = "principalId", default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A resource touched by a record.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Resource {
    #[serde(rename = "ARN", default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Record {
    /// Decode a record from a raw JSON value.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Identity type, or `"unknown"` when the record has no identity or type.
    pub fn identity_type(&self) -> &str {
        self.user_identity
            .as_ref()
            .and_then(|identity| identity.identity_type.as_deref())
            .unwrap_or(UNKNOWN_IDENTITY_TYPE)
    }

    /// Whether this record describes a failed API call.
    pub fn is_error(&self) -> bool {
        self.error_code.is_some()
    }

    /// Event name for diagnostics; empty when absent.
    pub fn event_name_or_default(&self) -> &str {
        self.event_name.as_deref().unwrap_or_default()
    }

    /// Resources in record order; empty when the field is absent.
    pub fn resources(&self) -> &[Resource] {
        self.resources.as_deref().unwrap_or_default()
    }
}

impl UserIdentity {
    /// Graph key: the ARN when present, otherwise the principal id.
    pub fn key(&self) -> Option<&str> {
        self.arn.as_deref().or(self.principal_id.as_deref())
    }

    /// All identity fields as a JSON object.
    pub fn to_map(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

impl Resource {
    /// All descriptive fields with the ARN stored under `arn`.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = self.extra.clone();
        if let Some(arn) = &self.arn {
            map.insert("arn".to_string(), Value::String(arn.clone()));
        }
        map
    }
}
