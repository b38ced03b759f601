//! Error types for record processing.

use thiserror::Error;

/// Reasons a single record cannot contribute nodes or edges.
///
/// None of these are fatal to a run: the caller logs the record and moves on.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The record is not an object of the expected shape.
    #[error("Undecodable record: {0}")]
    Undecodable(#[from] serde_json::Error),

    /// An IAM user identity with neither `arn` nor `principalId`.
    #[error("Identity has neither arn nor principalId (event {event_name})")]
    MissingIdentityKey { event_name: String },

    /// A resource entry without an `ARN`.
    #[error("Resource at position {position} has no ARN (event {event_name})")]
    MissingResourceArn { event_name: String, position: usize },
}

impl RecordError {
    /// Create a missing identity key error.
    pub fn missing_identity_key(event_name: impl Into<String>) -> Self {
        Self::MissingIdentityKey {
            event_name: event_name.into(),
        }
    }

    /// Create a missing resource ARN error.
    pub fn missing_resource_arn(event_name: impl Into<String>, position: usize) -> Self {
        Self::MissingResourceArn {
            event_name: event_name.into(),
            position,
        }
    }
}
