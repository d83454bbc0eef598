use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::tracing;

use crate::error::{HandlerError, Result};

pub const DESTINATION_PREFIX: &str = "grayscale-";

/// The object that triggered the invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceObject {
    pub bucket: String,
    pub key: String,
}

impl SourceObject {
    /// Takes the first record of the notification. Any further records are
    /// ignored.
    pub fn from_event(event: &S3Event) -> Result<Self> {
        let record = event
            .records
            .first()
            .ok_or_else(|| HandlerError::MalformedEvent("event contains no records".to_string()))?;
        if event.records.len() > 1 {
            tracing::warn!(
                "Event contains {} records, only the first is processed",
                event.records.len()
            );
        }

        let bucket = record
            .s3
            .bucket
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| HandlerError::MalformedEvent("record has no bucket name".to_string()))?;
        let key = record
            .s3
            .object
            .key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| HandlerError::MalformedEvent("record has no object key".to_string()))?;

        Ok(Self {
            bucket: bucket.to_string(),
            key: decode_key(key),
        })
    }
}

/// Notification keys are form-encoded.
fn decode_key(key: &str) -> String {
    let key_with_spaces = key.replace('+', " ");
    urlencoding::decode(&key_with_spaces)
        .map(|s| s.into_owned())
        .unwrap_or(key_with_spaces)
}

pub fn destination_key(source_key: &str) -> String {
    format!("{DESTINATION_PREFIX}{source_key}")
}

/// Path-style public URL of an object. Each `/`-separated segment of the key
/// is percent-encoded; the separators are kept.
pub fn object_url(base: &str, bucket: &str, key: &str) -> String {
    let encoded_key = key
        .split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/");
    format!("{base}/{bucket}/{encoded_key}")
}
