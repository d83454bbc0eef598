use aws_sdk_s3::primitives::ByteStreamError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, HandlerError>;

/// Failures of a single invocation. None of them are retried here; the Lambda
/// runtime receives the error unchanged and applies its own failure policy.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("malformed trigger event: {0}")]
    MalformedEvent(String),

    #[error("failed to fetch s3://{bucket}/{key}")]
    SourceRetrieval {
        bucket: String,
        key: String,
        #[source]
        source: aws_sdk_s3::Error,
    },

    #[error("failed to read body of s3://{bucket}/{key}")]
    SourceRead {
        bucket: String,
        key: String,
        #[source]
        source: ByteStreamError,
    },

    #[error("failed to decode image")]
    Decode(#[source] image::ImageError),

    #[error("failed to encode JPEG")]
    Encode(#[source] image::ImageError),

    #[error("image conversion task failed")]
    Task(#[from] tokio::task::JoinError),

    #[error("failed to write s3://{bucket}/{key}")]
    DestinationWrite {
        bucket: String,
        key: String,
        #[source]
        source: aws_sdk_s3::Error,
    },

    #[error("failed to record upload")]
    Database(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_wrapped_errors_are_reported_once() {
        let inner = image::load_from_memory(b"not an image").unwrap_err();
        let inner_message = inner.to_string();
        let err = HandlerError::Decode(inner);

        assert_eq!(err.to_string(), "failed to decode image");
        assert_eq!(err.source().unwrap().to_string(), inner_message);

        let err = HandlerError::Database(sqlx::Error::PoolTimedOut);
        assert!(!err.to_string().contains(&sqlx::Error::PoolTimedOut.to_string()));
        assert!(err.source().is_some());
    }
}
