use std::collections::HashMap;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;

use crate::error::{HandlerError, Result};
use crate::source::SourceObject;

/// Source object contents together with its user metadata
/// (`x-amz-meta-*` headers, keys lower-cased by S3).
#[derive(Debug)]
pub struct ImageAsset {
    pub data: Bytes,
    pub metadata: HashMap<String, String>,
}

impl ImageAsset {
    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

pub async fn fetch_object(s3_client: &S3Client, source: &SourceObject) -> Result<ImageAsset> {
    let response = s3_client
        .get_object()
        .bucket(&source.bucket)
        .key(&source.key)
        .send()
        .await
        .map_err(|e| HandlerError::SourceRetrieval {
            bucket: source.bucket.clone(),
            key: source.key.clone(),
            source: e.into(),
        })?;

    let metadata = response.metadata().cloned().unwrap_or_default();
    let data = response
        .body
        .collect()
        .await
        .map_err(|e| HandlerError::SourceRead {
            bucket: source.bucket.clone(),
            key: source.key.clone(),
            source: e,
        })?
        .into_bytes();

    Ok(ImageAsset { data, metadata })
}

pub async fn put_object(
    s3_client: &S3Client,
    bucket: &str,
    key: &str,
    data: Bytes,
    content_type: &str,
) -> Result<()> {
    s3_client
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| HandlerError::DestinationWrite {
            bucket: bucket.to_string(),
            key: key.to_string(),
            source: e.into(),
        })?;
    Ok(())
}
