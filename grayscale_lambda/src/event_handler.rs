use aws_lambda_events::event::s3::S3Event;
use aws_sdk_s3::Client as S3Client;
use lambda_runtime::{tracing, Error, LambdaEvent};
use serde::Serialize;

use crate::config::HandlerConfig;
use crate::error::HandlerError;
use crate::grayscale::{GrayscaleConverter, JPEG_CONTENT_TYPE};
use crate::source::{destination_key, object_url, SourceObject};
use crate::storage::{fetch_object, put_object};
use crate::upload_record::{UploadRecord, UploadRecorder};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct HandlerResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

/// Everything an invocation needs, built once per process.
pub(crate) struct ImageIngestHandler {
    s3_client: S3Client,
    config: HandlerConfig,
    converter: GrayscaleConverter,
    recorder: Option<Box<dyn UploadRecorder>>,
}

impl ImageIngestHandler {
    pub fn new(
        s3_client: S3Client,
        config: HandlerConfig,
        recorder: Option<Box<dyn UploadRecorder>>,
    ) -> Self {
        let converter = GrayscaleConverter::new(config.jpeg_quality);
        Self {
            s3_client,
            config,
            converter,
            recorder,
        }
    }

    async fn process(&self, event: &S3Event) -> Result<HandlerResponse, HandlerError> {
        let source = SourceObject::from_event(event)?;
        let target_bucket = &self.config.target_bucket;
        let target_key = destination_key(&source.key);

        let asset = fetch_object(&self.s3_client, &source).await?;
        let grayscale = self.converter.convert_async(asset.data.clone()).await?;
        tracing::debug!(
            width = grayscale.width,
            height = grayscale.height,
            bytes = grayscale.data.len(),
            "Converted to grayscale"
        );
        put_object(
            &self.s3_client,
            target_bucket,
            &target_key,
            grayscale.data,
            JPEG_CONTENT_TYPE,
        )
        .await?;

        let grayscale_url = object_url(&self.config.public_url_base, target_bucket, &target_key);
        if let Some(recorder) = &self.recorder {
            let record = UploadRecord::new(
                asset.metadata_value("name"),
                asset.metadata_value("surname"),
                object_url(&self.config.public_url_base, &source.bucket, &source.key),
                grayscale_url.clone(),
            );
            recorder.record(&record).await?;
        }

        tracing::info!("Saved grayscale image to {}/{}", target_bucket, target_key);
        Ok(HandlerResponse {
            status_code: 200,
            body: grayscale_url,
        })
    }
}

pub(crate) async fn function_handler(
    event: LambdaEvent<S3Event>,
    handler: &ImageIngestHandler,
) -> Result<HandlerResponse, Error> {
    match handler.process(&event.payload).await {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::error!("Error processing image: {}", error_chain(&e));
            Err(e.into())
        }
    }
}

/// Joins an error with its sources, outermost first.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}
