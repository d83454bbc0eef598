use aws_config::BehaviorVersion;
use aws_sdk_s3::Client as S3Client;
use lambda_runtime::{run, service_fn, tracing, Error};
mod config;
mod error;
mod event_handler;
mod grayscale;
mod source;
mod storage;
mod upload_record;
use config::HandlerConfig;
use event_handler::{function_handler, ImageIngestHandler};
use upload_record::{MySqlRecorder, UploadRecorder};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::subscriber::fmt().json().init();
    let config = HandlerConfig::from_env()?;
    let shared_config = aws_config::load_defaults(BehaviorVersion::v2025_01_17()).await;
    let s3_client = S3Client::new(&shared_config);
    let recorder = config
        .database
        .as_ref()
        .map(|db| Box::new(MySqlRecorder::new(db)) as Box<dyn UploadRecorder>);
    tracing::info!(
        target_bucket = %config.target_bucket,
        record_uploads = recorder.is_some(),
        "Starting grayscale handler"
    );
    let handler = ImageIngestHandler::new(s3_client, config, recorder);
    run(service_fn(|event| function_handler(event, &handler))).await
}
