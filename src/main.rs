use crate::booter::Booter;
use crate::config::AppConfig;
use crate::server::router::build_router;
use crate::server::types::AppState;
use crate::services::aws_clients::{
    init_dynamodb_client, init_rekognition_client, init_s3_client, load_sdk_config,
};
use crate::services::records::DynamoRecordStore;
use crate::services::storage::S3ObjectStore;
use crate::services::vision::RekognitionVision;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

pub mod booter;
pub mod config;
pub mod error;
pub mod server;
pub mod services;
pub mod utils;

// Build the AWS backed clients once; every request shares them
async fn init_app_state(config: &AppConfig) -> Result<AppState, anyhow::Error> {
    let sdk_config = load_sdk_config(config).await;

    let storage = S3ObjectStore::new(init_s3_client(&sdk_config, config), &config.bucket_name);
    let vision = RekognitionVision::new(init_rekognition_client(&sdk_config), &config.bucket_name);
    let records = DynamoRecordStore::new(init_dynamodb_client(&sdk_config), &config.table_name);

    Ok(AppState {
        storage: Arc::new(storage),
        vision: Arc::new(vision),
        records: Arc::new(records),
        pipeline: config.pipeline.clone(),
    })
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        region = %config.region,
        bucket = %config.bucket_name,
        table = %config.table_name,
        pipeline = ?config.pipeline,
        "configuration loaded"
    );

    let state = Arc::new(init_app_state(&config).await?);
    let router = build_router(state, config.max_upload_bytes, config.request_timeout);

    let booter = Booter::new(config.port).await?;
    tracing::info!("Listening on {}", booter.addr);
    booter.start(router).await
}
