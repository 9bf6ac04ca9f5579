use crate::config::AppConfig;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::time::Duration;

/// Shared SDK configuration for every AWS client. Retries are disabled: a
/// failed call is reported to the caller as is.
pub async fn load_sdk_config(config: &AppConfig) -> SdkConfig {
    let timeout_config = TimeoutConfig::builder()
        .operation_timeout(config.request_timeout)
        .operation_attempt_timeout(config.request_timeout)
        .connect_timeout(Duration::from_secs(10))
        .build();

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .retry_config(RetryConfig::disabled())
        .timeout_config(timeout_config);

    if let Some(endpoint_url) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url);
    }

    loader.load().await
}

pub fn init_s3_client(sdk_config: &SdkConfig, config: &AppConfig) -> aws_sdk_s3::Client {
    // local S3 emulators only understand path style addressing
    let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
        .force_path_style(config.endpoint_url.is_some())
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}

pub fn init_rekognition_client(sdk_config: &SdkConfig) -> aws_sdk_rekognition::Client {
    aws_sdk_rekognition::Client::new(sdk_config)
}

pub fn init_dynamodb_client(sdk_config: &SdkConfig) -> aws_sdk_dynamodb::Client {
    aws_sdk_dynamodb::Client::new(sdk_config)
}
