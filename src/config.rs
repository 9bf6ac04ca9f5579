use crate::utils::constants::{
    DEFAULT_LABEL_MIN_CONFIDENCE, DEFAULT_PORT, DEFAULT_REGION, DEFAULT_REQUEST_TIMEOUT_SECS,
    SERVER_REQUEST_BODY_LIMIT,
};
use crate::utils::get_env::{get_env_flag, get_env_parsed, get_env_var, get_env_var_or};
use anyhow::{Error, anyhow};
use std::time::Duration;

/// Switches for the optional steps of the upload pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOptions {
    /// Store objects with the `public-read` ACL and report their URL.
    pub public_read: bool,
    pub analyze_on_upload: bool,
    /// Threshold for upload labels; `None` keeps every label the service returns.
    pub label_min_confidence: Option<f32>,
    pub detect_faces: bool,
    pub persist_on_upload: bool,
    /// Delete the stored object when a later step fails.
    pub cleanup_on_failure: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            public_read: false,
            analyze_on_upload: true,
            label_min_confidence: Some(DEFAULT_LABEL_MIN_CONFIDENCE),
            detect_faces: false,
            persist_on_upload: false,
            cleanup_on_failure: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub region: String,
    pub bucket_name: String,
    pub table_name: String,
    pub endpoint_url: Option<String>,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub request_timeout: Duration,
    pub pipeline: PipelineOptions,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Error> {
        let bucket_name = get_env_var("S3_BUCKET")?;
        let table_name = get_env_var("DYNAMODB_TABLE")?;
        let endpoint_url = get_env_var("AWS_ENDPOINT_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let pipeline = PipelineOptions {
            public_read: get_env_flag("PUBLIC_READ", false)?,
            analyze_on_upload: get_env_flag("ANALYZE_ON_UPLOAD", true)?,
            label_min_confidence: parse_min_confidence(get_env_var("LABEL_MIN_CONFIDENCE").ok())?,
            detect_faces: get_env_flag("DETECT_FACES", false)?,
            persist_on_upload: get_env_flag("PERSIST_ON_UPLOAD", false)?,
            cleanup_on_failure: get_env_flag("CLEANUP_ON_FAILURE", false)?,
        };

        Ok(Self {
            region: get_env_var_or("AWS_REGION", DEFAULT_REGION),
            bucket_name,
            table_name,
            endpoint_url,
            port: get_env_parsed("PORT", DEFAULT_PORT)?,
            max_upload_bytes: get_env_parsed("MAX_UPLOAD_BYTES", SERVER_REQUEST_BODY_LIMIT)?,
            request_timeout: Duration::from_secs(get_env_parsed(
                "REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            pipeline,
        })
    }
}

fn parse_min_confidence(raw: Option<String>) -> Result<Option<f32>, Error> {
    let Some(raw) = raw else {
        return Ok(Some(DEFAULT_LABEL_MIN_CONFIDENCE));
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(Some(DEFAULT_LABEL_MIN_CONFIDENCE));
    }
    if raw.eq_ignore_ascii_case("none") || raw.eq_ignore_ascii_case("off") {
        return Ok(None);
    }

    let value: f32 = raw
        .parse()
        .map_err(|e| anyhow!("invalid value for LABEL_MIN_CONFIDENCE: {}", e))?;
    if !(0.0..=100.0).contains(&value) {
        return Err(anyhow!(
            "LABEL_MIN_CONFIDENCE must be between 0 and 100, got {}",
            value
        ));
    }
    Ok(Some(value))
}
