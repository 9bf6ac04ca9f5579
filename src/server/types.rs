use crate::config::PipelineOptions;
use crate::services::records::RecordStore;
use crate::services::storage::ObjectStore;
use crate::services::vision::{FaceResult, LabelResult, VisionService};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Long lived service clients, shared read-only by every request.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn ObjectStore>,
    pub vision: Arc<dyn VisionService>,
    pub records: Arc<dyn RecordStore>,
    pub pipeline: PipelineOptions,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UploadResponse {
    pub message: String,
    pub file_key: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub image_url: Option<String>,
    pub labels: Vec<LabelResult>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub faces: Vec<FaceResult>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AnalyzeResponse {
    pub file_key: String,
    pub labels: Vec<String>,
}
