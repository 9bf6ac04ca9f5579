use crate::error::AppError;
use crate::services::sdk_error::sdk_error_message;
use crate::utils::constants::TOP_EMOTIONS;
use async_trait::async_trait;
use aws_sdk_rekognition::Client;
use aws_sdk_rekognition::types::{Attribute, FaceDetail, Image, Label, S3Object};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LabelResult {
    pub name: String,
    pub confidence: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct EmotionScore {
    pub emotion: String,
    pub confidence: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct FaceResult {
    pub gender: String,
    pub gender_confidence: f32,
    pub top_emotions: Vec<EmotionScore>,
    pub smile: bool,
    pub smile_confidence: f32,
}

/// Image analysis over objects already sitting in the bucket.
#[async_trait]
pub trait VisionService: Send + Sync {
    async fn detect_labels(
        &self,
        key: &str,
        max_labels: i32,
        min_confidence: Option<f32>,
    ) -> Result<Vec<LabelResult>, AppError>;

    async fn detect_faces(&self, key: &str) -> Result<Vec<FaceResult>, AppError>;
}

/// Sorts by descending confidence and keeps at most `limit` entries.
pub fn top_emotions(mut emotions: Vec<EmotionScore>, limit: usize) -> Vec<EmotionScore> {
    emotions.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    emotions.truncate(limit);
    emotions
}

pub fn retain_confident(labels: Vec<LabelResult>, min_confidence: Option<f32>) -> Vec<LabelResult> {
    match min_confidence {
        Some(min) => labels
            .into_iter()
            .filter(|label| label.confidence >= min)
            .collect(),
        None => labels,
    }
}

pub struct RekognitionVision {
    client: Client,
    bucket: String,
}

impl RekognitionVision {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    fn s3_image(&self, key: &str) -> Image {
        Image::builder()
            .s3_object(S3Object::builder().bucket(&self.bucket).name(key).build())
            .build()
    }
}

#[async_trait]
impl VisionService for RekognitionVision {
    async fn detect_labels(
        &self,
        key: &str,
        max_labels: i32,
        min_confidence: Option<f32>,
    ) -> Result<Vec<LabelResult>, AppError> {
        let mut request = self
            .client
            .detect_labels()
            .image(self.s3_image(key))
            .max_labels(max_labels);
        if let Some(min_confidence) = min_confidence {
            request = request.min_confidence(min_confidence);
        }

        let output = request
            .send()
            .await
            .map_err(|e| AppError::Vision(sdk_error_message(&e)))?;

        output.labels().iter().map(label_from_sdk).collect()
    }

    async fn detect_faces(&self, key: &str) -> Result<Vec<FaceResult>, AppError> {
        let output = self
            .client
            .detect_faces()
            .image(self.s3_image(key))
            .attributes(Attribute::All)
            .send()
            .await
            .map_err(|e| AppError::Vision(sdk_error_message(&e)))?;

        output.face_details().iter().map(face_from_sdk).collect()
    }
}

fn missing(field: &str) -> AppError {
    AppError::Vision(format!("missing '{}' in analysis response", field))
}

pub(crate) fn label_from_sdk(label: &Label) -> Result<LabelResult, AppError> {
    Ok(LabelResult {
        name: label.name().ok_or_else(|| missing("Name"))?.to_string(),
        confidence: label.confidence().ok_or_else(|| missing("Confidence"))?,
    })
}

/// A face without gender, emotions or smile fails the whole detection.
pub(crate) fn face_from_sdk(face: &FaceDetail) -> Result<FaceResult, AppError> {
    let gender = face.gender().ok_or_else(|| missing("Gender"))?;
    let smile = face.smile().ok_or_else(|| missing("Smile"))?;
    if face.emotions().is_empty() {
        return Err(missing("Emotions"));
    }

    let emotions = face
        .emotions()
        .iter()
        .map(|emotion| {
            Ok(EmotionScore {
                emotion: emotion
                    .r#type()
                    .ok_or_else(|| missing("Emotions.Type"))?
                    .as_str()
                    .to_string(),
                confidence: emotion
                    .confidence()
                    .ok_or_else(|| missing("Emotions.Confidence"))?,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    Ok(FaceResult {
        gender: gender
            .value()
            .ok_or_else(|| missing("Gender.Value"))?
            .as_str()
            .to_string(),
        gender_confidence: gender
            .confidence()
            .ok_or_else(|| missing("Gender.Confidence"))?,
        top_emotions: top_emotions(emotions, TOP_EMOTIONS),
        smile: smile.value(),
        smile_confidence: smile
            .confidence()
            .ok_or_else(|| missing("Smile.Confidence"))?,
    })
}
