use crate::error::AppError;
use crate::server::types::AppState;
use crate::services::records::AnalysisRecord;
use crate::services::vision::{FaceResult, LabelResult, retain_confident};
use crate::utils::constants::{MAX_LABELS, NO_FILE_UPLOADED};
use crate::utils::keys::generate_file_key;
use bytes::Bytes;
use std::time::Instant;

/// The `file` part of an upload form.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Everything an upload produced before it finished or failed. Results computed
/// ahead of a failure are kept so the caller can still show them.
#[derive(Debug, Default)]
pub struct UploadOutcome {
    pub file_key: Option<String>,
    pub image_url: Option<String>,
    pub labels: Vec<LabelResult>,
    pub faces: Vec<FaceResult>,
    pub persisted: bool,
    pub error: Option<AppError>,
}

impl UploadOutcome {
    pub fn rejected(error: AppError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Runs one upload through store, label, face and persist steps in order.
/// The first failing step ends the run.
pub struct UploadPipeline<'a> {
    state: &'a AppState,
}

impl<'a> UploadPipeline<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn run(&self, file: Option<UploadedFile>) -> UploadOutcome {
        let Some(file) = file else {
            return UploadOutcome::rejected(AppError::Validation(NO_FILE_UPLOADED.to_string()));
        };

        let start_time = Instant::now();
        let options = &self.state.pipeline;
        let file_key = generate_file_key(&file.filename);
        let size = file.data.len();
        tracing::info!(file_key = %file_key, size, "upload received");

        let mut outcome = UploadOutcome::default();

        let put_start = Instant::now();
        if let Err(e) = self
            .state
            .storage
            .put_object(
                &file_key,
                file.data,
                file.content_type.as_deref(),
                options.public_read,
            )
            .await
        {
            outcome.error = Some(e);
            return outcome;
        }
        tracing::info!(file_key = %file_key, "stored in {:?}", put_start.elapsed());

        outcome.file_key = Some(file_key.clone());
        if options.public_read {
            outcome.image_url = Some(self.state.storage.public_url(&file_key));
        }

        if let Err(e) = self.analyze(&file_key, &mut outcome).await {
            if options.cleanup_on_failure {
                self.remove_orphan(&file_key, &mut outcome).await;
            }
            outcome.error = Some(e);
        }

        tracing::info!(
            file_key = %file_key,
            labels = outcome.labels.len(),
            faces = outcome.faces.len(),
            persisted = outcome.persisted,
            failed = outcome.error.is_some(),
            "upload finished in {:?}",
            start_time.elapsed()
        );
        outcome
    }

    async fn analyze(&self, file_key: &str, outcome: &mut UploadOutcome) -> Result<(), AppError> {
        let options = &self.state.pipeline;

        if options.analyze_on_upload {
            let labels = self
                .state
                .vision
                .detect_labels(file_key, MAX_LABELS, options.label_min_confidence)
                .await?;
            outcome.labels = retain_confident(labels, options.label_min_confidence);
        }

        if options.detect_faces {
            outcome.faces = self.state.vision.detect_faces(file_key).await?;
        }

        if options.persist_on_upload {
            let record = AnalysisRecord {
                file_key: file_key.to_string(),
                labels: outcome.labels.iter().map(|l| l.name.clone()).collect(),
            };
            self.state.records.put_record(&record).await?;
            outcome.persisted = true;
        }

        Ok(())
    }

    async fn remove_orphan(&self, file_key: &str, outcome: &mut UploadOutcome) {
        match self.state.storage.delete_object(file_key).await {
            Ok(()) => {
                tracing::warn!(file_key, "removed stored object after failed analysis");
                outcome.image_url = None;
            }
            Err(e) => {
                tracing::error!(file_key, "could not remove orphaned object: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineOptions;
    use crate::services::fakes::{FakeObjectStore, FakeRecordStore, FakeVision};
    use crate::services::vision::EmotionScore;
    use std::sync::Arc;

    struct Harness {
        storage: Arc<FakeObjectStore>,
        vision: Arc<FakeVision>,
        records: Arc<FakeRecordStore>,
        state: AppState,
    }

    fn harness(storage: FakeObjectStore, vision: FakeVision, pipeline: PipelineOptions) -> Harness {
        let storage = Arc::new(storage);
        let vision = Arc::new(vision);
        let records = Arc::new(FakeRecordStore::default());
        let state = AppState {
            storage: storage.clone(),
            vision: vision.clone(),
            records: records.clone(),
            pipeline,
        };
        Harness {
            storage,
            vision,
            records,
            state,
        }
    }

    fn cat_photo() -> UploadedFile {
        UploadedFile {
            filename: "cat.jpg".to_string(),
            content_type: Some("image/jpeg".to_string()),
            data: Bytes::from_static(b"\xFF\xD8\xFFfake-jpeg"),
        }
    }

    fn face() -> FaceResult {
        FaceResult {
            gender: "Female".to_string(),
            gender_confidence: 99.0,
            top_emotions: vec![EmotionScore {
                emotion: "HAPPY".to_string(),
                confidence: 88.0,
            }],
            smile: true,
            smile_confidence: 97.0,
        }
    }

    #[tokio::test]
    async fn test_missing_file_makes_no_calls() {
        let h = harness(
            FakeObjectStore::default(),
            FakeVision::default(),
            PipelineOptions::default(),
        );
        let outcome = UploadPipeline::new(&h.state).run(None).await;

        assert!(matches!(outcome.error, Some(AppError::Validation(ref m)) if m == "No file uploaded"));
        assert!(h.storage.put_calls().is_empty());
        assert!(h.vision.label_calls().is_empty());
        assert_eq!(h.vision.face_call_count(), 0);
    }

    #[tokio::test]
    async fn test_labels_filtered_by_threshold() {
        let vision = FakeVision::with_labels(&[
            ("Cat", 99.0),
            ("Pet", 96.0),
            ("Mammal", 85.0),
            ("Couch", 72.0),
            ("Furniture", 60.0),
        ]);
        let h = harness(FakeObjectStore::default(), vision, PipelineOptions::default());
        let outcome = UploadPipeline::new(&h.state).run(Some(cat_photo())).await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.labels.len(), 3);
        assert!(outcome.labels.iter().all(|l| l.confidence >= 80.0));

        let calls = h.vision.label_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].max_labels, 5);
        assert_eq!(calls[0].min_confidence, Some(80.0));
        assert_eq!(Some(calls[0].key.clone()), outcome.file_key);
    }

    #[tokio::test]
    async fn test_public_read_sets_image_url() {
        let options = PipelineOptions {
            public_read: true,
            ..Default::default()
        };
        let h = harness(FakeObjectStore::default(), FakeVision::default(), options);
        let outcome = UploadPipeline::new(&h.state).run(Some(cat_photo())).await;

        let file_key = outcome.file_key.clone().unwrap();
        assert_eq!(
            outcome.image_url,
            Some(format!("https://test-bucket.s3.amazonaws.com/{}", file_key))
        );
        let puts = h.storage.put_calls();
        assert!(puts[0].public_read);
        assert_eq!(puts[0].content_type.as_deref(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn test_storage_failure_stops_pipeline() {
        let h = harness(
            FakeObjectStore::failing("The specified bucket does not exist"),
            FakeVision::with_labels(&[("Cat", 99.0)]),
            PipelineOptions::default(),
        );
        let outcome = UploadPipeline::new(&h.state).run(Some(cat_photo())).await;

        assert!(
            matches!(outcome.error, Some(AppError::Storage(ref m)) if m == "The specified bucket does not exist")
        );
        assert!(outcome.file_key.is_none());
        assert!(h.vision.label_calls().is_empty());
    }

    #[tokio::test]
    async fn test_face_failure_keeps_labels() {
        let mut vision = FakeVision::with_labels(&[("Person", 99.0)]);
        vision.face_error = Some("missing 'Smile' in analysis response".to_string());
        let options = PipelineOptions {
            detect_faces: true,
            persist_on_upload: true,
            ..Default::default()
        };
        let h = harness(FakeObjectStore::default(), vision, options);
        let outcome = UploadPipeline::new(&h.state).run(Some(cat_photo())).await;

        assert!(matches!(outcome.error, Some(AppError::Vision(_))));
        assert_eq!(outcome.labels.len(), 1);
        assert!(outcome.faces.is_empty());
        assert!(!outcome.persisted);
        assert_eq!(h.records.len(), 0);
        // no cleanup unless asked for
        assert!(h.storage.deleted_keys().is_empty());
    }

    #[tokio::test]
    async fn test_faces_and_persistence() {
        let mut vision = FakeVision::with_labels(&[("Person", 99.0), ("Smile", 91.0)]);
        vision.faces = vec![face()];
        let options = PipelineOptions {
            detect_faces: true,
            persist_on_upload: true,
            ..Default::default()
        };
        let h = harness(FakeObjectStore::default(), vision, options);
        let outcome = UploadPipeline::new(&h.state).run(Some(cat_photo())).await;

        assert!(outcome.error.is_none());
        assert_eq!(outcome.faces, vec![face()]);
        assert!(outcome.persisted);
        let file_key = outcome.file_key.unwrap();
        assert_eq!(
            h.records.get(&file_key),
            Some(vec!["Person".to_string(), "Smile".to_string()])
        );
    }

    #[tokio::test]
    async fn test_cleanup_on_failure_removes_object() {
        let mut vision = FakeVision::default();
        vision.label_error = Some("Access denied".to_string());
        let options = PipelineOptions {
            public_read: true,
            cleanup_on_failure: true,
            ..Default::default()
        };
        let h = harness(FakeObjectStore::default(), vision, options);
        let outcome = UploadPipeline::new(&h.state).run(Some(cat_photo())).await;

        let file_key = outcome.file_key.clone().unwrap();
        assert_eq!(h.storage.deleted_keys(), vec![file_key]);
        assert!(outcome.image_url.is_none());
        assert!(matches!(outcome.error, Some(AppError::Vision(ref m)) if m == "Access denied"));
    }

    #[tokio::test]
    async fn test_analysis_disabled_only_stores() {
        let options = PipelineOptions {
            analyze_on_upload: false,
            ..Default::default()
        };
        let h = harness(
            FakeObjectStore::default(),
            FakeVision::with_labels(&[("Cat", 99.0)]),
            options,
        );
        let outcome = UploadPipeline::new(&h.state).run(Some(cat_photo())).await;

        assert!(outcome.error.is_none());
        assert!(outcome.labels.is_empty());
        assert_eq!(h.storage.put_calls().len(), 1);
        assert!(h.vision.label_calls().is_empty());
    }
}
