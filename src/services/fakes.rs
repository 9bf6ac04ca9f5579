//! In-memory stand-ins for the AWS backed services, used by handler tests.

use crate::error::AppError;
use crate::services::records::{AnalysisRecord, RecordStore};
use crate::services::storage::{ObjectStore, public_object_url};
use crate::services::vision::{FaceResult, LabelResult, VisionService};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

#[derive(Debug, Clone)]
pub struct PutCall {
    pub key: String,
    pub size: usize,
    pub content_type: Option<String>,
    pub public_read: bool,
}

#[derive(Default)]
pub struct FakeObjectStore {
    pub puts: Mutex<Vec<PutCall>>,
    pub deletes: Mutex<Vec<String>>,
    pub fail_with: Option<String>,
}

impl FakeObjectStore {
    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Default::default()
        }
    }

    pub fn put_calls(&self) -> Vec<PutCall> {
        self.puts.lock().unwrap().clone()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: Option<&str>,
        public_read: bool,
    ) -> Result<(), AppError> {
        if let Some(message) = &self.fail_with {
            return Err(AppError::Storage(message.clone()));
        }
        self.puts.lock().unwrap().push(PutCall {
            key: key.to_string(),
            size: data.len(),
            content_type: content_type.map(str::to_string),
            public_read,
        });
        Ok(())
    }

    async fn delete_object(&self, key: &str) -> Result<(), AppError> {
        self.deletes.lock().unwrap().push(key.to_string());
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        public_object_url("test-bucket", key)
    }
}

#[derive(Debug, Clone)]
pub struct LabelCall {
    pub key: String,
    pub max_labels: i32,
    pub min_confidence: Option<f32>,
}

#[derive(Default)]
pub struct FakeVision {
    pub labels: Vec<LabelResult>,
    /// Served one per call ahead of `labels`.
    pub label_sets: Mutex<VecDeque<Vec<LabelResult>>>,
    pub faces: Vec<FaceResult>,
    pub label_error: Option<String>,
    pub face_error: Option<String>,
    pub label_calls: Mutex<Vec<LabelCall>>,
    pub face_calls: Mutex<Vec<String>>,
}

fn to_labels(labels: &[(&str, f32)]) -> Vec<LabelResult> {
    labels
        .iter()
        .map(|(name, confidence)| LabelResult {
            name: name.to_string(),
            confidence: *confidence,
        })
        .collect()
}

impl FakeVision {
    pub fn with_labels(labels: &[(&str, f32)]) -> Self {
        Self {
            labels: to_labels(labels),
            ..Default::default()
        }
    }

    pub fn with_label_sets(sets: &[&[(&str, f32)]]) -> Self {
        Self {
            label_sets: Mutex::new(sets.iter().map(|set| to_labels(set)).collect()),
            ..Default::default()
        }
    }

    pub fn label_calls(&self) -> Vec<LabelCall> {
        self.label_calls.lock().unwrap().clone()
    }

    pub fn face_call_count(&self) -> usize {
        self.face_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl VisionService for FakeVision {
    async fn detect_labels(
        &self,
        key: &str,
        max_labels: i32,
        min_confidence: Option<f32>,
    ) -> Result<Vec<LabelResult>, AppError> {
        self.label_calls.lock().unwrap().push(LabelCall {
            key: key.to_string(),
            max_labels,
            min_confidence,
        });
        match &self.label_error {
            Some(message) => Err(AppError::Vision(message.clone())),
            // returned unfiltered so callers have to apply the threshold themselves
            None => Ok(self
                .label_sets
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.labels.clone())),
        }
    }

    async fn detect_faces(&self, key: &str) -> Result<Vec<FaceResult>, AppError> {
        self.face_calls.lock().unwrap().push(key.to_string());
        match &self.face_error {
            Some(message) => Err(AppError::Vision(message.clone())),
            None => Ok(self.faces.clone()),
        }
    }
}

#[derive(Default)]
pub struct FakeRecordStore {
    pub records: Mutex<HashMap<String, Vec<String>>>,
    pub writes: Mutex<usize>,
    pub fail_with: Option<String>,
}

impl FakeRecordStore {
    pub fn get(&self, file_key: &str) -> Option<Vec<String>> {
        self.records.lock().unwrap().get(file_key).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn write_count(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

#[async_trait]
impl RecordStore for FakeRecordStore {
    async fn put_record(&self, record: &AnalysisRecord) -> Result<(), AppError> {
        if let Some(message) = &self.fail_with {
            return Err(AppError::Persistence(message.clone()));
        }
        *self.writes.lock().unwrap() += 1;
        self.records
            .lock()
            .unwrap()
            .insert(record.file_key.clone(), record.labels.clone());
        Ok(())
    }
}
