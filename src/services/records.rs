use crate::error::AppError;
use crate::services::sdk_error::sdk_error_message;
use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AnalysisRecord {
    pub file_key: String,
    pub labels: Vec<String>,
}

impl AnalysisRecord {
    pub fn to_item(&self) -> HashMap<String, AttributeValue> {
        let labels = self
            .labels
            .iter()
            .map(|label| AttributeValue::S(label.clone()))
            .collect();

        HashMap::from([
            ("file_key".to_string(), AttributeValue::S(self.file_key.clone())),
            ("labels".to_string(), AttributeValue::L(labels)),
        ])
    }
}

/// Key-value persistence for analysis results. Writes are upserts keyed by
/// `file_key`; a later write replaces the earlier one entirely.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn put_record(&self, record: &AnalysisRecord) -> Result<(), AppError>;
}

pub struct DynamoRecordStore {
    client: Client,
    table: String,
}

impl DynamoRecordStore {
    pub fn new(client: Client, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
        }
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn put_record(&self, record: &AnalysisRecord) -> Result<(), AppError> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(record.to_item()))
            .send()
            .await
            .map_err(|e| AppError::Persistence(sdk_error_message(&e)))?;

        tracing::debug!(table = %self.table, file_key = %record.file_key, "analysis record written");
        Ok(())
    }
}
