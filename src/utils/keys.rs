use uuid::Uuid;

/// Builds the storage key for an upload: a fresh v4 UUID, a dash, then the
/// client supplied filename exactly as received.
pub fn generate_file_key(original_filename: &str) -> String {
    format!("{}-{}", Uuid::new_v4(), original_filename)
}
