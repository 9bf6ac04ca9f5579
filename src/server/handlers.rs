use crate::error::{AppError, ErrorResponse};
use crate::server::pipeline::{UploadOutcome, UploadPipeline, UploadedFile};
use crate::server::render::render_upload_page;
use crate::server::types::{AnalyzeResponse, AppState, StatusResponse, UploadResponse};
use crate::services::records::AnalysisRecord;
use crate::utils::constants::{FILE_FIELD, MAX_LABELS, STATUS_MESSAGE};
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use std::sync::Arc;

// server status handler
pub async fn server_status_handler() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: STATUS_MESSAGE.to_string(),
    })
}

pub async fn upload_form_handler() -> Html<String> {
    Html(render_upload_page(None))
}

// uploads handler: JSON for API clients, the rendered page for browser form posts
pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let wants_html = prefers_html(&headers);

    let outcome = match read_file_field(multipart).await {
        Ok(file) => UploadPipeline::new(&state).run(file).await,
        Err(e) => UploadOutcome::rejected(e),
    };

    if wants_html {
        html_upload_response(outcome)
    } else {
        json_upload_response(outcome)
    }
}

pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Path(file_key): Path<String>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let start_time = std::time::Instant::now();

    let labels: Vec<String> = state
        .vision
        .detect_labels(&file_key, MAX_LABELS, None)
        .await?
        .into_iter()
        .map(|label| label.name)
        .collect();

    let record = AnalysisRecord {
        file_key: file_key.clone(),
        labels: labels.clone(),
    };
    state.records.put_record(&record).await?;

    tracing::info!(
        file_key = %file_key,
        labels = labels.len(),
        "analysis stored in {:?}",
        start_time.elapsed()
    );
    Ok(Json(AnalyzeResponse { file_key, labels }))
}

pub async fn not_found_handler() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Not found".to_string(),
        }),
    )
}

/// Pulls the `file` part out of the form. A request that is not multipart at
/// all is treated the same as a form without a file.
async fn read_file_field(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Option<UploadedFile>, AppError> {
    let Ok(mut multipart) = multipart else {
        return Ok(None);
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e.status(), e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // a plain text field named `file` is not an upload
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };

        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(e.status(), e.body_text()))?;

        // browsers send an empty unnamed part when no file was picked
        if filename.is_empty() && data.is_empty() {
            return Ok(None);
        }

        return Ok(Some(UploadedFile {
            filename,
            content_type,
            data,
        }));
    }

    Ok(None)
}

fn multipart_error(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::Validation(message)
    }
}

fn prefers_html(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .map(|accept| {
            accept
                .split(',')
                .any(|media| media.trim().starts_with("text/html"))
        })
        .unwrap_or(false)
}

fn json_upload_response(outcome: UploadOutcome) -> Response {
    if let Some(error) = outcome.error {
        return error.into_response();
    }

    (
        StatusCode::OK,
        Json(UploadResponse {
            message: "File uploaded".to_string(),
            file_key: outcome.file_key.unwrap_or_default(),
            image_url: outcome.image_url,
            labels: outcome.labels,
            faces: outcome.faces,
        }),
    )
        .into_response()
}

fn html_upload_response(outcome: UploadOutcome) -> Response {
    let status = match &outcome.error {
        Some(error) => {
            error.log();
            error.status_code()
        }
        None => StatusCode::OK,
    };

    (status, Html(render_upload_page(Some(&outcome)))).into_response()
}
