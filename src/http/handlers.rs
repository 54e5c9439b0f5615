//! Request handlers.

use axum::{
    body::Body,
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, Method},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::artifacts::mint_id;
use crate::config::TemplateConfig;
use crate::cv::{build_cv_record, AtsReport, CvRecord};
use crate::http::request::{RequestId, Submission};
use crate::http::response::ApiError;
use crate::http::state::AppState;
use crate::observability::metrics;
use crate::static_files::{self, Resolution};
use crate::validation::{safe_filename, UploadClass, UploadDescriptor};

/// Multipart field carrying the uploaded resume.
const FILE_FIELD: &str = "file";

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.config().environment.as_str(),
    }))
}

pub async fn templates(State(state): State<AppState>) -> Json<Vec<TemplateConfig>> {
    Json(state.config().cv.templates.clone())
}

#[derive(Debug, Serialize)]
pub struct GenerateCvResponse {
    pub id: String,
    pub nome: String,
    pub template: String,
    pub message: &'static str,
}

pub async fn generate_cv(
    State(state): State<AppState>,
    request_id: RequestId,
    Submission(fields): Submission,
) -> Result<Json<GenerateCvResponse>, ApiError> {
    let config = state.config();
    let validator = state.validator();

    let id = mint_id();
    let record = build_cv_record(&validator, &config.cv, &fields, id.clone(), Utc::now())
        .inspect_err(|e| {
            tracing::info!(request_id = %request_id, reason = %e, "CV submission rejected");
        })?;

    let response = GenerateCvResponse {
        id: id.clone(),
        nome: record.nome.clone(),
        template: record.template.clone(),
        message: "CV generated successfully",
    };
    state.artifacts.put(id.clone(), record);
    metrics::record_artifacts_stored(state.artifacts.len());

    tracing::info!(
        request_id = %request_id,
        artifact_id = %id,
        template = %response.template,
        "CV generated"
    );
    Ok(Json(response))
}

pub async fn get_cv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CvRecord>, ApiError> {
    state.artifacts.get(&id).map(Json).ok_or(ApiError::NotFound)
}

pub async fn download_cv(
    State(state): State<AppState>,
    request_id: RequestId,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let record = state.artifacts.get(&id).ok_or(ApiError::NotFound)?;
    let bytes = serde_json::to_vec_pretty(&record).map_err(|e| {
        ApiError::internal(state.config().environment, request_id.as_str(), e)
    })?;

    let disposition = format!(
        "attachment; filename=\"curriculo-{}.json\"",
        safe_filename(&record.nome)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Checks the uploaded resume's metadata and returns the compatibility report.
///
/// Only the `file` field is considered; its bytes are counted, not kept.
pub async fn ats_analyze(
    State(state): State<AppState>,
    request_id: RequestId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AtsReport>, ApiError> {
    let mut multipart = multipart?;
    let mut upload = None;

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) || upload.is_some() {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_owned);

        let mut size = 0u64;
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len() as u64;
        }
        upload = Some(UploadDescriptor::new(size, content_type.as_deref(), file_name));
    }

    let upload = upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;
    state
        .validator()
        .validate_file_upload(Some(&upload), UploadClass::Resume)
        .inspect_err(|e| {
            tracing::info!(request_id = %request_id, reason = %e, "Resume upload rejected");
        })?;

    tracing::info!(
        request_id = %request_id,
        file_name = %upload.file_name,
        size = upload.size,
        "Resume analyzed"
    );
    Ok(Json(AtsReport::mock()))
}

pub async fn api_not_found() -> ApiError {
    ApiError::NotFound
}

pub async fn static_index(
    State(state): State<AppState>,
    request_id: RequestId,
    method: Method,
) -> Result<Response, ApiError> {
    let fallback = state.config().static_files.fallback.clone();
    serve_static(&state, &fallback, &request_id, &method).await
}

/// Paths under `/api` never fall through to static content.
pub async fn static_file(
    State(state): State<AppState>,
    request_id: RequestId,
    method: Method,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    if is_api_path(&path) {
        return Err(ApiError::NotFound);
    }
    serve_static(&state, &path, &request_id, &method).await
}

fn is_api_path(path: &str) -> bool {
    let first = path.split('/').next().unwrap_or_default();
    first.eq_ignore_ascii_case("api")
}

async fn serve_static(
    state: &AppState,
    requested: &str,
    request_id: &RequestId,
    method: &Method,
) -> Result<Response, ApiError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(ApiError::MethodNotAllowed);
    }

    let path = match state.resolver.resolve(requested, request_id.as_str()).await {
        Resolution::Serve(path) | Resolution::Fallback(path) => path,
        Resolution::Deny => return Err(ApiError::Forbidden),
        Resolution::NotFound => return Err(ApiError::NotFound),
    };

    let file = static_files::load(&path).await.map_err(|e| {
        ApiError::internal(state.config().environment, request_id.as_str(), e)
    })?;
    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(file.bytes)
    };
    Ok(([(header::CONTENT_TYPE, file.content_type)], body).into_response())
}
