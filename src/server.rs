use std::path::Path;
use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use thiserror::Error;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::classifier::WasteClassifier;
use crate::error::ClassifierError;
use crate::labels::load_labels;
use crate::render::{self, ClassifyOutcome, UploadedImage, ICON_ROUTE};
use crate::report::ClassificationReport;

const UPLOAD_FIELD: &str = "image";

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<WasteClassifier>,
}

impl AppState {
    pub fn new(classifier: WasteClassifier) -> Self {
        AppState {
            classifier: Arc::new(classifier),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("No image was uploaded; expected a multipart field named 'image'")]
    MissingUpload,

    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Classifier(#[from] ClassifierError),

    #[error("Classification task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::MissingUpload => StatusCode::BAD_REQUEST,
            ServerError::Multipart(err) => err.status(),
            ServerError::Classifier(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            ServerError::Classifier(err) if err.is_asset_error() => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Classifier(_) | ServerError::Join(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ServerError::MissingUpload | ServerError::Multipart(_) => "BAD_UPLOAD",
            ServerError::Classifier(ClassifierError::Decode(_)) => "BAD_IMAGE",
            ServerError::Classifier(err) if err.is_asset_error() => "MODEL_UNAVAILABLE",
            ServerError::Classifier(_) | ServerError::Join(_) => "CLASSIFICATION_FAILED",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorEnvelope<'a> {
            error: ErrorBody<'a>,
        }

        #[derive(Serialize)]
        struct ErrorBody<'a> {
            code: &'a str,
            message: String,
        }

        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "classification request failed");
        } else {
            tracing::warn!(error = %self, "rejected classification request");
        }

        (
            status,
            Json(ErrorEnvelope {
                error: ErrorBody {
                    code: self.code(),
                    message: self.to_string(),
                },
            }),
        )
            .into_response()
    }
}

pub fn router(state: AppState, icon_dir: &Path, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/classify", post(classify_page))
        .route("/api/classify", post(classify_api))
        .route("/health", get(health))
        .nest_service(ICON_ROUTE, ServeDir::new(icon_dir))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn read_labels(state: &AppState) -> crate::Result<Vec<String>> {
    let classifier = state.classifier.clone();
    match tokio::task::spawn_blocking(move || load_labels(classifier.labels_path())).await {
        Ok(labels) => labels,
        Err(err) => Err(ClassifierError::LabelsRead {
            path: state.classifier.labels_path().to_path_buf(),
            source: std::io::Error::other(err),
        }),
    }
}

async fn index(State(state): State<AppState>) -> Html<String> {
    let labels = read_labels(&state).await;
    if let Err(err) = &labels {
        tracing::warn!(error = %err, "label listing unavailable");
    }
    Html(render::page(&labels, None))
}

async fn read_upload(multipart: &mut Multipart) -> Result<Vec<u8>, ServerError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field.bytes().await?;
            if bytes.is_empty() {
                return Err(ServerError::MissingUpload);
            }
            return Ok(bytes.to_vec());
        }
    }
    Err(ServerError::MissingUpload)
}

async fn classify(state: &AppState, bytes: Vec<u8>) -> Result<ClassificationReport, ServerError> {
    let classifier = state.classifier.clone();
    let report = tokio::task::spawn_blocking(move || classifier.classify_bytes(&bytes)).await??;
    Ok(report)
}

async fn classify_page(State(state): State<AppState>, mut multipart: Multipart) -> Html<String> {
    let outcome = match read_upload(&mut multipart).await {
        Err(err) => ClassifyOutcome::Failed {
            upload: None,
            message: err.to_string(),
        },
        Ok(bytes) => {
            tracing::info!(bytes = bytes.len(), "received upload");
            match classify(&state, bytes.clone()).await {
                Ok(report) => ClassifyOutcome::Classified {
                    upload: UploadedImage::new(bytes),
                    report,
                },
                Err(err) => {
                    tracing::warn!(error = %err, "classification failed");
                    let upload = match &err {
                        ServerError::Classifier(ClassifierError::Decode(_)) => None,
                        _ => Some(UploadedImage::new(bytes)),
                    };
                    ClassifyOutcome::Failed {
                        upload,
                        message: err.to_string(),
                    }
                }
            }
        }
    };

    let labels = read_labels(&state).await;
    Html(render::page(&labels, Some(&outcome)))
}

async fn classify_api(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ClassificationReport>, ServerError> {
    let bytes = read_upload(&mut multipart).await?;
    let report = classify(&state, bytes).await?;
    Ok(Json(report))
}
