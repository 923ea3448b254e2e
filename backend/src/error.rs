use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use shared::ErrorResponse;

use crate::pipeline::PipelineError;
use crate::report::ReportError;
use crate::upload::UploadError;

/// Errors surfaced to the browser for a single interaction.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Worker pool failure: {0}")]
    Blocking(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Upload(UploadError::MissingImage) => "MISSING_IMAGE",
            ApiError::Upload(UploadError::UnsupportedType { .. }) => "UNSUPPORTED_FORMAT",
            ApiError::Upload(UploadError::TooLarge { .. }) => "FILE_TOO_LARGE",
            ApiError::Upload(UploadError::Empty) => "EMPTY_FILE",
            ApiError::Upload(UploadError::Multipart(_)) => "MALFORMED_UPLOAD",
            ApiError::Pipeline(PipelineError::InvalidImage(_)) => "INVALID_IMAGE",
            ApiError::Pipeline(PipelineError::ModelUnavailable) => "MODEL_UNAVAILABLE",
            ApiError::Pipeline(_) => "INFERENCE_ERROR",
            ApiError::Report(ReportError::Encoding { .. }) => "ENCODING_ERROR",
            ApiError::Report(ReportError::Pdf(_) | ReportError::Io(_)) => "REPORT_ERROR",
            ApiError::InvalidRequest(_) => "INVALID_REQUEST",
            ApiError::Blocking(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Upload(UploadError::UnsupportedType { .. }) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            ApiError::Upload(UploadError::TooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Upload(_) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::InvalidImage(_)) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::ModelUnavailable) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Pipeline(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Report(ReportError::Encoding { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Report(ReportError::Pdf(_) | ReportError::Io(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {} ({})", self, status);
        } else {
            log::warn!("Request rejected: {} ({})", self, status);
        }

        HttpResponse::build(status).json(ErrorResponse {
            error: self.to_string(),
            code: self.code().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_errors_are_unprocessable() {
        let err = ApiError::from(ReportError::Encoding {
            field: "user_name",
            ch: '名',
        });
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.code(), "ENCODING_ERROR");
    }

    #[test]
    fn pdf_write_failures_are_server_errors() {
        let err = ApiError::from(ReportError::from(std::io::Error::other("disk gone")));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "REPORT_ERROR");
    }

    #[test]
    fn missing_models_are_service_unavailable() {
        let err = ApiError::from(PipelineError::ModelUnavailable);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn upload_errors_map_to_client_statuses() {
        assert_eq!(
            ApiError::from(UploadError::TooLarge { max: 1 }).status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::from(UploadError::MissingImage).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
