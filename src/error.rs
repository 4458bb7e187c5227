use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Error taxonomy for the HTTP surface. Business logic returns these
/// directly; adapter failures arrive through `anyhow` and collapse to
/// `Internal`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("Validation Error")]
    Validation { details: serde_json::Value },
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    UnsupportedMediaType(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
    pub fn unsupported_media_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedMediaType(msg.into())
    }
    pub fn payload_too_large(msg: impl Into<String>) -> Self {
        Self::PayloadTooLarge(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::UnsupportedMediaType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized(_) => "Unauthorized",
            Self::Forbidden(_) => "Forbidden",
            Self::NotFound(_) => "NotFound",
            Self::BadRequest(_) => "BadRequest",
            Self::Validation { .. } => "ValidationError",
            Self::Conflict(_) => "Conflict",
            Self::UnsupportedMediaType(_) => "UnsupportedMediaType",
            Self::PayloadTooLarge(_) => "PayloadTooLarge",
            Self::Internal(_) => "Internal",
        }
    }
}

/// Wire shape of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

fn in_production() -> bool {
    std::env::var("APP_ENV")
        .map(|v| v == "production")
        .unwrap_or(false)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let body = match &self {
            Self::Internal(e) => {
                error!(error = ?e, "internal error");
                if in_production() {
                    ErrorBody {
                        message: "Internal server error".into(),
                        error: kind,
                        details: None,
                        stack: None,
                    }
                } else {
                    ErrorBody {
                        message: e.to_string(),
                        error: kind,
                        details: None,
                        stack: Some(format!("{e:?}")),
                    }
                }
            }
            Self::Validation { details } => ErrorBody {
                message: "Validation Error".into(),
                error: kind,
                details: Some(details.clone()),
                stack: None,
            },
            other => ErrorBody {
                message: other.to_string(),
                error: kind,
                details: None,
                stack: None,
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => Self::not_found("Resource not found"),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::conflict("A record with this information already exists")
            }
            _ => Self::Internal(e.into()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details = Vec::new();
        flatten_errors(&mut details, "", &errors);
        Self::Validation {
            details: serde_json::Value::Array(details),
        }
    }
}

fn flatten_errors(out: &mut Vec<serde_json::Value>, prefix: &str, errors: &validator::ValidationErrors) {
    use validator::ValidationErrorsKind;
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for e in errs {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    out.push(serde_json::json!({ "field": path, "message": message }));
                }
            }
            ValidationErrorsKind::Struct(nested) => flatten_errors(out, &path, nested),
            ValidationErrorsKind::List(map) => {
                for (idx, nested) in map {
                    flatten_errors(out, &format!("{path}[{idx}]"), nested);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Debug, Validate)]
    struct Sample {
        #[validate(length(min = 3, message = "too short"))]
        title: String,
    }

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            ApiError::unauthorized("x").status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::forbidden("x").status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::conflict("x").status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::unsupported_media_type("x").status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            ApiError::payload_too_large("x").status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let sample = Sample { title: "ab".into() };
        let err: ApiError = sample.validate().unwrap_err().into();
        let ApiError::Validation { details } = err else {
            panic!("expected validation error");
        };
        let rendered = details.to_string();
        assert!(rendered.contains("title"));
        assert!(rendered.contains("too short"));
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn error_body_skips_empty_fields() {
        let body = ErrorBody {
            message: "Job not found".into(),
            error: "NotFound",
            details: None,
            stack: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("Job not found"));
        assert!(!json.contains("stack"));
        assert!(!json.contains("details"));
    }
}
