//! HTTP error mapping
//!
//! Every failure the API can surface goes through [`ApiError`]:
//! schema problems become 422 with a list of issues, oversized bodies
//! become 413, analyzer failures become 500 with the error text as `detail`.

use crate::analysis::AnalysisError;
use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

/// One schema problem found in a request body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationIssue {
    pub fn body(msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".to_string()],
            msg: msg.into(),
            kind: kind.into(),
        }
    }
}

impl From<JsonRejection> for ValidationIssue {
    fn from(rejection: JsonRejection) -> Self {
        let kind = match &rejection {
            JsonRejection::JsonDataError(_) => "value_error",
            JsonRejection::JsonSyntaxError(_) => "json_invalid",
            JsonRejection::MissingJsonContentType(_) => "content_type",
            JsonRejection::BytesRejection(_) => "body_unreadable",
            _ => "invalid_request",
        };
        Self::body(rejection.body_text(), kind)
    }
}

/// Errors returned by API handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request validation failed")]
    Validation(Vec<ValidationIssue>),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return ApiError::PayloadTooLarge(rejection.body_text());
        }
        ApiError::Validation(vec![rejection.into()])
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct Detail<T: Serialize> {
            detail: T,
        }

        match self {
            ApiError::Validation(issues) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(Detail { detail: issues }),
            )
                .into_response(),
            ApiError::PayloadTooLarge(msg) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(Detail { detail: msg }),
            )
                .into_response(),
            ApiError::Analysis(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(Detail {
                    detail: err.to_string(),
                }),
            )
                .into_response(),
        }
    }
}

/// JSON body extractor: schema rejections answer 422, oversized bodies 413
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_is_422_with_issue_list() {
        let err = ApiError::Validation(vec![ValidationIssue::body("missing field `logs`", "value_error")]);
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["detail"][0]["loc"][0], "body");
        assert_eq!(body["detail"][0]["type"], "value_error");
        assert_eq!(body["detail"][0]["msg"], "missing field `logs`");
    }

    #[tokio::test]
    async fn test_payload_too_large_is_413() {
        let err = ApiError::PayloadTooLarge("length limit exceeded".to_string());
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "length limit exceeded");
    }

    #[tokio::test]
    async fn test_analysis_error_is_500_with_error_string() {
        let err: ApiError = AnalysisError::Internal("model crashed".to_string()).into();
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "model crashed");
    }
}
