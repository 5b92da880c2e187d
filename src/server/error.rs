use crate::utils::error::TradeError;
use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// HTTP face of [`TradeError`]: `{"error": "<message>"}` with 400 for caller
/// mistakes and 500 for everything else.
#[derive(Debug)]
pub struct ApiError(pub TradeError);

impl From<TradeError> for ApiError {
    fn from(err: TradeError) -> Self {
        ApiError(err)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(TradeError::MalformedRequest {
            message: rejection.body_text(),
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            tracing::warn!(error = %self.0, "Rejected request.");
            StatusCode::BAD_REQUEST
        } else {
            tracing::error!(error = ?self.0, "Trade pipeline failed.");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Params {
        country: String,
    }

    #[test]
    fn test_status_mapping() {
        let response = ApiError(TradeError::parse("bad xml")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = ApiError(TradeError::UnknownField {
            name: "weight".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_rejection_becomes_json_bad_request() {
        let uri: Uri = "/api/data?start=202001".parse().unwrap();
        let rejection = Query::<Params>::try_from_uri(&uri).unwrap_err();

        let response = ApiError::from(rejection).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let message = body["error"].as_str().unwrap();
        assert!(message.starts_with("Malformed request:"));
        assert!(message.contains("country"));
    }
}
