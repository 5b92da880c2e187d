use crate::core::{Credential, TradeField, TradeQuery, YearSummary};
use crate::server::error::ApiError;
use crate::server::AppState;
use crate::utils::error::Result;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

/// Query string shared by the trade endpoints. A missing or undecodable
/// parameter is answered with the same JSON error body as any other 400.
#[derive(Debug, Deserialize)]
pub struct TradeParams {
    pub start: String,
    pub end: String,
    pub country: String,
    pub hs: Option<String>,
    /// Column to sum on `/api/totalExport`; defaults to `expDlr`.
    pub data: Option<String>,
}

impl TradeParams {
    pub fn to_query(&self, credential: &Credential) -> Result<TradeQuery> {
        TradeQuery::new(
            self.start.clone(),
            self.end.clone(),
            self.country.clone(),
            self.hs.clone(),
            credential.clone(),
        )
    }

    pub fn field(&self) -> Result<TradeField> {
        Ok(self
            .data
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(str::parse::<TradeField>)
            .transpose()?
            .unwrap_or(TradeField::ExpDlr))
    }
}

/// Handler for `GET /api/data`: the upstream document as JSON.
pub async fn get_trade_data(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<TradeParams>, QueryRejection>,
) -> std::result::Result<Response, ApiError> {
    let Query(params) = params?;
    let query = params.to_query(&state.credential)?;
    let body = state.pipeline.document_json(&query).await?;

    Ok((
        [(header::CONTENT_TYPE, "application/json; charset=UTF-8")],
        body,
    )
        .into_response())
}

/// Handler for `GET /api/totalExport`.
pub async fn get_total_export(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<TradeParams>, QueryRejection>,
) -> std::result::Result<Json<Value>, ApiError> {
    let Query(params) = params?;
    let field = params.field()?;
    let query = params.to_query(&state.credential)?;
    let total = state.pipeline.field_total(&query, field).await?;

    Ok(Json(json!({ "totalExport": total })))
}

/// Handler for `GET /api/yearly`.
pub async fn get_yearly_summary(
    State(state): State<Arc<AppState>>,
    params: std::result::Result<Query<TradeParams>, QueryRejection>,
) -> std::result::Result<Json<Vec<YearSummary>>, ApiError> {
    let Query(params) = params?;
    let query = params.to_query(&state.credential)?;
    let summaries = state.pipeline.yearly_summaries(&query).await?;
    tracing::info!(
        country = %query.country_code,
        years = summaries.len(),
        "Yearly summary served"
    );

    Ok(Json(summaries))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "service": env!("CARGO_PKG_NAME"),
        "status": "running",
        "upstream": state.upstream_endpoint,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::TradeError;

    fn params(data: Option<&str>) -> TradeParams {
        TradeParams {
            start: "202101".to_string(),
            end: "202112".to_string(),
            country: "US".to_string(),
            hs: None,
            data: data.map(str::to_string),
        }
    }

    #[test]
    fn test_field_defaults_to_export_amount() {
        assert_eq!(params(None).field().unwrap(), TradeField::ExpDlr);
        assert_eq!(params(Some("")).field().unwrap(), TradeField::ExpDlr);
        assert_eq!(params(Some("impWgt")).field().unwrap(), TradeField::ImpWgt);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(matches!(
            params(Some("weight")).field(),
            Err(TradeError::UnknownField { .. })
        ));
    }
}
