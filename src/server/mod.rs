use crate::core::aggregate::YearAggregator;
use crate::core::fetcher::TradeXmlFetcher;
use crate::core::pipeline::TradePipeline;
use crate::core::query::QueryBuilder;
use crate::core::{ConfigProvider, Credential, XmlSource};
use crate::utils::error::{Result, TradeError};
use crate::utils::validation::validate_socket_addr;
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// Shared by every handler. Nothing in here changes after startup.
pub struct AppState {
    pub pipeline: TradePipeline<Box<dyn XmlSource>>,
    pub credential: Credential,
    pub upstream_endpoint: String,
}

impl AppState {
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let builder = QueryBuilder::new(config.api_endpoint())?;
        let source: Box<dyn XmlSource> = Box::new(TradeXmlFetcher::new(builder));
        Ok(Self::with_source(config, source))
    }

    /// Same as [`AppState::from_config`] but with a caller-supplied upstream.
    pub fn with_source<C: ConfigProvider>(config: &C, source: Box<dyn XmlSource>) -> Self {
        Self {
            pipeline: TradePipeline::new(source, YearAggregator::new(config.total_sentinel())),
            credential: Credential::new(config.service_key()),
            upstream_endpoint: config.api_endpoint().to_string(),
        }
    }
}

fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if allowed_origins.is_empty() {
        return Ok(CorsLayer::new()
            .allow_origin(AllowOrigin::any())
            .allow_methods(methods)
            .allow_headers(AllowHeaders::any()));
    }

    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| TradeError::InvalidConfigValue {
                field: "server.allowed_origins".to_string(),
                value: origin.clone(),
                reason: e.to_string(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Credentials rule out wildcard headers, so echo the requested ones.
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

pub fn build_router(state: AppState, allowed_origins: &[String]) -> Result<Router> {
    let cors = cors_layer(allowed_origins)?;

    Ok(Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/status", get(handlers::get_status))
        .route("/api/data", get(handlers::get_trade_data))
        .route("/api/totalExport", get(handlers::get_total_export))
        .route("/api/yearly", get(handlers::get_yearly_summary))
        .with_state(Arc::new(state))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

pub async fn run_server<C: ConfigProvider>(config: &C) -> Result<()> {
    let addr: SocketAddr = validate_socket_addr("server.bind", config.bind_addr())?;
    let state = AppState::from_config(config)?;
    let app = build_router(state, config.allowed_origins())?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
