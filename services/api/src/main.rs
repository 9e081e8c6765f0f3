mod error;
mod jira;
mod tickets;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};

use jira::client::{JiraClient, JiraClientConfig};
use sprintlens_analytics::AnalyticsConfig;
use sprintlens_common::types::ServiceInfo;
use sprintlens_config::{init_tracing, AppConfig};

#[derive(Clone)]
pub struct AppState {
    pub jira: JiraClient,
    pub analytics: AnalyticsConfig,
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info() -> Json<ServiceInfo> {
    Json(ServiceInfo::new("sprintlens-api"))
}

async fn metrics() -> impl IntoResponse {
    let body = "\
# HELP sprintlens_up Service up indicator\n\
# TYPE sprintlens_up gauge\n\
sprintlens_up 1\n\
# HELP sprintlens_info Service info\n\
# TYPE sprintlens_info gauge\n\
sprintlens_info{service=\"sprintlens-api\",version=\"0.1.0\"} 1\n";

    (
        StatusCode::OK,
        [(
            header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        body,
    )
}

fn build_router(state: AppState) -> Router {
    // The proxy is called from a browser SPA; stay permissive like the
    // deployment it fronts.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/metrics", get(metrics))
        .merge(tickets::router())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    init_tracing("info");

    let config = AppConfig::from_env().expect("failed to load config");
    tracing::info!(service = "sprintlens-api", "starting");

    let jira = JiraClient::new(JiraClientConfig {
        timeout_secs: config.jira_timeout_secs,
        max_retries: config.jira_max_retries,
        max_results: config.jira_max_results,
    })
    .expect("failed to build tracker client");

    let state = AppState {
        jira,
        analytics: AnalyticsConfig::default(),
    };

    let app = build_router(state);
    let addr: SocketAddr = config.bind_addr().parse().expect("invalid bind address");

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
