use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, Method, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Deserialize;
use std::{collections::HashMap, sync::Arc};
use tokio::{net::TcpListener, signal};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    config::{ProxyNamespace, Settings},
    models::{Comparison, ProjectConfig, RewardEstimate, UserOverview},
    proxy::{
        error::ProxyError,
        forward::{ForwardRequest, Forwarder},
    },
    scoring::ScoreCalculator,
};

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub forwarder: Arc<Forwarder>,
    pub calculator: Arc<ScoreCalculator>,
}

impl AppState {
    pub fn new(settings: Settings, calculator: Arc<ScoreCalculator>) -> Result<Self, ProxyError> {
        // Overlapping routes make the router panic at registration.
        settings.validate().map_err(ProxyError::Config)?;
        let forwarder = Forwarder::new(&settings.proxy, &settings.upstream)?;
        Ok(Self {
            settings: Arc::new(settings),
            forwarder: Arc::new(forwarder),
            calculator,
        })
    }

    fn namespace(&self, prefix: &str) -> Option<&ProxyNamespace> {
        self.settings.proxy.namespaces.iter().find(|ns| ns.prefix == prefix)
    }
}

#[derive(Debug, Deserialize)]
pub struct SimulationQuery {
    pub fdv: Option<f64>,
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/projects", get(projects_handler))
        .route("/api/estimate/:project/:username", get(estimate_handler))
        .route("/api/compare/:project/:username/:fren", get(compare_handler))
        .route("/api/overview/:username", get(overview_handler));

    for namespace in &state.settings.proxy.namespaces {
        let prefix = namespace.prefix.clone();
        app = app.route(
            &format!("/api/{}/*path", namespace.prefix),
            any(
                move |state: State<AppState>,
                      Path(path): Path<String>,
                      method: Method,
                      uri: Uri,
                      headers: HeaderMap,
                      body: Bytes| {
                    let prefix = prefix.clone();
                    async move { proxy_handler(state, &prefix, path, method, uri, headers, body).await }
                },
            ),
        );
    }

    app.layer(middleware::map_response_with_state(state.clone(), add_cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn add_cors(State(state): State<AppState>, mut response: Response) -> Response {
    state.forwarder.apply_cors(response.headers_mut());
    response
}

async fn proxy_handler(
    State(state): State<AppState>,
    prefix: &str,
    path: String,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(namespace) = state.namespace(prefix) else {
        return ProxyError::Config(format!("namespace {} is not configured", prefix)).into_response();
    };

    if method != Method::OPTIONS && requires_username(prefix, &path) && !has_username(&uri) {
        return ProxyError::MissingUsername.into_response();
    }

    let request = ForwardRequest {
        method,
        path,
        query: uri.query().map(str::to_string),
        headers,
        body,
    };

    match state.forwarder.forward(namespace, request).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

// The yaps endpoint answers garbage without a username, so reject early.
fn requires_username(prefix: &str, path: &str) -> bool {
    prefix == "yap" && path.trim_end_matches('/') == "open"
}

fn has_username(uri: &Uri) -> bool {
    Query::<HashMap<String, String>>::try_from_uri(uri)
        .ok()
        .and_then(|Query(params)| params.get("username").map(|u| !u.trim().is_empty()))
        .unwrap_or(false)
}

async fn projects_handler(State(state): State<AppState>) -> Json<Vec<ProjectConfig>> {
    Json(state.calculator.registry().all().to_vec())
}

async fn estimate_handler(
    State(state): State<AppState>,
    Path((project, username)): Path<(String, String)>,
    Query(query): Query<SimulationQuery>,
) -> Result<Json<RewardEstimate>, ProxyError> {
    let fdv = query.fdv.unwrap_or(state.settings.simulation.default_fdv);
    let estimate = state.calculator.estimate(&project, &username, fdv).await?;
    Ok(Json(estimate))
}

async fn compare_handler(
    State(state): State<AppState>,
    Path((project, username, fren)): Path<(String, String, String)>,
    Query(query): Query<SimulationQuery>,
) -> Result<Json<Comparison>, ProxyError> {
    let fdv = query.fdv.unwrap_or(state.settings.simulation.default_fdv);
    let comparison = state.calculator.compare(&project, &username, &fren, fdv).await?;
    Ok(Json(comparison))
}

async fn overview_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserOverview>, ProxyError> {
    Ok(Json(state.calculator.overview(&username).await?))
}

pub async fn start_server(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let address = format!("{}:{}", host, port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Proxy running on {address}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
