use crate::config::ServerConfig;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Duration;
use fleetmap_log_index::HttpLogIndex;
use fleetmap_store::{KeyScheme, RedisSettings};
use fleetmap_topology::{
    active_redirects, active_stream_count, adapter_assignments, connected_transcoders,
    ingester_hosts, Directory, DirectoryResolver, IngesterHost, Redirect, TopologyError,
};
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct AppState {
    pub config: ServerConfig,
    scheme: KeyScheme,
    redis: RedisSettings,
    resolver: DirectoryResolver,
    index: HttpLogIndex,
}

impl AppState {
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let scheme = config.key_scheme();
        let redis = config.redis_settings();
        let resolver = DirectoryResolver::new(scheme.clone());
        let index = HttpLogIndex::new(config.index_url.clone(), config.index_name.clone())
            .map_err(|err| anyhow::anyhow!("could not build index client: {err}"))?
            .max_results(config.index_max_results);
        Ok(Self {
            config,
            scheme,
            redis,
            resolver,
            index,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/ingesters", get(ingesters))
        .route("/ingesters/hosts", get(ingester_host_list))
        .route("/ingesters/count", get(ingesters_count))
        .route("/ingesters/slots", get(ingesters_slots))
        .route("/streams/count", get(streams_count))
        .route("/streams/active/count", get(streams_active_count))
        .route("/redirects", get(redirects))
        .route("/adapters", get(adapters))
        .route("/adapters/count", get(adapters_count))
        .route("/adapters/slots", get(adapters_slots))
        .route("/adapters/slots/used", get(adapters_slots_used))
        .route("/transcoders", get(transcoders))
        .with_state(state)
}

enum AppError {
    Topology(TopologyError),
    Empty(&'static str),
}

impl From<TopologyError> for AppError {
    fn from(err: TopologyError) -> Self {
        Self::Topology(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Topology(err) if err.is_connectivity() => {
                log::error!("upstream unavailable: {err}");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "directory temporarily unavailable",
                )
                    .into_response()
            }
            AppError::Topology(err) => {
                log::error!("{err}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
            AppError::Empty(what) => {
                (StatusCode::INTERNAL_SERVER_ERROR, what).into_response()
            }
        }
    }
}

/// Resolve the directory over a store connection scoped to this request.
async fn resolve(state: &AppState) -> Result<Directory, AppError> {
    let mut store = state.redis.connect().await.map_err(TopologyError::from)?;
    Ok(state.resolver.resolve(&mut store).await?)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn ingesters(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, Vec<String>>>, AppError> {
    let directory = resolve(&state).await?;
    if directory.assignments.is_empty() {
        return Err(AppError::Empty("no stream assignments in store"));
    }
    Ok(Json(directory.assignments))
}

async fn ingester_host_list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<IngesterHost>>, AppError> {
    let directory = resolve(&state).await?;
    let hosts = ingester_hosts(&directory, state.config.trim_suffix())?;
    Ok(Json(hosts))
}

async fn ingesters_count(State(state): State<Arc<AppState>>) -> Result<String, AppError> {
    let directory = resolve(&state).await?;
    Ok(directory.assignments.len().to_string())
}

async fn ingesters_slots(State(state): State<Arc<AppState>>) -> Result<String, AppError> {
    let directory = resolve(&state).await?;
    let slots = directory.assignments.len() * state.config.max_ingester_slots;
    Ok(slots.to_string())
}

async fn streams_count(State(state): State<Arc<AppState>>) -> Result<String, AppError> {
    let mut store = state.redis.connect().await.map_err(TopologyError::from)?;
    let count = state.resolver.stream_count(&mut store).await?;
    Ok(count.to_string())
}

async fn streams_active_count(State(state): State<Arc<AppState>>) -> Result<String, AppError> {
    let count = active_stream_count(
        &state.index,
        &state.config.active_stream_filter,
        Duration::seconds(state.config.transcoder_window_secs),
    )
    .await?;
    Ok(count.to_string())
}

async fn redirects(State(state): State<Arc<AppState>>) -> Result<Json<Vec<Redirect>>, AppError> {
    let mut store = state.redis.connect().await.map_err(TopologyError::from)?;
    let redirects = active_redirects(
        &mut store,
        &state.scheme.redirect_hash(&state.config.redirect_group),
        Duration::seconds(state.config.redirect_max_age_secs),
    )
    .await?;
    Ok(Json(redirects))
}

async fn fetch_adapters(state: &AppState) -> Result<BTreeMap<String, Vec<String>>, AppError> {
    let assignments = adapter_assignments(
        &state.index,
        &state.config.adapter_component,
        Duration::seconds(state.config.adapter_window_secs),
    )
    .await?;
    if assignments.is_empty() {
        return Err(AppError::Empty("no adapters reporting"));
    }
    Ok(assignments)
}

async fn adapters(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, Vec<String>>>, AppError> {
    Ok(Json(fetch_adapters(&state).await?))
}

async fn adapters_count(State(state): State<Arc<AppState>>) -> Result<String, AppError> {
    let assignments = fetch_adapters(&state).await?;
    Ok(assignments.len().to_string())
}

async fn adapters_slots(State(state): State<Arc<AppState>>) -> Result<String, AppError> {
    let assignments = fetch_adapters(&state).await?;
    let slots = assignments.len() * state.config.max_adapter_slots;
    Ok(slots.to_string())
}

async fn adapters_slots_used(State(state): State<Arc<AppState>>) -> Result<String, AppError> {
    let assignments = fetch_adapters(&state).await?;
    Ok(used_slots(&assignments).to_string())
}

async fn transcoders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BTreeMap<String, Vec<String>>>, AppError> {
    let hosts = connected_transcoders(
        &state.index,
        &state.config.transcoder_component,
        Duration::seconds(state.config.transcoder_window_secs),
    )
    .await?;
    Ok(Json(hosts))
}

fn used_slots(assignments: &BTreeMap<String, Vec<String>>) -> usize {
    assignments.values().map(Vec::len).sum()
}
