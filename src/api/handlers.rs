//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::debug;

use crate::cache::{CacheEntry, EvictionCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    check_ordered_range, ContainsResponse, DeleteResponse, GetResponse, HealthResponse,
    SetRequest, SetResponse, StatsResponse,
};

/// The cache type served over HTTP.
pub type SharedCache = Arc<EvictionCache<String, String>>;

/// Application state shared across all handlers.
///
/// The cache synchronizes internally, so handlers share it through an `Arc`
/// without an outer lock.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache
    pub cache: SharedCache,
    /// Seconds added to now when a request carries no expiry
    pub default_ttl: u64,
    /// Priority used when a request carries none
    pub default_priority: i64,
}

impl AppState {
    /// Creates a new AppState around `cache` with the default request settings.
    pub fn new(cache: EvictionCache<String, String>) -> Self {
        let defaults = Config::default();
        Self {
            cache: Arc::new(cache),
            default_ttl: defaults.default_ttl,
            default_priority: defaults.default_priority,
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Evicted entries are logged at debug level.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = EvictionCache::with_evict_callback(
            config.max_entries,
            |key: &String, entry: &CacheEntry<String>| {
                debug!(key = %key, priority = entry.priority, expiry = entry.expiry, "entry evicted");
            },
        )?;

        Ok(Self {
            cache: Arc::new(cache),
            default_ttl: config.default_ttl,
            default_priority: config.default_priority,
        })
    }
}

/// Handler for PUT /set
///
/// Stores a key-value pair with optional priority and expiry.
///
/// The resolved priority and expiry must both fit the cache's 32-bit
/// ordering range, whether they came from the request or the defaults.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let expiry = req.resolve_expiry(state.cache.now(), state.default_ttl);
    let priority = req.priority.unwrap_or(state.default_priority);
    if let Some(error_msg) = check_ordered_range("priority", priority)
        .or_else(|| check_ordered_range("expiry", expiry))
    {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let evicted = state.cache.set(req.key.clone(), req.value, priority, expiry);

    Ok(Json(SetResponse::new(req.key, evicted)))
}

/// Handler for GET /get/:key
///
/// Retrieves an entry by key and refreshes its recency.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let entry = state
        .cache
        .get(key.as_str())
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(GetResponse::new(key, entry, state.cache.now())))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if !state.cache.remove(key.as_str()) {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for GET /contains/:key
///
/// Membership only; does not touch recency.
pub async fn contains_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<ContainsResponse> {
    let present = state.cache.contains(key.as_str());
    Json(ContainsResponse::new(key, present))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats();
    Json(StatsResponse::new(&stats, state.cache.capacity()))
}

/// Handler for GET /dump
///
/// Plain-text listing of every entry.
pub async fn dump_handler(State(state): State<AppState>) -> String {
    state.cache.dump()
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
