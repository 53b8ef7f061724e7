//! API Handlers
//!
//! HTTP request handlers for the cache, rate limiter and verification endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::cache::CacheBackend;
use crate::config::Config;
use crate::error::{ApiError, ApiResult, CacheResult};
use crate::limiter::RateLimiter;
use crate::models::{
    ttl_millis, validate_key, CheckCodeRequest, CheckCodeResponse, CodeResponse, CounterRequest,
    CounterResponse, Delta, GetResponse, HealthResponse, LimiterResponse, PutRequest,
    WriteResponse,
};
use crate::verification::VerificationCode;

/// Application state shared across all handlers.
///
/// Holds the cache backend chosen at startup plus the limiter and
/// verification policies applied to every subject.
#[derive(Clone)]
pub struct AppState {
    /// Cache backend, in-process or Redis
    pub cache: Arc<dyn CacheBackend>,
    pub limiter_max_attempts: u32,
    pub limiter_ttl: Duration,
    pub verify_ttl: Duration,
    pub verify_code_length: usize,
}

impl AppState {
    /// Creates a new AppState with default policies.
    pub fn new(cache: Arc<dyn CacheBackend>) -> Self {
        Self::from_config(cache, &Config::default())
    }

    /// Creates a new AppState with policies taken from the Config.
    pub fn from_config(cache: Arc<dyn CacheBackend>, config: &Config) -> Self {
        Self {
            cache,
            limiter_max_attempts: config.limiter_max_attempts,
            limiter_ttl: config.limiter_window(),
            verify_ttl: config.verify_lifetime(),
            verify_code_length: config.verify_code_length,
        }
    }

    pub fn limiter(&self, name: &str) -> RateLimiter {
        RateLimiter::new(
            name,
            self.limiter_max_attempts,
            self.limiter_ttl,
            self.cache.clone(),
        )
    }

    pub fn verification(&self, name: &str) -> VerificationCode {
        VerificationCode::new(name, self.verify_ttl, self.cache.clone())
    }
}

fn check_key(key: &str) -> ApiResult<()> {
    match validate_key(key) {
        Some(error_msg) => Err(ApiError::InvalidRequest(error_msg)),
        None => Ok(()),
    }
}

/// Handler for PUT /cache/:key
///
/// Stores a value unconditionally, replacing any previous TTL.
pub async fn put_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PutRequest>,
) -> ApiResult<Json<WriteResponse>> {
    check_key(&key)?;

    state
        .cache
        .put(&key, req.value, req.ttl.map(Duration::from_secs))
        .await?;

    Ok(Json(WriteResponse::stored(key)))
}

/// Handler for PATCH /cache/:key
///
/// Updates the value keeping a live entry's TTL, or creates it with the given TTL.
pub async fn override_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<PutRequest>,
) -> ApiResult<Json<WriteResponse>> {
    check_key(&key)?;

    state
        .cache
        .override_value(&key, req.value, req.ttl.map(Duration::from_secs))
        .await?;

    Ok(Json(WriteResponse::stored(key)))
}

/// Handler for GET /cache/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<GetResponse>> {
    check_key(&key)?;

    let value = state
        .cache
        .get(&key)
        .await?
        .ok_or_else(|| ApiError::NotFound(key.clone()))?;
    let ttl = state.cache.ttl(&key).await?;

    Ok(Json(GetResponse::new(key, value, ttl)))
}

/// Handler for DELETE /cache/:key
///
/// Deleting a missing key succeeds.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<WriteResponse>> {
    check_key(&key)?;

    state.cache.forget(&key).await?;

    Ok(Json(WriteResponse::deleted(key)))
}

/// Handler for POST /cache/:key/increment
pub async fn increment_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<CounterRequest>,
) -> ApiResult<Json<CounterResponse>> {
    apply_counter(&state, key, req.delta, false).await
}

/// Handler for POST /cache/:key/decrement
pub async fn decrement_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<CounterRequest>,
) -> ApiResult<Json<CounterResponse>> {
    apply_counter(&state, key, req.delta, true).await
}

async fn apply_counter(
    state: &AppState,
    key: String,
    delta: Delta,
    subtract: bool,
) -> ApiResult<Json<CounterResponse>> {
    check_key(&key)?;

    let cache = &state.cache;
    let existed = match (delta, subtract) {
        (Delta::Int(d), false) => cache.increment(&key, d).await?,
        (Delta::Int(d), true) => cache.decrement(&key, d).await?,
        (Delta::Float(d), false) => cache.increment_float(&key, d).await?,
        (Delta::Float(d), true) => cache.decrement_float(&key, d).await?,
    };
    if !existed {
        return Err(ApiError::NotFound(key));
    }

    let value = cache.get(&key).await?;
    Ok(Json(CounterResponse { key, value }))
}

async fn limiter_status(name: &str, limiter: &RateLimiter) -> CacheResult<LimiterResponse> {
    Ok(LimiterResponse {
        name: name.to_string(),
        locked: limiter.must_lock().await?,
        retries_left: limiter.retries_left().await?,
        total_attempts: limiter.total_attempts().await?,
        max_attempts: limiter.max_attempts(),
        available_in_ms: ttl_millis(limiter.available_in().await?),
    })
}

/// Handler for GET /limiter/:name
pub async fn limiter_status_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<LimiterResponse>> {
    check_key(&name)?;

    let limiter = state.limiter(&name);
    Ok(Json(limiter_status(&name, &limiter).await?))
}

/// Handler for POST /limiter/:name/hit
///
/// Records an attempt. A subject that is already locked gets 429 and the
/// attempt is not counted.
pub async fn limiter_hit_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<(StatusCode, Json<LimiterResponse>)> {
    check_key(&name)?;

    let limiter = state.limiter(&name);
    if limiter.must_lock().await? {
        let status = limiter_status(&name, &limiter).await?;
        return Ok((StatusCode::TOO_MANY_REQUESTS, Json(status)));
    }

    limiter.hit().await?;
    let status = limiter_status(&name, &limiter).await?;
    Ok((StatusCode::OK, Json(status)))
}

/// Handler for POST /limiter/:name/lock
pub async fn limiter_lock_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<LimiterResponse>> {
    check_key(&name)?;

    let limiter = state.limiter(&name);
    limiter.lock().await?;
    Ok(Json(limiter_status(&name, &limiter).await?))
}

/// Handler for DELETE /limiter/:name
pub async fn limiter_clear_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<LimiterResponse>> {
    check_key(&name)?;

    let limiter = state.limiter(&name);
    limiter.clear().await?;
    Ok(Json(limiter_status(&name, &limiter).await?))
}

/// Handler for POST /verify/:name
///
/// Issues a fresh code for the subject, replacing any live one.
pub async fn verify_generate_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<CodeResponse>> {
    check_key(&name)?;

    let verification = state.verification(&name);
    let code = verification.generate(state.verify_code_length).await?;
    let ttl = verification.ttl().await?;

    Ok(Json(CodeResponse {
        name,
        code,
        ttl_ms: ttl_millis(ttl),
    }))
}

/// Handler for POST /verify/:name/check
pub async fn verify_check_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<CheckCodeRequest>,
) -> ApiResult<Json<CheckCodeResponse>> {
    check_key(&name)?;

    let valid = state.verification(&name).verify(&req.code).await?;
    Ok(Json(CheckCodeResponse { name, valid }))
}

/// Handler for DELETE /verify/:name
pub async fn verify_clear_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<WriteResponse>> {
    check_key(&name)?;

    state.verification(&name).clear().await?;
    Ok(Json(WriteResponse::deleted(name)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
