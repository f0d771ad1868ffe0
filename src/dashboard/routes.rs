//! Dashboard API route handlers.
//!
//! All endpoints return JSON. Every read and write goes through the
//! [`EngineHandle`]; nothing here computes balances or outcomes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::engine::runtime::EngineHandle;
use crate::types::{Candle, EngineSettings, LedgerSnapshot, Signal, SimError};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct DashboardState {
    pub engine: EngineHandle,
    pub started_at: DateTime<Utc>,
}

impl DashboardState {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            engine,
            started_at: Utc::now(),
        }
    }
}

pub type AppState = Arc<DashboardState>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AutoTradingRequest {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BetRequest {
    pub value: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PairRequest {
    pub pair: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Maps engine errors onto HTTP statuses.
#[derive(Debug)]
pub struct ApiError(pub SimError);

impl From<SimError> for ApiError {
    fn from(err: SimError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            SimError::InvalidBet { .. }
            | SimError::InvalidStake(_)
            | SimError::InsufficientBalance { .. } => StatusCode::BAD_REQUEST,
            SimError::UnknownPair(_) => StatusCode::NOT_FOUND,
            SimError::EngineStopped => StatusCode::SERVICE_UNAVAILABLE,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /health
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, StatusCode> {
    if !state.engine.is_running() {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(HealthResponse {
        status: "ok",
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    }))
}

/// GET /api/signals
pub async fn get_signals(State(state): State<AppState>) -> ApiResult<Vec<Signal>> {
    Ok(Json(state.engine.signals().await?))
}

/// GET /api/ledger
pub async fn get_ledger(State(state): State<AppState>) -> ApiResult<LedgerSnapshot> {
    Ok(Json(state.engine.ledger_snapshot().await?))
}

/// GET /api/settings
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<EngineSettings> {
    Ok(Json(state.engine.settings().await?))
}

/// GET /api/candles
pub async fn get_candles(State(state): State<AppState>) -> ApiResult<Vec<Candle>> {
    Ok(Json(state.engine.candles().await?))
}

/// POST /api/auto-trading
pub async fn set_auto_trading(
    State(state): State<AppState>,
    Json(req): Json<AutoTradingRequest>,
) -> ApiResult<EngineSettings> {
    Ok(Json(state.engine.set_auto_trading(req.enabled).await?))
}

/// POST /api/settings/min-bet
pub async fn set_min_bet(
    State(state): State<AppState>,
    Json(req): Json<BetRequest>,
) -> ApiResult<EngineSettings> {
    Ok(Json(state.engine.set_min_bet(req.value).await?))
}

/// POST /api/settings/max-bet
pub async fn set_max_bet(
    State(state): State<AppState>,
    Json(req): Json<BetRequest>,
) -> ApiResult<EngineSettings> {
    Ok(Json(state.engine.set_max_bet(req.value).await?))
}

/// POST /api/pair
pub async fn select_pair(
    State(state): State<AppState>,
    Json(req): Json<PairRequest>,
) -> ApiResult<EngineSettings> {
    Ok(Json(state.engine.select_pair(req.pair).await?))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::engine::random::StdRandom;
    use crate::engine::runtime::{EngineRuntime, Timing};
    use crate::engine::Engine;
    use rust_decimal_macros::dec;

    fn test_state() -> AppState {
        let engine = Engine::new(&AppConfig::default(), Box::new(StdRandom::seeded(8))).unwrap();
        let (handle, _task) = EngineRuntime::spawn(engine, Timing::default());
        Arc::new(DashboardState::new(handle))
    }

    #[test]
    fn test_api_error_statuses() {
        let resp = ApiError(SimError::UnknownPair("X".into())).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = ApiError(SimError::EngineStopped).into_response();
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        let resp = ApiError(SimError::InvalidStake(Decimal::ZERO)).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_bet_request_parses_number() {
        let req: BetRequest = serde_json::from_str(r#"{"value": 2.5}"#).unwrap();
        assert_eq!(req.value, dec!(2.5));
    }

    #[tokio::test]
    async fn test_get_ledger_handler() {
        let Json(snap) = get_ledger(State(test_state())).await.unwrap();
        assert_eq!(snap.balance, dec!(1000));
        assert!(snap.trades.is_empty());
        assert_eq!(snap.win_rate, 0.0);
    }

    #[tokio::test]
    async fn test_set_min_bet_handler() {
        let state = test_state();
        let Json(settings) = set_min_bet(State(state.clone()), Json(BetRequest { value: dec!(5) }))
            .await
            .unwrap();
        assert_eq!(settings.min_bet, dec!(5));

        let err = set_min_bet(State(state), Json(BetRequest { value: dec!(5.2) }))
            .await
            .unwrap_err();
        assert!(matches!(err.0, SimError::InvalidBet { .. }));
    }

    #[tokio::test]
    async fn test_health_handler() {
        let Json(resp) = health(State(test_state())).await.unwrap();
        assert_eq!(resp.status, "ok");
    }
}
