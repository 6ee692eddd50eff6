//! 헬스 체크 endpoint.
//!
//! 서버 상태 확인을 위한 헬스 체크 엔드포인트를 제공합니다.
//! 로드밸런서나 오케스트레이션 시스템(Kubernetes 등)에서 사용됩니다.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use marketdash_core::types::DatasetKey;

use crate::state::AppState;

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// 전체 서비스 상태
    pub status: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,

    /// 데이터셋별 캐시 상태
    pub datasets: DatasetHealth,
}

/// 데이터셋별 캐시 상태.
#[derive(Debug, Serialize, Deserialize)]
pub struct DatasetHealth {
    /// 지수 캐시 상태
    pub indices: CacheStatus,

    /// 원자재 캐시 상태
    pub commodities: CacheStatus,
}

/// 캐시 항목 상태.
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheStatus {
    /// 상태 ("cached" | "empty")
    pub status: String,

    /// 캐시된 행 수
    pub rows: usize,

    /// 마지막 수집 시각 (ISO 8601, 캐시가 있을 때만)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<String>,
}

impl CacheStatus {
    /// 캐시 항목이 있는 상태.
    fn cached(rows: usize, fetched_at: String) -> Self {
        Self {
            status: "cached".to_string(),
            rows,
            fetched_at: Some(fetched_at),
        }
    }

    /// 아직 수집된 적 없는 상태.
    fn empty() -> Self {
        Self {
            status: "empty".to_string(),
            rows: 0,
            fetched_at: None,
        }
    }
}

/// 간단한 헬스 체크 (liveness probe용).
///
/// 서버가 응답 가능한 상태인지만 확인합니다.
/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// 상세 헬스 체크 (readiness probe용).
///
/// 데이터셋별 캐시 상태를 함께 보고합니다.
/// GET /health/ready
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let indices = dataset_status(&state, DatasetKey::Indices).await;
    let commodities = dataset_status(&state, DatasetKey::Commodities).await;

    let response = HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        datasets: DatasetHealth {
            indices,
            commodities,
        },
    };

    (StatusCode::OK, Json(response))
}

/// 데이터셋 캐시 상태 조회.
async fn dataset_status(state: &AppState, key: DatasetKey) -> CacheStatus {
    match state.cache.get_stale(key).await {
        Some(result) => CacheStatus::cached(result.rows.len(), result.fetched_at.to_rfc3339()),
        None => CacheStatus::empty(),
    }
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
