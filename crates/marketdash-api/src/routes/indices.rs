//! 주요 지수 endpoint.
//!
//! GET /indices - 주요 지수 시세 조회.
//!
//! 실패한 지수는 0값 자리표시 행으로 포함되며, 전체 실패 시에만
//! 500과 일반 오류 메시지를 반환합니다 (업스트림 내부 정보 미노출).

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use marketdash_core::types::QuoteRow;

use crate::state::AppState;

/// 지수 조회 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndicesResponse {
    /// 성공 여부
    pub success: bool,
    /// 지수별 시세 행 (카탈로그 순서)
    pub data: Vec<QuoteRow>,
    /// 캐시 제공 여부
    pub cached: bool,
    /// 수집 시각 (Unix timestamp)
    pub timestamp: i64,
}

/// 지수 조회 오류 응답.
///
/// `data` 키 없이 일반 메시지만 내려갑니다.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndicesErrorResponse {
    /// 성공 여부 (항상 false)
    pub success: bool,
    /// 오류 메시지
    pub error: String,
    /// 오류 발생 시각 (Unix timestamp)
    pub timestamp: i64,
}

/// 주요 지수 시세 조회.
///
/// GET /indices
pub async fn get_indices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<IndicesResponse>, (StatusCode, Json<IndicesErrorResponse>)> {
    match state.indices.get().await {
        Ok(result) => Ok(Json(IndicesResponse {
            success: true,
            data: result.rows,
            cached: result.cached,
            timestamp: result.fetched_at.timestamp(),
        })),
        Err(e) => {
            error!(error = %e, "지수 데이터셋 조회 실패");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(IndicesErrorResponse {
                    success: false,
                    error: "Failed to fetch index quotes".to_string(),
                    timestamp: chrono::Utc::now().timestamp(),
                }),
            ))
        }
    }
}

/// 지수 라우터 생성.
pub fn indices_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_indices))
}
