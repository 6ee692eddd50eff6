//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/indices` - 주요 지수 시세
//! - `/commodities` - 원자재 시세

pub mod commodities;
pub mod health;
pub mod indices;

pub use commodities::{commodities_router, CommoditiesErrorResponse, CommoditiesResponse};
pub use health::{health_router, CacheStatus, DatasetHealth, HealthResponse};
pub use indices::{indices_router, IndicesErrorResponse, IndicesResponse};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/indices", indices_router())
        .nest("/commodities", commodities_router())
}
