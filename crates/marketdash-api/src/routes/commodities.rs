//! 원자재 endpoint.
//!
//! GET /commodities - 원자재 시세 조회.
//!
//! 실패했거나 가격이 0 이하인 원자재는 응답에서 제외됩니다.
//! 전체 실패 시 빈 목록과 오류 메시지를 함께 반환합니다.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

use marketdash_core::types::QuoteRow;

use crate::state::AppState;

/// 원자재 조회 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommoditiesResponse {
    /// 원자재별 시세 행 (실패/0가격 제외, 카탈로그 순서)
    pub commodities: Vec<QuoteRow>,
    /// 수집 시각 (Unix timestamp)
    pub timestamp: i64,
}

/// 원자재 조회 오류 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommoditiesErrorResponse {
    /// 빈 원자재 목록
    pub commodities: Vec<QuoteRow>,
    /// 오류 메시지
    pub error: String,
    /// 오류 발생 시각 (Unix timestamp)
    pub timestamp: i64,
}

/// 원자재 시세 조회.
///
/// GET /commodities
pub async fn get_commodities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<CommoditiesResponse>, (StatusCode, Json<CommoditiesErrorResponse>)> {
    match state.commodities.get().await {
        Ok(result) => Ok(Json(CommoditiesResponse {
            commodities: result.rows,
            timestamp: result.fetched_at.timestamp(),
        })),
        Err(e) => {
            error!(error = %e, "원자재 데이터셋 조회 실패");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CommoditiesErrorResponse {
                    commodities: Vec::new(),
                    error: "Failed to fetch commodity quotes".to_string(),
                    timestamp: chrono::Utc::now().timestamp(),
                }),
            ))
        }
    }
}

/// 원자재 라우터 생성.
pub fn commodities_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(get_commodities))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::state::create_test_state;

    fn chart_body(price: f64, prev_close: f64) -> String {
        format!(
            r#"{{"chart":{{"result":[{{"meta":{{"regularMarketPrice":{},"chartPreviousClose":{}}}}}],"error":null}}}}"#,
            price, prev_close
        )
    }

    async fn request_commodities(base_url: &str) -> axum::response::Response {
        let state = create_test_state(base_url);
        let app = Router::new()
            .route("/commodities", get(get_commodities))
            .with_state(state);

        app.oneshot(
            Request::builder()
                .uri("/commodities")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_commodities_excludes_zero_priced_symbol() {
        let mut server = mockito::Server::new_async().await;

        // 천연가스만 가격 0, 나머지는 정상
        for id in ["GC=F", "SI=F", "CL=F", "BZ=F", "HG=F"] {
            server
                .mock("GET", format!("/v8/finance/chart/{}", id).as_str())
                .match_query(mockito::Matcher::Any)
                .with_status(200)
                .with_header("content-type", "application/json")
                .with_body(chart_body(100.0, 99.0))
                .create_async()
                .await;
        }
        server
            .mock("GET", "/v8/finance/chart/NG=F")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(chart_body(0.0, 2.5))
            .create_async()
            .await;

        let response = request_commodities(&server.url()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: CommoditiesResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(parsed.commodities.len(), 5);
        assert!(parsed.commodities.iter().all(|r| r.code != "NG"));
        assert!(parsed
            .commodities
            .iter()
            .all(|r| r.price > rust_decimal::Decimal::ZERO));
    }

    #[tokio::test]
    async fn test_commodities_total_failure_returns_500() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", mockito::Matcher::Regex("^/v8/finance/chart/".to_string()))
            .match_query(mockito::Matcher::Any)
            .with_status(500)
            .expect_at_least(6)
            .create_async()
            .await;

        let response = request_commodities(&server.url()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: CommoditiesErrorResponse = serde_json::from_slice(&body).unwrap();

        assert!(parsed.commodities.is_empty());
        assert!(!parsed.error.is_empty());
    }
}
