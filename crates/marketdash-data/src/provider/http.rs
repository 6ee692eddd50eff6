//! HTTP 기반 시세 제공자.
//!
//! Yahoo Finance 차트 API 형식의 업스트림에서 단일 심볼 시세를 조회합니다.
//!
//! # 엔드포인트
//!
//! `GET {base_url}/v8/finance/chart/{symbol}?range=2d&interval=1d`
//!
//! 응답의 `chart.result[0].meta`에서 현재가와 전일 종가를 읽습니다.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use marketdash_core::types::{Quote, Symbol};

use crate::error::FetchError;
use crate::provider::QuoteProvider;

/// HTTP 기반 시세 제공자.
///
/// `base_url`을 바꿔 테스트 서버로 요청을 돌릴 수 있습니다.
pub struct HttpQuoteProvider {
    client: Client,
    base_url: String,
}

impl HttpQuoteProvider {
    /// 새로운 제공자 생성.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| FetchError::Transport(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// 변동률 계산 (%).
    fn calculate_change_percent(current: Decimal, previous: Decimal) -> Decimal {
        if previous.is_zero() {
            return Decimal::ZERO;
        }
        ((current - previous) / previous) * Decimal::from(100)
    }
}

#[async_trait]
impl QuoteProvider for HttpQuoteProvider {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, FetchError> {
        let url = format!(
            "{}/v8/finance/chart/{}?range=2d&interval=1d",
            self.base_url, symbol.upstream_id
        );

        debug!(symbol = %symbol, "시세 조회 요청");

        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => return Err(FetchError::RateLimited),
            StatusCode::NOT_FOUND => {
                return Err(FetchError::NotFound(symbol.upstream_id.clone()))
            }
            status if status.is_server_error() => {
                return Err(FetchError::Provider(status.as_u16()))
            }
            status if !status.is_success() => {
                return Err(FetchError::Unknown(format!(
                    "Unexpected status {} for {}",
                    status, symbol.upstream_id
                )))
            }
            _ => {}
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(format!("JSON 파싱 실패: {}", e)))?;

        let meta = body
            .chart
            .result
            .and_then(|mut results| {
                if results.is_empty() {
                    None
                } else {
                    Some(results.remove(0).meta)
                }
            })
            .ok_or_else(|| {
                FetchError::Malformed(format!("chart.result 없음: {}", symbol.upstream_id))
            })?;

        let price_f64 = meta.regular_market_price.ok_or_else(|| {
            FetchError::Malformed(format!("regularMarketPrice 없음: {}", symbol.upstream_id))
        })?;
        let prev_f64 = meta
            .chart_previous_close
            .or(meta.previous_close)
            .ok_or_else(|| {
                FetchError::Malformed(format!("previousClose 없음: {}", symbol.upstream_id))
            })?;

        let price = Decimal::from_f64(price_f64).ok_or_else(|| {
            FetchError::Malformed(format!("현재가 변환 실패: {}", price_f64))
        })?;
        let prev_close = Decimal::from_f64(prev_f64).ok_or_else(|| {
            FetchError::Malformed(format!("전일가 변환 실패: {}", prev_f64))
        })?;

        let change = price - prev_close;
        let change_percent = Self::calculate_change_percent(price, prev_close);

        debug!(symbol = %symbol, price = %price, change = %change, "시세 조회 완료");

        Ok(Quote {
            symbol: symbol.clone(),
            price,
            change,
            change_percent,
            fetched_at: Utc::now(),
        })
    }
}

// ==================== 응답 DTO ====================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
    previous_close: Option<f64>,
}
