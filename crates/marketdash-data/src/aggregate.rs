//! 시세 집계 엔진.
//!
//! 카탈로그의 모든 심볼을 동시에 조회하고 결과를 카탈로그 순서대로
//! 돌려줍니다.
//!
//! # 동작 방식
//!
//! - **순서 보장**: 동시 실행 순서와 무관하게 결과는 입력 순서 유지
//! - **동시성 제한**: 설정된 상한까지만 동시 조회
//! - **부분 실패 격리**: 한 심볼의 실패가 다른 심볼에 전파되지 않음
//! - **심볼별 타임아웃**: 느린 심볼은 타임아웃 실패로 기록

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use marketdash_core::types::{QuoteFetchOutcome, Symbol};

use crate::error::{DataError, FetchError, Result};
use crate::provider::QuoteProvider;

/// 시세 집계 엔진.
pub struct Aggregator {
    provider: Arc<dyn QuoteProvider>,
    /// 심볼별 조회 타임아웃
    per_fetch_timeout: Duration,
    /// 동시 조회 상한
    max_concurrent: usize,
}

impl Aggregator {
    /// 새로운 집계 엔진 생성.
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        per_fetch_timeout: Duration,
        max_concurrent: usize,
    ) -> Self {
        Self {
            provider,
            per_fetch_timeout,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// 카탈로그의 모든 심볼을 조회합니다.
    ///
    /// 결과는 입력 심볼과 같은 순서이며, 실패한 심볼은 해당 위치에
    /// `Failed`로 기록됩니다.
    ///
    /// # 오류
    ///
    /// - [`DataError::EmptyCatalog`] - 빈 심볼 목록
    /// - [`DataError::AllFailed`] - 모든 심볼 조회 실패
    pub async fn fetch_all(&self, symbols: &[Symbol]) -> Result<Vec<QuoteFetchOutcome>> {
        if symbols.is_empty() {
            return Err(DataError::EmptyCatalog);
        }

        debug!(
            count = symbols.len(),
            max_concurrent = self.max_concurrent,
            "시세 수집 시작"
        );

        let timeout = self.per_fetch_timeout;
        let outcomes: Vec<QuoteFetchOutcome> = stream::iter(symbols.iter().cloned())
            .map(|symbol| {
                let provider = self.provider.clone();
                async move { fetch_one(provider, symbol, timeout).await }
            })
            .buffered(self.max_concurrent)
            .collect()
            .await;

        let ok_count = outcomes.iter().filter(|o| o.is_ok()).count();
        if ok_count == 0 {
            warn!(count = outcomes.len(), "모든 심볼 조회 실패");
            return Err(DataError::AllFailed(outcomes.len()));
        }

        debug!(
            total = outcomes.len(),
            ok = ok_count,
            failed = outcomes.len() - ok_count,
            "시세 수집 완료"
        );

        Ok(outcomes)
    }
}

/// 단일 심볼 조회 (타임아웃 포함).
async fn fetch_one(
    provider: Arc<dyn QuoteProvider>,
    symbol: Symbol,
    timeout: Duration,
) -> QuoteFetchOutcome {
    match tokio::time::timeout(timeout, provider.fetch_quote(&symbol)).await {
        Ok(Ok(quote)) => QuoteFetchOutcome::Ok(quote),
        Ok(Err(e)) => {
            warn!(symbol = %symbol, error = %e, "심볼 조회 실패");
            QuoteFetchOutcome::Failed {
                symbol,
                reason: e.to_string(),
            }
        }
        Err(_) => {
            let e = FetchError::Timeout(timeout.as_millis() as u64);
            warn!(symbol = %symbol, error = %e, "심볼 조회 타임아웃");
            QuoteFetchOutcome::Failed {
                symbol,
                reason: e.to_string(),
            }
        }
    }
}
