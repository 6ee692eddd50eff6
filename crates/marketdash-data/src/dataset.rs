//! 데이터셋 서비스.
//!
//! 카탈로그 단위의 시세 조회를 제공합니다. 캐시 저장소와 집계 엔진을
//! 묶어 다음 흐름으로 동작합니다:
//!
//! 1. 캐시가 신선하면 캐시 반환
//! 2. 아니면 집계 엔진으로 전체 카탈로그 수집
//! 3. 실패 정책에 따라 표시 행 구성
//! 4. 전체 실패 시 이전 캐시 데이터로 대체, 그것도 없으면 오류

use chrono::Duration;
use std::sync::Arc;
use tracing::warn;

use marketdash_core::config::{AppConfig, FetchConfig};
use marketdash_core::types::{DatasetKey, DatasetResult, QuoteFetchOutcome, QuoteRow, Symbol};

use crate::aggregate::Aggregator;
use crate::cache::QuoteCache;
use crate::error::{DataError, Result};
use crate::provider::QuoteProvider;

/// 조회 실패 심볼 처리 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// 실패한 심볼을 0값 자리표시 행으로 유지
    ZeroPlaceholder,
    /// 실패한 심볼을 결과에서 제외
    DropFailed,
}

/// 데이터셋 서비스.
pub struct DatasetService {
    key: DatasetKey,
    catalog: Vec<Symbol>,
    policy: FailurePolicy,
    aggregator: Aggregator,
    cache: Arc<QuoteCache>,
    ttl: Duration,
}

impl std::fmt::Debug for DatasetService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatasetService")
            .field("key", &self.key)
            .field("catalog", &self.catalog)
            .field("policy", &self.policy)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl DatasetService {
    /// 새로운 데이터셋 서비스 생성.
    ///
    /// # 오류
    ///
    /// 빈 카탈로그는 [`DataError::EmptyCatalog`]로 거부됩니다.
    pub fn new(
        key: DatasetKey,
        catalog: Vec<Symbol>,
        policy: FailurePolicy,
        provider: Arc<dyn QuoteProvider>,
        cache: Arc<QuoteCache>,
        fetch: &FetchConfig,
        ttl_secs: u64,
    ) -> Result<Self> {
        if catalog.is_empty() {
            return Err(DataError::EmptyCatalog);
        }

        let max_concurrent = fetch.effective_concurrency(catalog.len());
        let aggregator = Aggregator::new(provider, fetch.per_fetch_timeout(), max_concurrent);

        Ok(Self {
            key,
            catalog,
            policy,
            aggregator,
            cache,
            ttl: Duration::seconds(ttl_secs as i64),
        })
    }

    /// 주요 지수 데이터셋 서비스 생성.
    ///
    /// 실패한 지수는 0값 자리표시 행으로 유지됩니다.
    pub fn indices(
        provider: Arc<dyn QuoteProvider>,
        cache: Arc<QuoteCache>,
        config: &AppConfig,
    ) -> Result<Self> {
        Self::new(
            DatasetKey::Indices,
            indices_catalog(),
            FailurePolicy::ZeroPlaceholder,
            provider,
            cache,
            &config.fetch,
            config.cache.indices_ttl_secs,
        )
    }

    /// 원자재 데이터셋 서비스 생성.
    ///
    /// 실패한 원자재는 결과에서 제외됩니다.
    pub fn commodities(
        provider: Arc<dyn QuoteProvider>,
        cache: Arc<QuoteCache>,
        config: &AppConfig,
    ) -> Result<Self> {
        Self::new(
            DatasetKey::Commodities,
            commodities_catalog(),
            FailurePolicy::DropFailed,
            provider,
            cache,
            &config.fetch,
            config.cache.commodities_ttl_secs,
        )
    }

    /// 데이터셋 키 반환.
    pub fn key(&self) -> DatasetKey {
        self.key
    }

    /// 데이터셋 조회 (캐시 우선).
    ///
    /// 갱신이 실패해도 이전 수집 결과가 있으면 그것으로 응답합니다.
    pub async fn get(&self) -> Result<DatasetResult> {
        match self
            .cache
            .get_or_refresh(self.key, self.ttl, || self.refresh_rows())
            .await
        {
            Ok(result) => Ok(result),
            Err(e) => {
                if let Some(stale) = self.cache.get_stale(self.key).await {
                    warn!(key = %self.key, error = %e, "수집 실패, 이전 데이터로 응답");
                    Ok(stale)
                } else {
                    Err(e)
                }
            }
        }
    }

    /// 전체 카탈로그 수집 후 표시 행 구성.
    async fn refresh_rows(&self) -> Result<Vec<QuoteRow>> {
        let outcomes = self.aggregator.fetch_all(&self.catalog).await?;
        Ok(apply_policy(&outcomes, self.policy))
    }
}

/// 실패 정책에 따라 수집 결과를 표시 행으로 변환.
///
/// `DropFailed` 정책은 실패한 심볼뿐 아니라 가격이 0 이하인 행도
/// 제외합니다.
fn apply_policy(outcomes: &[QuoteFetchOutcome], policy: FailurePolicy) -> Vec<QuoteRow> {
    outcomes
        .iter()
        .filter_map(|outcome| match outcome {
            QuoteFetchOutcome::Ok(quote) => match policy {
                FailurePolicy::DropFailed if quote.price <= rust_decimal::Decimal::ZERO => None,
                _ => Some(QuoteRow::from_quote(quote)),
            },
            QuoteFetchOutcome::Failed { symbol, .. } => match policy {
                FailurePolicy::ZeroPlaceholder => Some(QuoteRow::placeholder(symbol)),
                FailurePolicy::DropFailed => None,
            },
        })
        .collect()
}

/// 주요 지수 카탈로그.
pub fn indices_catalog() -> Vec<Symbol> {
    vec![
        Symbol::new("^GSPC", "SPX", "S&P 500"),
        Symbol::new("^DJI", "DJI", "Dow Jones"),
        Symbol::new("^IXIC", "IXIC", "NASDAQ"),
        Symbol::new("^N225", "N225", "Nikkei 225"),
        Symbol::new("^FTSE", "FTSE", "FTSE 100"),
        Symbol::new("^KS11", "KOSPI", "KOSPI"),
    ]
}

/// 원자재 카탈로그.
pub fn commodities_catalog() -> Vec<Symbol> {
    vec![
        Symbol::new("GC=F", "GC", "Gold"),
        Symbol::new("SI=F", "SI", "Silver"),
        Symbol::new("CL=F", "CL", "Crude Oil WTI"),
        Symbol::new("BZ=F", "BZ", "Brent Crude"),
        Symbol::new("NG=F", "NG", "Natural Gas"),
        Symbol::new("HG=F", "HG", "Copper"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use async_trait::async_trait;
    use chrono::Utc;
    use marketdash_core::types::Quote;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// 지정한 심볼만 실패시키는 테스트 제공자.
    struct FlakyProvider {
        failing: HashSet<String>,
        zero_priced: HashSet<String>,
        fail_all: AtomicBool,
        calls: AtomicUsize,
    }

    impl FlakyProvider {
        fn new(failing: &[&str]) -> Self {
            Self {
                failing: failing.iter().map(|s| s.to_string()).collect(),
                zero_priced: HashSet::new(),
                fail_all: AtomicBool::new(false),
                calls: AtomicUsize::new(0),
            }
        }

        fn with_zero_price(mut self, ids: &[&str]) -> Self {
            self.zero_priced = ids.iter().map(|s| s.to_string()).collect();
            self
        }

        fn set_fail_all(&self, fail: bool) {
            self.fail_all.store(fail, Ordering::SeqCst);
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteProvider for FlakyProvider {
        async fn fetch_quote(
            &self,
            symbol: &Symbol,
        ) -> std::result::Result<Quote, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            if self.fail_all.load(Ordering::SeqCst)
                || self.failing.contains(&symbol.upstream_id)
            {
                return Err(FetchError::Provider(500));
            }

            let price = if self.zero_priced.contains(&symbol.upstream_id) {
                rust_decimal::Decimal::ZERO
            } else {
                dec!(100)
            };

            Ok(Quote {
                symbol: symbol.clone(),
                price,
                change: dec!(1),
                change_percent: dec!(1),
                fetched_at: Utc::now(),
            })
        }
    }

    fn config_with_ttl(ttl_secs: u64) -> AppConfig {
        let mut config = AppConfig::default();
        config.cache.indices_ttl_secs = ttl_secs;
        config.cache.commodities_ttl_secs = ttl_secs;
        config
    }

    fn indices_service(provider: Arc<FlakyProvider>, ttl_secs: u64) -> DatasetService {
        DatasetService::indices(
            provider,
            Arc::new(QuoteCache::new()),
            &config_with_ttl(ttl_secs),
        )
        .unwrap()
    }

    fn commodities_service(provider: Arc<FlakyProvider>, ttl_secs: u64) -> DatasetService {
        DatasetService::commodities(
            provider,
            Arc::new(QuoteCache::new()),
            &config_with_ttl(ttl_secs),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_indices_failed_symbol_becomes_placeholder() {
        let provider = Arc::new(FlakyProvider::new(&["^N225"]));
        let service = indices_service(provider, 60);

        let result = service.get().await.unwrap();

        // 전체 카탈로그 행 수 유지, 실패 지수는 0값 자리표시
        assert_eq!(result.rows.len(), 6);
        let n225 = &result.rows[3];
        assert_eq!(n225.code, "N225");
        assert!(!n225.ok);
        assert_eq!(n225.price, rust_decimal::Decimal::ZERO);
        assert!(result.rows[0].ok);
    }

    #[tokio::test]
    async fn test_commodities_failed_symbol_is_dropped() {
        let provider = Arc::new(FlakyProvider::new(&["NG=F"]));
        let service = commodities_service(provider, 60);

        let result = service.get().await.unwrap();

        // 실패한 천연가스는 제외, 나머지는 카탈로그 순서 유지
        assert_eq!(result.rows.len(), 5);
        let codes: Vec<_> = result.rows.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["GC", "SI", "CL", "BZ", "HG"]);
        assert!(result.rows.iter().all(|r| r.ok));
    }

    #[tokio::test]
    async fn test_commodities_zero_price_is_dropped() {
        let provider =
            Arc::new(FlakyProvider::new(&[]).with_zero_price(&["NG=F"]));
        let service = commodities_service(provider, 60);

        let result = service.get().await.unwrap();

        // 가격 0은 성공 응답이어도 제외
        assert_eq!(result.rows.len(), 5);
        assert!(result.rows.iter().all(|r| r.code != "NG"));
    }

    #[tokio::test]
    async fn test_cached_result_within_ttl() {
        let provider = Arc::new(FlakyProvider::new(&[]));
        let service = indices_service(provider.clone(), 60);

        let first = service.get().await.unwrap();
        assert!(!first.cached);
        assert_eq!(provider.call_count(), 6);

        let second = service.get().await.unwrap();
        assert!(second.cached);
        // TTL 이내 재조회는 업스트림 호출 없음
        assert_eq!(provider.call_count(), 6);
    }

    #[tokio::test]
    async fn test_all_failed_falls_back_to_previous_data() {
        let provider = Arc::new(FlakyProvider::new(&[]));
        // TTL 0으로 매 요청 갱신 강제
        let service = commodities_service(provider.clone(), 0);

        let first = service.get().await.unwrap();
        assert_eq!(first.rows.len(), 6);

        provider.set_fail_all(true);
        let second = service.get().await.unwrap();

        // 전체 실패지만 이전 수집 결과로 응답
        assert!(second.cached);
        assert_eq!(second.rows.len(), 6);
    }

    #[tokio::test]
    async fn test_all_failed_without_previous_data_is_error() {
        let provider = Arc::new(FlakyProvider::new(&[]));
        provider.set_fail_all(true);
        let service = indices_service(provider, 60);

        let err = service.get().await.unwrap_err();
        assert!(matches!(err, DataError::AllFailed(6)));
    }

    #[test]
    fn test_catalog_display_codes() {
        let codes: Vec<_> = indices_catalog().iter().map(|s| s.code.clone()).collect();
        assert_eq!(codes, vec!["SPX", "DJI", "IXIC", "N225", "FTSE", "KOSPI"]);

        let codes: Vec<_> = commodities_catalog()
            .iter()
            .map(|s| s.code.clone())
            .collect();
        assert_eq!(codes, vec!["GC", "SI", "CL", "BZ", "NG", "HG"]);
    }

    #[tokio::test]
    async fn test_empty_catalog_rejected_at_construction() {
        let provider: Arc<dyn QuoteProvider> = Arc::new(FlakyProvider::new(&[]));
        let err = DatasetService::new(
            DatasetKey::Indices,
            Vec::new(),
            FailurePolicy::ZeroPlaceholder,
            provider,
            Arc::new(QuoteCache::new()),
            &FetchConfig::default(),
            60,
        )
        .unwrap_err();
        assert!(matches!(err, DataError::EmptyCatalog));
    }
}
