//! 데이터셋 캐시 저장소.
//!
//! 데이터셋 키별로 최근 수집 결과를 보관하며 다음을 제공합니다:
//!
//! - **TTL 신선도 판정**: 유효 기간 내 결과는 업스트림 호출 없이 반환
//! - **동시성 제어**: 같은 키에 대한 중복 갱신 방지, 뒤따른 요청은
//!   먼저 끝난 갱신 결과를 그대로 사용
//! - **실패 시 이전 데이터 유지**: 갱신 실패 시 만료된 결과라도 반환

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use marketdash_core::types::{DatasetKey, DatasetResult, QuoteRow};

use crate::error::Result;

/// 키별 갱신 상태를 추적하는 Lock 맵.
type RefreshLockMap = RwLock<HashMap<DatasetKey, Arc<RwLock<()>>>>;

/// 캐시된 데이터셋 항목.
#[derive(Debug, Clone)]
struct CacheEntry {
    rows: Vec<QuoteRow>,
    fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_fresh(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.fetched_at) < ttl
    }

    fn to_result(&self, cached: bool) -> DatasetResult {
        DatasetResult {
            rows: self.rows.clone(),
            cached,
            fetched_at: self.fetched_at,
        }
    }
}

/// 데이터셋 캐시 저장소.
pub struct QuoteCache {
    entries: RwLock<HashMap<DatasetKey, CacheEntry>>,
    refresh_locks: RefreshLockMap,
}

impl QuoteCache {
    /// 빈 캐시 생성.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            refresh_locks: RwLock::new(HashMap::new()),
        }
    }

    /// 캐시에서 조회하거나 필요 시 갱신합니다.
    ///
    /// 신선한 항목이 있으면 즉시 반환합니다. 없으면 갱신 Lock을 잡고
    /// `refresh`를 실행해 결과를 저장합니다. Lock을 기다리는 동안 다른
    /// 요청이 먼저 갱신을 끝냈다면 그 결과를 그대로 사용합니다.
    ///
    /// 갱신이 실패하면 오류를 전파하되 이전 결과는 그대로 남겨둡니다.
    /// 호출자는 [`get_stale`](Self::get_stale)로 마지막 결과에 접근해
    /// 대체 여부를 결정할 수 있습니다.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        key: DatasetKey,
        ttl: Duration,
        refresh: F,
    ) -> Result<DatasetResult>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<QuoteRow>>>,
    {
        // 1. 신선한 캐시가 있으면 바로 반환
        if let Some(result) = self.get_fresh(key, ttl).await {
            debug!(key = %key, "캐시 적중");
            return Ok(result);
        }

        // 2. 갱신 Lock 획득
        let lock = self.get_or_create_lock(key).await;
        let _guard = lock.write().await;

        // 3. Lock 대기 중 다른 요청이 갱신을 끝냈는지 재확인
        if let Some(result) = self.get_fresh(key, ttl).await {
            debug!(key = %key, "갱신 대기 중 캐시 채워짐");
            return Ok(result);
        }

        // 4. 갱신 실행
        match refresh().await {
            Ok(rows) => {
                let entry = CacheEntry {
                    rows,
                    fetched_at: Utc::now(),
                };
                let result = entry.to_result(false);
                self.entries.write().await.insert(key, entry);
                debug!(key = %key, rows = result.rows.len(), "캐시 갱신 완료");
                Ok(result)
            }
            Err(e) => {
                // 갱신 실패: 이전 항목은 건드리지 않고 오류 전파
                warn!(key = %key, error = %e, "캐시 갱신 실패");
                Err(e)
            }
        }
    }

    /// 신선한 캐시 항목 조회.
    async fn get_fresh(&self, key: DatasetKey, ttl: Duration) -> Option<DatasetResult> {
        let entries = self.entries.read().await;
        let entry = entries.get(&key)?;
        if entry.is_fresh(ttl, Utc::now()) {
            Some(entry.to_result(true))
        } else {
            None
        }
    }

    /// 만료 여부와 무관하게 캐시 항목 조회.
    pub async fn get_stale(&self, key: DatasetKey) -> Option<DatasetResult> {
        let entries = self.entries.read().await;
        entries.get(&key).map(|entry| entry.to_result(true))
    }

    /// 갱신 Lock 획득 또는 생성.
    async fn get_or_create_lock(&self, key: DatasetKey) -> Arc<RwLock<()>> {
        let locks = self.refresh_locks.read().await;
        if let Some(lock) = locks.get(&key) {
            return lock.clone();
        }
        drop(locks);

        let mut locks = self.refresh_locks.write().await;
        locks
            .entry(key)
            .or_insert_with(|| Arc::new(RwLock::new(())))
            .clone()
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DataError;
    use marketdash_core::types::Symbol;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn rows(code: &str) -> Vec<QuoteRow> {
        vec![QuoteRow::placeholder(&Symbol::new(code, code, code))]
    }

    #[tokio::test]
    async fn test_fresh_hit_skips_refresh() {
        let cache = QuoteCache::new();
        let ttl = Duration::seconds(60);

        let first = cache
            .get_or_refresh(DatasetKey::Indices, ttl, || async { Ok(rows("A")) })
            .await
            .unwrap();
        assert!(!first.cached);

        // 두 번째 호출은 갱신 없이 캐시 반환
        let second = cache
            .get_or_refresh(DatasetKey::Indices, ttl, || async {
                panic!("refresh must not run")
            })
            .await
            .unwrap();
        assert!(second.cached);
        assert_eq!(second.rows[0].code, "A");
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_refresh() {
        let cache = QuoteCache::new();

        cache
            .get_or_refresh(DatasetKey::Indices, Duration::seconds(60), || async {
                Ok(rows("OLD"))
            })
            .await
            .unwrap();

        // TTL 0이면 항상 만료
        let result = cache
            .get_or_refresh(DatasetKey::Indices, Duration::zero(), || async {
                Ok(rows("NEW"))
            })
            .await
            .unwrap();
        assert!(!result.cached);
        assert_eq!(result.rows[0].code, "NEW");
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_previous_entry() {
        let cache = QuoteCache::new();

        cache
            .get_or_refresh(DatasetKey::Commodities, Duration::seconds(60), || async {
                Ok(rows("OLD"))
            })
            .await
            .unwrap();

        let err = cache
            .get_or_refresh(DatasetKey::Commodities, Duration::zero(), || async {
                Err(DataError::AllFailed(6))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::AllFailed(6)));

        // 실패해도 이전 항목은 유지
        let stale = cache.get_stale(DatasetKey::Commodities).await.unwrap();
        assert_eq!(stale.rows[0].code, "OLD");
        assert!(stale.cached);
    }

    #[tokio::test]
    async fn test_refresh_failure_without_previous_entry() {
        let cache = QuoteCache::new();

        let err = cache
            .get_or_refresh(DatasetKey::Indices, Duration::seconds(60), || async {
                Err(DataError::AllFailed(6))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DataError::AllFailed(6)));

        // 실패한 갱신은 캐시를 오염시키지 않음
        assert!(cache.get_stale(DatasetKey::Indices).await.is_none());
    }

    #[tokio::test]
    async fn test_keys_are_isolated() {
        let cache = QuoteCache::new();
        let ttl = Duration::seconds(60);

        cache
            .get_or_refresh(DatasetKey::Indices, ttl, || async { Ok(rows("IDX")) })
            .await
            .unwrap();

        // 다른 키는 캐시 미적중
        let result = cache
            .get_or_refresh(DatasetKey::Commodities, ttl, || async { Ok(rows("CMD")) })
            .await
            .unwrap();
        assert!(!result.cached);
    }

    #[tokio::test]
    async fn test_concurrent_requests_refresh_once() {
        let cache = Arc::new(QuoteCache::new());
        let refresh_count = Arc::new(AtomicUsize::new(0));
        let ttl = Duration::seconds(60);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let count = refresh_count.clone();
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_refresh(DatasetKey::Indices, ttl, move || async move {
                        count.fetch_add(1, Ordering::SeqCst);
                        // 갱신 중 다른 요청이 대기하도록 지연
                        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
                        Ok(rows("A"))
                    })
                    .await
                    .unwrap()
            }));
        }

        let mut cached_count = 0;
        for handle in handles {
            let result = handle.await.unwrap();
            assert_eq!(result.rows[0].code, "A");
            if result.cached {
                cached_count += 1;
            }
        }

        // 갱신은 정확히 한 번, 나머지는 그 결과를 공유
        assert_eq!(refresh_count.load(Ordering::SeqCst), 1);
        assert_eq!(cached_count, 7);
    }
}
