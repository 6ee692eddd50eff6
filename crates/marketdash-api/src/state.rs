//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 모든 API 핸들러에서 공유되는 상태를 관리합니다.
//! Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.

use std::sync::Arc;

use marketdash_core::config::AppConfig;
use marketdash_data::{DatasetService, HttpQuoteProvider, QuoteCache, QuoteProvider};

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 지수 데이터셋 서비스
    pub indices: Arc<DatasetService>,

    /// 원자재 데이터셋 서비스
    pub commodities: Arc<DatasetService>,

    /// 두 데이터셋이 공유하는 캐시 저장소
    pub cache: Arc<QuoteCache>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 설정에서 새로운 AppState 생성.
    ///
    /// HTTP 제공자, 캐시 저장소, 데이터셋 서비스를 모두 연결합니다.
    pub fn from_config(config: &AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let provider: Arc<dyn QuoteProvider> = Arc::new(HttpQuoteProvider::new(
            config.fetch.base_url.clone(),
            config.fetch.per_fetch_timeout(),
        )?);
        let cache = Arc::new(QuoteCache::new());

        let indices = Arc::new(DatasetService::indices(
            provider.clone(),
            cache.clone(),
            config,
        )?);
        let commodities = Arc::new(DatasetService::commodities(
            provider,
            cache.clone(),
            config,
        )?);

        Ok(Self {
            indices,
            commodities,
            cache,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 업스트림 base URL만 바꿔 mock 서버를 바라보는 상태를 생성합니다.
#[cfg(test)]
pub fn create_test_state(base_url: &str) -> Arc<AppState> {
    let mut config = AppConfig::default();
    config.fetch.base_url = base_url.to_string();
    config.fetch.per_fetch_timeout_ms = 1000;

    Arc::new(AppState::from_config(&config).expect("failed to build test state"))
}
