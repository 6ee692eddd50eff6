//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! TOML 파일과 `MARKETDASH__` 접두사 환경 변수에서 로드할 수 있습니다.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 업스트림 수집 설정
    #[serde(default)]
    pub fetch: FetchConfig,
    /// 캐시 설정
    #[serde(default)]
    pub cache: CacheConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

/// 업스트림 수집 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    /// 심볼별 조회 타임아웃 (밀리초)
    pub per_fetch_timeout_ms: u64,
    /// 동시 조회 상한 (0이면 카탈로그 크기)
    pub max_concurrent_fetches: usize,
    /// 업스트림 제공자 base URL
    pub base_url: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            per_fetch_timeout_ms: 5000,
            max_concurrent_fetches: 0,
            base_url: "https://query1.finance.yahoo.com".to_string(),
        }
    }
}

impl FetchConfig {
    /// 심볼별 조회 타임아웃을 Duration으로 반환.
    pub fn per_fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.per_fetch_timeout_ms)
    }

    /// 카탈로그 크기를 고려한 실제 동시 조회 상한 계산.
    ///
    /// 설정값이 0이면 카탈로그 크기를 그대로 사용합니다.
    pub fn effective_concurrency(&self, catalog_len: usize) -> usize {
        if self.max_concurrent_fetches == 0 {
            catalog_len.max(1)
        } else {
            self.max_concurrent_fetches.min(catalog_len).max(1)
        }
    }
}

/// 캐시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// 지수 데이터셋 TTL (초)
    pub indices_ttl_secs: u64,
    /// 원자재 데이터셋 TTL (초)
    pub commodities_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            indices_ttl_secs: 60,
            commodities_ttl_secs: 60,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("MARKETDASH")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    ///
    /// `marketdash.toml`이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("marketdash.toml")
    }
}
