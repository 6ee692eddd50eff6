//! # Marketdash Data
//!
//! 마켓 대시보드의 데이터 계층을 제공합니다:
//! - 업스트림 시세 조회 (제공자)
//! - 카탈로그 단위 동시 수집 (집계 엔진)
//! - TTL 기반 캐싱과 실패 시 이전 데이터 유지 (캐시 저장소)
//! - 지수/원자재 데이터셋 서비스

pub mod aggregate;
pub mod cache;
pub mod dataset;
pub mod error;
pub mod provider;

pub use aggregate::Aggregator;
pub use cache::QuoteCache;
pub use dataset::{DatasetService, FailurePolicy};
pub use error::{DataError, FetchError, Result};
pub use provider::{HttpQuoteProvider, QuoteProvider};
