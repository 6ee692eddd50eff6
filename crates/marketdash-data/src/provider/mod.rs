//! 시세 제공자.
//!
//! 업스트림 API에서 단일 심볼 시세를 조회하는 컴포넌트를 제공합니다:
//! - [`QuoteProvider`] - 시세 제공자 트레잇
//! - [`http::HttpQuoteProvider`] - HTTP 기반 제공자

pub mod http;

use async_trait::async_trait;
use marketdash_core::types::{Quote, Symbol};

use crate::error::FetchError;

pub use http::HttpQuoteProvider;

/// 시세 제공자 트레잇.
///
/// 집계 엔진은 이 트레잇을 통해서만 업스트림에 접근합니다.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// 단일 심볼의 현재 시세를 조회합니다.
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote, FetchError>;
}
