//! 핵심 타입 정의.
//!
//! 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - [`symbol`] - 심볼 및 데이터셋 키 정의
//! - [`quote`] - 시세 및 데이터셋 결과 타입

pub mod quote;
pub mod symbol;

pub use quote::{DatasetResult, Quote, QuoteFetchOutcome, QuoteRow};
pub use symbol::{DatasetKey, Symbol};
