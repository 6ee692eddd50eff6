//! # Marketdash Core
//!
//! 마켓 대시보드의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 심볼 및 카탈로그 정의
//! - 시세(Quote) 및 데이터셋 결과 구조체
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod logging;
pub mod types;

pub use config::*;
pub use logging::*;
pub use types::*;
