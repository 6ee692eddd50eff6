//! # Marketdash API
//!
//! Axum 기반 REST API 서버 라이브러리.
//!
//! 주요 지수와 원자재 시세 엔드포인트, 헬스 체크, 공유 상태를
//! 제공합니다.

pub mod routes;
pub mod state;
