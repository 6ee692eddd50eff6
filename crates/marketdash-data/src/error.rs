//! 데이터 모듈 오류 타입.

use thiserror::Error;

/// 단일 심볼 조회 실패 사유.
///
/// 업스트림 제공자와의 통신에서 발생할 수 있는 실패를 분류합니다.
#[derive(Debug, Error)]
pub enum FetchError {
    /// 조회 시간 초과
    #[error("Fetch timeout after {0}ms")]
    Timeout(u64),

    /// 업스트림 요청 제한 (HTTP 429)
    #[error("Rate limited by upstream provider")]
    RateLimited,

    /// 업스트림에 존재하지 않는 심볼 (HTTP 404)
    #[error("Symbol not found: {0}")]
    NotFound(String),

    /// 응답 형식 오류 (필수 필드 누락 등)
    #[error("Malformed response: {0}")]
    Malformed(String),

    /// 전송 계층 오류 (연결 실패 등)
    #[error("Transport error: {0}")]
    Transport(String),

    /// 업스트림 서버 오류 (HTTP 5xx)
    #[error("Provider error (status {0})")]
    Provider(u16),

    /// 분류되지 않은 오류
    #[error("Unknown fetch error: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest 자체 타임아웃은 실제 대기 시간을 알 수 없음
            FetchError::Timeout(0)
        } else if err.is_connect() {
            FetchError::Transport(err.to_string())
        } else if err.is_decode() {
            FetchError::Malformed(err.to_string())
        } else {
            FetchError::Unknown(err.to_string())
        }
    }
}

/// 데이터셋 수준 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 카탈로그의 모든 심볼 조회 실패
    #[error("All {0} symbols in catalog failed")]
    AllFailed(usize),

    /// 빈 카탈로그로 수집 요청
    #[error("Catalog is empty")]
    EmptyCatalog,

    /// 단일 심볼 조회 오류
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

pub type Result<T> = std::result::Result<T, DataError>;
