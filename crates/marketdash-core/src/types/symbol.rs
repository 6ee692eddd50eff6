//! 심볼 및 데이터셋 키 정의.
//!
//! 이 모듈은 시세 조회 대상 관련 타입을 정의합니다:
//! - `Symbol` - 업스트림 식별자와 표시 정보를 가진 상품 심볼
//! - `DatasetKey` - 데이터셋(카탈로그) 구분 키

use serde::{Deserialize, Serialize};
use std::fmt;

/// 데이터셋 구분 키.
///
/// 캐시 저장소와 Dataset Service에서 카탈로그를 식별합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKey {
    /// 주요 지수 (S&P 500, 나스닥 등)
    Indices,
    /// 원자재 (금, 원유 등)
    Commodities,
}

impl DatasetKey {
    /// 캐시 키 문자열 반환.
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKey::Indices => "indices",
            DatasetKey::Commodities => "commodities",
        }
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// 시세 조회 대상 상품을 나타내는 심볼.
///
/// 업스트림 식별자와 사용자에게 보여줄 표시 정보로 구성됩니다.
/// 카탈로그 설정으로만 생성되며 런타임에 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    /// 업스트림 제공자 식별자 (예: "^GSPC", "GC=F")
    pub upstream_id: String,
    /// 짧은 코드 (예: "SPX", "GC")
    pub code: String,
    /// 표시 이름 (예: "S&P 500", "Gold")
    pub name: String,
}

impl Symbol {
    /// 새 심볼을 생성합니다.
    pub fn new(
        upstream_id: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            upstream_id: upstream_id.into(),
            code: code.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.code, self.upstream_id)
    }
}
