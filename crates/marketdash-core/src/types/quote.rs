//! 시세 및 데이터셋 결과 타입.
//!
//! 업스트림에서 수집한 단일 시세(`Quote`), 심볼별 수집 결과
//! (`QuoteFetchOutcome`), 표시용 행(`QuoteRow`), 데이터셋 응답
//! (`DatasetResult`)을 정의합니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::symbol::Symbol;

/// 심볼 하나의 시세 스냅샷.
///
/// 성공한 단일 조회마다 새로 생성되며 이후 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// 조회 대상 심볼
    pub symbol: Symbol,
    /// 현재가
    pub price: Decimal,
    /// 전일 대비 변동 (절대값)
    pub change: Decimal,
    /// 전일 대비 변동률 (%)
    pub change_percent: Decimal,
    /// 조회 시각
    pub fetched_at: DateTime<Utc>,
}

/// 심볼별 수집 결과.
///
/// 집계 엔진은 요청한 심볼마다 정확히 하나의 결과를 생성하며,
/// 실패한 심볼도 위치를 유지한 채 `Failed`로 기록됩니다.
#[derive(Debug, Clone)]
pub enum QuoteFetchOutcome {
    /// 조회 성공
    Ok(Quote),
    /// 조회 실패 (사유 포함)
    Failed {
        /// 실패한 심볼
        symbol: Symbol,
        /// 실패 사유
        reason: String,
    },
}

impl QuoteFetchOutcome {
    /// 성공 여부 확인.
    pub fn is_ok(&self) -> bool {
        matches!(self, QuoteFetchOutcome::Ok(_))
    }

    /// 결과가 가리키는 심볼 반환.
    pub fn symbol(&self) -> &Symbol {
        match self {
            QuoteFetchOutcome::Ok(quote) => &quote.symbol,
            QuoteFetchOutcome::Failed { symbol, .. } => symbol,
        }
    }
}

/// 표시용 시세 행.
///
/// Dataset Service가 수집 결과를 변환한 최종 형태입니다.
/// 실패한 심볼은 정책에 따라 0값 자리표시 행이 되거나 제외됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRow {
    /// 짧은 코드 (예: "SPX")
    pub code: String,
    /// 표시 이름 (예: "S&P 500")
    pub name: String,
    /// 현재가
    pub price: Decimal,
    /// 전일 대비 변동
    pub change: Decimal,
    /// 전일 대비 변동률 (%)
    pub change_percent: Decimal,
    /// 조회 성공 여부 (자리표시 행은 false)
    pub ok: bool,
}

impl QuoteRow {
    /// 성공한 시세를 표시 행으로 변환.
    pub fn from_quote(quote: &Quote) -> Self {
        Self {
            code: quote.symbol.code.clone(),
            name: quote.symbol.name.clone(),
            price: quote.price,
            change: quote.change,
            change_percent: quote.change_percent,
            ok: true,
        }
    }

    /// 실패한 심볼의 0값 자리표시 행 생성.
    pub fn placeholder(symbol: &Symbol) -> Self {
        Self {
            code: symbol.code.clone(),
            name: symbol.name.clone(),
            price: Decimal::ZERO,
            change: Decimal::ZERO,
            change_percent: Decimal::ZERO,
            ok: false,
        }
    }
}

/// 데이터셋 조회 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetResult {
    /// 심볼별 표시 행 (카탈로그 순서 유지)
    pub rows: Vec<QuoteRow>,
    /// 캐시 제공 여부 (true면 이전 수집 결과)
    pub cached: bool,
    /// 행들이 수집된 시각
    pub fetched_at: DateTime<Utc>,
}
