//! 종합 분석 결과와 출력용 마켓 분석 레코드.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Asia::Seoul;
use serde::{Deserialize, Serialize};

use super::indicator::ScoreComponents;
use super::interpretation::Interpretation;
use super::market_condition::MarketCondition;

/// 엔진이 한 번의 호출로 산출하는 종합 결과.
///
/// 호출마다 새로 계산되며 수정되지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeResult {
    /// 지표별 점수
    pub individual_score: ScoreComponents,
    /// 시장 상황 가중치를 적용한 최종 점수 (0~100)
    pub final_score: f64,
    /// 사용 가능한 점수 합계 / 5
    pub avg_score: f64,
    /// 시장 상황
    pub market_condition: MarketCondition,
    /// 점수 해석
    pub interpretation: Interpretation,
}

/// API/캐시로 전달되는 마켓 분석 레코드.
///
/// 마켓 정보와 시각 필드는 호출자가 채우며 엔진은 계산하지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketAnalysis {
    pub market: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub korean_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_candle_date_time_utc: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_candle_date_time_kst: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: CompositeResult,
}

impl MarketAnalysis {
    /// 새 분석 레코드를 생성합니다. `created_at`은 현재 시각입니다.
    pub fn new(market: impl Into<String>, result: CompositeResult) -> Self {
        Self {
            market: market.into(),
            korean_name: None,
            english_name: None,
            last_candle_date_time_utc: None,
            last_candle_date_time_kst: None,
            created_at: Utc::now(),
            result,
        }
    }

    /// 마켓 한글/영문명을 설정합니다.
    pub fn with_names(
        mut self,
        korean_name: Option<String>,
        english_name: Option<String>,
    ) -> Self {
        self.korean_name = korean_name;
        self.english_name = english_name;
        self
    }

    /// 마지막 캔들 시각을 설정합니다.
    ///
    /// KST 시각이 없으면 UTC 시각을 Asia/Seoul로 변환해 채웁니다.
    pub fn with_last_candle(mut self, utc: NaiveDateTime, kst: Option<NaiveDateTime>) -> Self {
        let kst = kst.unwrap_or_else(|| Utc.from_utc_datetime(&utc).with_timezone(&Seoul).naive_local());
        self.last_candle_date_time_utc = Some(utc);
        self.last_candle_date_time_kst = Some(kst);
        self
    }
}
