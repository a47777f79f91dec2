//! MarketCondition - 시장 상황 분류.
//!
//! 장기 이동평균 기울기와 ATR 변동성으로 판정한 레짐과, 레짐별 지표 가중치를
//! 함께 보관합니다.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::indicator::WeightVector;

/// 시장 레짐.
///
/// # 상태 설명
///
/// - **StrongUptrend**: 장기 MA 기울기 > 0.15%/캔들
/// - **Uptrend**: 장기 MA 기울기 > 0.08%/캔들
/// - **StrongDowntrend**: 장기 MA 기울기 < -0.15%/캔들
/// - **Downtrend**: 장기 MA 기울기 < -0.08%/캔들
/// - **HighVolatilitySideways**: 횡보, ATR/가격 > 3%
/// - **LowVolatilitySideways**: 횡보, ATR/가격 <= 3%
/// - **InsufficientData**: 장기 MA 또는 ATR 없음
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketConditionLabel {
    StrongUptrend,
    Uptrend,
    StrongDowntrend,
    Downtrend,
    HighVolatilitySideways,
    LowVolatilitySideways,
    InsufficientData,
}

impl MarketConditionLabel {
    /// 레짐별 기본 가중치.
    ///
    /// 상승 추세는 추세 추종(MA, MACD)을, 하락 추세는 과매도 판단(RSI)을,
    /// 횡보장은 오실레이터와 밴드를 우대합니다.
    pub fn base_weights(self) -> WeightVector {
        match self {
            Self::StrongUptrend => WeightVector::new(0.35, 0.10, 0.25, 0.10, 0.05, 0.15),
            Self::Uptrend => WeightVector::new(0.30, 0.15, 0.20, 0.10, 0.10, 0.15),
            Self::StrongDowntrend => WeightVector::new(0.15, 0.30, 0.20, 0.10, 0.10, 0.15),
            Self::Downtrend => WeightVector::new(0.15, 0.25, 0.20, 0.15, 0.10, 0.15),
            Self::HighVolatilitySideways => WeightVector::new(0.10, 0.20, 0.10, 0.20, 0.15, 0.25),
            Self::LowVolatilitySideways => WeightVector::new(0.15, 0.20, 0.15, 0.20, 0.15, 0.15),
            Self::InsufficientData => WeightVector::new(0.20, 0.20, 0.20, 0.20, 0.10, 0.10),
        }
    }

    /// 추세 구간 여부
    pub fn is_trending(self) -> bool {
        matches!(
            self,
            Self::StrongUptrend | Self::Uptrend | Self::StrongDowntrend | Self::Downtrend
        )
    }

    /// 횡보 구간 여부
    pub fn is_sideways(self) -> bool {
        matches!(
            self,
            Self::HighVolatilitySideways | Self::LowVolatilitySideways
        )
    }

    /// 설명 문자열
    pub fn description(self) -> &'static str {
        match self {
            Self::StrongUptrend => "강한 상승 추세",
            Self::Uptrend => "상승 추세",
            Self::StrongDowntrend => "강한 하락 추세",
            Self::Downtrend => "하락 추세",
            Self::HighVolatilitySideways => "고변동성 횡보",
            Self::LowVolatilitySideways => "저변동성 횡보",
            Self::InsufficientData => "데이터 부족",
        }
    }
}

impl fmt::Display for MarketConditionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::StrongUptrend => "STRONG_UPTREND",
            Self::Uptrend => "UPTREND",
            Self::StrongDowntrend => "STRONG_DOWNTREND",
            Self::Downtrend => "DOWNTREND",
            Self::HighVolatilitySideways => "HIGH_VOLATILITY_SIDEWAYS",
            Self::LowVolatilitySideways => "LOW_VOLATILITY_SIDEWAYS",
            Self::InsufficientData => "INSUFFICIENT_DATA",
        };
        write!(f, "{}", s)
    }
}

/// 판정된 시장 상황과 사용 가능한 지표로 재정규화된 가중치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketCondition {
    pub label: MarketConditionLabel,
    pub weights: WeightVector,
}
