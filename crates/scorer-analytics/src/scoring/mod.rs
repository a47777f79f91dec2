//! 지표별 점수 계산기.
//!
//! 여섯 지표를 각각 0~100 점수로 변환합니다. 50은 중립, 100에 가까울수록
//! 매수 압력, 0에 가까울수록 매도 압력입니다.
//!
//! 각 계산기는 2~5개의 하위 점수를 상황별 가중치로 합산하며, 입력에 정의된
//! 값이 없으면 `None`을 반환합니다. 에러는 교차 감지 입력 길이 불일치뿐입니다.
//!
//! # 지표
//!
//! - [`ma`]: 이동평균 배열, 교차, 가격 위치
//! - [`rsi`]: 적응형 과매수/과매도 수준, 방향, 다이버전스
//! - [`macd`]: 라인/시그널 관계, 히스토그램, 다이버전스
//! - [`stochastic`]: 수준, 교차, 방향
//! - [`stochastic_rsi`]: 수준, 교차, 방향, RSI 일관성, 반전 패턴
//! - [`bollinger`]: %B 위치, 밴드 폭, 추세, W/M 반전, 밴드 워킹

pub mod bollinger;
pub mod divergence;
pub mod ma;
pub mod macd;
pub mod rsi;
pub mod stochastic;
pub mod stochastic_rsi;

use scorer_core::clamp_score;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::indicators::IndicatorError;
use crate::numeric::NumericError;

/// 점수 계산 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    /// 수치 헬퍼 계약 위반
    #[error("수치 계산 실패: {0}")]
    Numeric(#[from] NumericError),

    /// 지표 계산 실패
    #[error("지표 계산 실패: {0}")]
    Indicator(#[from] IndicatorError),
}

/// 점수 계산 결과 타입.
pub type ScoringResult<T> = Result<T, ScoringError>;

/// 패턴 감지 결과.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PatternSignal {
    /// 감지 여부
    pub detected: bool,
    /// 강도 (0~1)
    pub strength: f64,
}

impl PatternSignal {
    /// 감지된 패턴. 강도는 [0, 1]로 제한됩니다.
    pub fn detected(strength: f64) -> Self {
        Self {
            detected: true,
            strength: if strength.is_nan() {
                0.0
            } else {
                strength.clamp(0.0, 1.0)
            },
        }
    }

    /// 감지되지 않음.
    pub fn none() -> Self {
        Self::default()
    }

    /// 감지 시 강도, 아니면 0.
    pub fn value(&self) -> f64 {
        if self.detected {
            self.strength
        } else {
            0.0
        }
    }
}

/// (점수, 가중치) 쌍의 가중 합을 [0, 100]으로 제한합니다.
pub(crate) fn weighted_sum(parts: &[(f64, f64)]) -> f64 {
    clamp_score(parts.iter().map(|(score, weight)| score * weight).sum())
}

/// [-1, 1]로 제한.
pub(crate) fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}

/// 부호 (+1, -1, 0).
pub(crate) fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// 50 기준 편차에 배수를 적용한 뒤 [0, 100]으로 제한.
pub(crate) fn scale_offset(score: f64, multiplier: f64) -> f64 {
    clamp_score(50.0 + (score - 50.0) * multiplier)
}

/// 시계열의 마지막 정의된 값.
pub(crate) fn last_defined(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().flatten().next().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weighted_sum_is_clamped() {
        assert_eq!(weighted_sum(&[(100.0, 0.6), (100.0, 0.6)]), 100.0);
        assert_eq!(weighted_sum(&[(40.0, 0.5), (60.0, 0.5)]), 50.0);
    }

    #[test]
    fn test_scale_offset() {
        assert!((scale_offset(70.0, 1.1) - 72.0).abs() < 1e-9);
        assert!((scale_offset(30.0, 0.8) - 34.0).abs() < 1e-9);
        assert_eq!(scale_offset(95.0, 1.5), 100.0);
    }

    #[test]
    fn test_pattern_signal_strength_bounds() {
        assert_eq!(PatternSignal::detected(3.0).strength, 1.0);
        assert_eq!(PatternSignal::none().value(), 0.0);
        assert_eq!(PatternSignal::detected(f64::NAN).strength, 0.0);
    }

    #[test]
    fn test_last_defined() {
        assert_eq!(last_defined(&[Some(1.0), Some(2.0), None]), Some(2.0));
        assert_eq!(last_defined(&[None, None]), None);
    }
}
