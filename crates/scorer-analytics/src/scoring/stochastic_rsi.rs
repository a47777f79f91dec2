//! 스토캐스틱 RSI 점수.
//!
//! 스토캐스틱 점수의 수준/교차/방향에 RSI 추세 확인을 더하고, RSI와의 방향
//! 일관성과 과매도/과매수 이탈 반전 패턴을 추가로 평가합니다.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::stochastic::{
    cross_signal, defined_lines, direction_score, is_extreme, level_with_persistence,
    slope_and_accel, CrossSignal,
};
use super::{last_defined, scale_offset, sign, weighted_sum, PatternSignal, ScoringResult};
use crate::indicators::StochasticResult;
use crate::numeric::{defined_tail, slope};

/// 교차 탐색 구간.
const CROSS_LOOKBACK: usize = 5;
/// RSI 추세 계산 구간.
const RSI_TREND_WINDOW: usize = 5;
/// 반전 패턴에서 극단 구간을 찾는 직전 캔들 수.
const REVERSAL_LOOKBACK: usize = 3;

/// 하위 점수 가중치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticRsiWeights {
    pub level: f64,
    pub cross: f64,
    pub direction: f64,
    pub consistency: f64,
    pub pattern: f64,
}

impl StochasticRsiWeights {
    /// 반전 패턴, 극단 구간, 기본 순으로 선택합니다.
    pub fn select(reversal: bool, average: f64) -> Self {
        if reversal {
            Self {
                level: 0.15,
                cross: 0.3,
                direction: 0.3,
                consistency: 0.1,
                pattern: 0.15,
            }
        } else if is_extreme(average) {
            Self {
                level: 0.35,
                cross: 0.2,
                direction: 0.2,
                consistency: 0.15,
                pattern: 0.1,
            }
        } else {
            Self {
                level: 0.25,
                cross: 0.25,
                direction: 0.2,
                consistency: 0.15,
                pattern: 0.15,
            }
        }
    }
}

/// 과매도/과매수 이탈 반전 패턴.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReversalPattern {
    pub bullish: PatternSignal,
    pub bearish: PatternSignal,
}

impl ReversalPattern {
    pub fn detected(&self) -> bool {
        self.bullish.detected || self.bearish.detected
    }
}

/// 스토캐스틱 RSI 점수 세부 내역.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticRsiScoreBreakdown {
    pub level: f64,
    pub cross: CrossSignal,
    pub direction: f64,
    pub consistency: f64,
    pub pattern: f64,
    pub reversal: ReversalPattern,
    pub weights: StochasticRsiWeights,
    pub score: f64,
}

/// 스토캐스틱 RSI 점수 (0~100). %K와 %D가 모두 정의된 값이 없으면 `None`.
///
/// RSI가 없으면 확인 배수 없이 계산합니다.
pub fn score(points: &[StochasticResult], rsi: &[Option<f64>]) -> ScoringResult<Option<f64>> {
    Ok(analyze(points, rsi)?.map(|b| b.score))
}

/// 하위 점수를 포함한 스토캐스틱 RSI 분석.
pub fn analyze(
    points: &[StochasticResult],
    rsi: &[Option<f64>],
) -> ScoringResult<Option<StochasticRsiScoreBreakdown>> {
    let (ks, ds) = defined_lines(points);
    let (Some(&k), Some(&d)) = (ks.last(), ds.last()) else {
        return Ok(None);
    };
    let average = (k + d) / 2.0;

    let rsi_recent = defined_tail(rsi, RSI_TREND_WINDOW);
    let rsi_trend = slope(&rsi_recent);
    let rsi_change = match rsi_recent.as_slice() {
        [.., prev, last] => last - prev,
        _ => 0.0,
    };
    let current_rsi = last_defined(rsi);

    let level = level_with_persistence(&ks, &ds);

    let raw_cross = cross_signal(&ks, &ds, CROSS_LOOKBACK)?;
    let cross = CrossSignal {
        score: scale_offset(
            raw_cross.score,
            confirmation(raw_cross.score - 50.0, rsi_trend),
        ),
        ..raw_cross
    };

    let (k_slope, _) = slope_and_accel(&ks);
    let direction = scale_offset(direction_score(&ks, &ds), confirmation(k_slope, rsi_trend));

    let consistency = consistency_score(k_slope, rsi_trend, current_rsi);
    let reversal = detect_reversal(&ks, &ds, rsi_change);
    let pattern = pattern_score(&reversal, k, d);

    let weights = StochasticRsiWeights::select(reversal.detected(), average);
    let score = weighted_sum(&[
        (level, weights.level),
        (cross.score, weights.cross),
        (direction, weights.direction),
        (consistency, weights.consistency),
        (pattern, weights.pattern),
    ]);

    debug!(
        k,
        d,
        level,
        cross = cross.score,
        direction,
        consistency,
        pattern,
        score,
        "스토캐스틱 RSI 점수"
    );

    Ok(Some(StochasticRsiScoreBreakdown {
        level,
        cross,
        direction,
        consistency,
        pattern,
        reversal,
        weights,
        score,
    }))
}

/// RSI 추세 확인 배수 (같은 방향 ×1.1, 반대 방향 ×0.8, 판단 불가 ×1).
pub fn confirmation(direction: f64, rsi_trend: f64) -> f64 {
    let (a, b) = (sign(direction), sign(rsi_trend));
    if a == 0.0 || b == 0.0 {
        1.0
    } else if a == b {
        1.1
    } else {
        0.8
    }
}

/// RSI와의 방향 일관성 점수.
pub fn consistency_score(k_slope: f64, rsi_trend: f64, rsi: Option<f64>) -> f64 {
    let agreement = if k_slope > 0.0 && rsi_trend > 0.0 {
        1.0
    } else if k_slope < 0.0 && rsi_trend < 0.0 {
        -1.0
    } else {
        0.0
    };

    let tilt = match rsi {
        Some(value) if value < 30.0 => 10.0,
        Some(value) if value > 70.0 => -10.0,
        _ => 0.0,
    };

    scorer_core::clamp_score(50.0 + agreement * (rsi_trend.abs() / 2.0).min(1.0) * 30.0 + tilt)
}

/// 과매도/과매수 이탈 반전 패턴 감지.
///
/// 직전 3캔들 중 %K/%D 평균이 20 이하였다가 현재 %K가 20을 넘고 %D 위에 있으며
/// RSI가 상승하면 상승 반전, 반대 조건이면 하락 반전입니다.
pub fn detect_reversal(ks: &[f64], ds: &[f64], rsi_change: f64) -> ReversalPattern {
    let (Some(&k), Some(&d)) = (ks.last(), ds.last()) else {
        return ReversalPattern::default();
    };

    let end = ks.len().min(ds.len()).saturating_sub(1);
    let start = end.saturating_sub(REVERSAL_LOOKBACK);
    let prior: Vec<f64> = (start..end).map(|i| (ks[i] + ds[i]) / 2.0).collect();

    let strength = ((k - d).abs() / 20.0 + rsi_change.abs() / 5.0).min(1.0);

    let bullish = prior.iter().any(|&a| a <= 20.0) && k > 20.0 && k > d && rsi_change > 0.0;
    let bearish = prior.iter().any(|&a| a >= 80.0) && k < 80.0 && k < d && rsi_change < 0.0;

    ReversalPattern {
        bullish: if bullish {
            PatternSignal::detected(strength)
        } else {
            PatternSignal::none()
        },
        bearish: if bearish {
            PatternSignal::detected(strength)
        } else {
            PatternSignal::none()
        },
    }
}

/// 반전 패턴 점수. 패턴이 없으면 %K/%D 간격으로 약하게 기울입니다.
pub fn pattern_score(reversal: &ReversalPattern, k: f64, d: f64) -> f64 {
    if reversal.bullish.detected {
        75.0 + 25.0 * reversal.bullish.strength
    } else if reversal.bearish.detected {
        25.0 - 25.0 * reversal.bearish.strength
    } else {
        50.0 + (k - d).clamp(-20.0, 20.0) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(values: &[(f64, f64)]) -> Vec<StochasticResult> {
        values
            .iter()
            .map(|&(k, d)| StochasticResult {
                k: Some(k),
                d: Some(d),
            })
            .collect()
    }

    #[test]
    fn test_confirmation_multiplier() {
        assert_eq!(confirmation(1.0, 0.5), 1.1);
        assert_eq!(confirmation(-1.0, 0.5), 0.8);
        assert_eq!(confirmation(1.0, 0.0), 1.0);
    }

    #[test]
    fn test_consistency_score() {
        // 함께 상승, RSI 추세 2 이상이면 +30
        assert_eq!(consistency_score(3.0, 2.0, Some(50.0)), 80.0);
        assert_eq!(consistency_score(-3.0, -1.0, Some(75.0)), 25.0);
        assert_eq!(consistency_score(3.0, -1.0, Some(25.0)), 60.0);
        assert_eq!(consistency_score(0.0, 0.0, None), 50.0);
    }

    #[test]
    fn test_bullish_reversal_from_oversold() {
        let ks = [10.0, 8.0, 15.0, 35.0];
        let ds = [12.0, 10.0, 11.0, 20.0];
        let reversal = detect_reversal(&ks, &ds, 4.0);

        assert!(reversal.bullish.detected);
        assert!(!reversal.bearish.detected);
        assert_eq!(reversal.bullish.strength, 1.0);
        assert_eq!(pattern_score(&reversal, 35.0, 20.0), 100.0);
    }

    #[test]
    fn test_bearish_reversal_requires_falling_rsi() {
        let ks = [90.0, 92.0, 85.0, 70.0];
        let ds = [88.0, 90.0, 88.0, 80.0];

        assert!(detect_reversal(&ks, &ds, -2.0).bearish.detected);
        assert!(!detect_reversal(&ks, &ds, 1.0).bearish.detected);
    }

    #[test]
    fn test_pattern_without_reversal() {
        let none = ReversalPattern::default();
        assert_eq!(pattern_score(&none, 60.0, 50.0), 55.0);
        assert_eq!(pattern_score(&none, 0.0, 100.0), 40.0);
    }

    #[test]
    fn test_reversal_weights() {
        let stoch = points(&[(10.0, 12.0), (8.0, 10.0), (15.0, 11.0), (35.0, 20.0)]);
        let rsi = vec![Some(28.0), Some(27.0), Some(29.0), Some(33.0)];

        let breakdown = analyze(&stoch, &rsi).unwrap().unwrap();
        assert!(breakdown.reversal.detected());
        assert_eq!(breakdown.weights.cross, 0.3);
        assert!(breakdown.score > 50.0);
    }

    #[test]
    fn test_flat_is_neutral() {
        let stoch = points(&[(50.0, 50.0); 20]);
        let rsi = vec![Some(50.0); 20];
        assert_eq!(score(&stoch, &rsi).unwrap(), Some(50.0));
    }

    #[test]
    fn test_unavailable_without_points() {
        assert_eq!(score(&[], &[Some(50.0)]).unwrap(), None);
    }
}
