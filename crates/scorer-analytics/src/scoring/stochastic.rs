//! 스토캐스틱 점수.
//!
//! # 하위 점수
//!
//! 1. **수준**: %K/%D 평균의 6구간 점수 + 과매도/과매수 지속 보정
//! 2. **교차**: 최근 %K/%D 교차 (없으면 간격과 기울기로 본 의사 교차)
//! 3. **방향**: %K/%D 기울기와 가속도
//!
//! 수준/교차/방향 계산은 스토캐스틱 RSI 점수에서도 재사용합니다.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{unit, weighted_sum, ScoringResult};
use crate::indicators::StochasticResult;
use crate::numeric::{detect_cross, last_cross, slope};

/// 교차 탐색 구간.
const CROSS_LOOKBACK: usize = 10;
/// 지속 보정 최대 캔들 수.
const PERSISTENCE_CAP: usize = 5;

/// 교차 점수와 감지된 교차 정보.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossSignal {
    pub score: f64,
    /// +1 골든, -1 데드, 0 의사 교차
    pub direction: i8,
    /// 교차 이후 경과 캔들 수
    pub days: Option<usize>,
}

/// 하위 점수 가중치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticWeights {
    pub level: f64,
    pub cross: f64,
    pub direction: f64,
}

impl StochasticWeights {
    /// 극단 구간, 최근 교차, 기본 순으로 선택합니다.
    pub fn select(average: f64, cross: &CrossSignal) -> Self {
        if is_extreme(average) {
            Self {
                level: 0.6,
                cross: 0.2,
                direction: 0.2,
            }
        } else if cross.days.is_some_and(|days| days <= 2) {
            Self {
                level: 0.3,
                cross: 0.5,
                direction: 0.2,
            }
        } else {
            Self {
                level: 0.4,
                cross: 0.4,
                direction: 0.2,
            }
        }
    }
}

/// 스토캐스틱 점수 세부 내역.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StochasticScoreBreakdown {
    pub level: f64,
    pub cross: CrossSignal,
    pub direction: f64,
    pub weights: StochasticWeights,
    pub score: f64,
}

/// 스토캐스틱 점수 (0~100). %K와 %D가 모두 정의된 값이 없으면 `None`.
pub fn score(points: &[StochasticResult]) -> ScoringResult<Option<f64>> {
    Ok(analyze(points)?.map(|b| b.score))
}

/// 하위 점수를 포함한 스토캐스틱 분석.
pub fn analyze(points: &[StochasticResult]) -> ScoringResult<Option<StochasticScoreBreakdown>> {
    let (ks, ds) = defined_lines(points);
    let (Some(&k), Some(&d)) = (ks.last(), ds.last()) else {
        return Ok(None);
    };
    let average = (k + d) / 2.0;

    let level = level_with_persistence(&ks, &ds);
    let cross = cross_signal(&ks, &ds, CROSS_LOOKBACK)?;
    let direction = direction_score(&ks, &ds);

    let weights = StochasticWeights::select(average, &cross);
    let score = weighted_sum(&[
        (level, weights.level),
        (cross.score, weights.cross),
        (direction, weights.direction),
    ]);

    debug!(k, d, level, cross = cross.score, direction, score, "스토캐스틱 점수");

    Ok(Some(StochasticScoreBreakdown {
        level,
        cross,
        direction,
        weights,
        score,
    }))
}

/// %K와 %D가 모두 정의된 지점만 남깁니다.
pub(crate) fn defined_lines(points: &[StochasticResult]) -> (Vec<f64>, Vec<f64>) {
    points.iter().filter_map(StochasticResult::values).unzip()
}

/// 극단 구간 (평균 10 이하 또는 90 이상).
pub(crate) fn is_extreme(average: f64) -> bool {
    average <= 10.0 || average >= 90.0
}

/// %K/%D 평균의 6구간 수준 점수.
pub fn level_score(average: f64) -> f64 {
    let a = average;
    if a <= 10.0 {
        90.0 + (10.0 - a)
    } else if a <= 20.0 {
        75.0 + (20.0 - a) * 1.5
    } else if a <= 50.0 {
        50.0 + (50.0 - a) * 25.0 / 30.0
    } else if a <= 80.0 {
        25.0 + (80.0 - a) * 25.0 / 30.0
    } else if a <= 90.0 {
        10.0 + (90.0 - a) * 1.5
    } else {
        100.0 - a
    }
}

/// 수준 점수에 과매도/과매수 지속 보정을 더합니다.
pub fn level_with_persistence(ks: &[f64], ds: &[f64]) -> f64 {
    let averages: Vec<f64> = ks.iter().zip(ds).map(|(k, d)| (k + d) / 2.0).collect();
    let Some(&current) = averages.last() else {
        return 50.0;
    };

    let oversold = averages.iter().rev().take_while(|&&a| a <= 20.0).count();
    let overbought = averages.iter().rev().take_while(|&&a| a >= 80.0).count();

    let adjustment = if oversold > 0 {
        oversold.min(PERSISTENCE_CAP) as f64 * 2.0
    } else {
        -(overbought.min(PERSISTENCE_CAP) as f64 * 2.0)
    };

    scorer_core::clamp_score(level_score(current) + adjustment)
}

/// %K/%D 교차 점수.
///
/// `lookback` 구간 내 교차가 있으면 간격과 최근성으로, 없으면 현재 간격과
/// %K 기울기로 의사 교차 점수를 계산합니다.
pub fn cross_signal(ks: &[f64], ds: &[f64], lookback: usize) -> ScoringResult<CrossSignal> {
    let k_tail = &ks[ks.len().saturating_sub(lookback)..];
    let d_tail = &ds[ds.len().saturating_sub(lookback)..];
    let crosses = detect_cross(k_tail, d_tail)?;

    let (Some(&k), Some(&d)) = (k_tail.last(), d_tail.last()) else {
        return Ok(CrossSignal {
            score: 50.0,
            direction: 0,
            days: None,
        });
    };
    let average = (k + d) / 2.0;
    let gap = ((k - d).abs() / 10.0).min(1.0);

    let signal = match last_cross(&crosses, lookback) {
        Some((direction, days)) => {
            let recency = 1.0 - days as f64 / lookback as f64;
            let score = if direction > 0 {
                let bonus = if average < 30.0 { 10.0 } else { 0.0 };
                60.0 + gap * 20.0 + recency * 20.0 + bonus
            } else {
                let penalty = if average > 70.0 { 10.0 } else { 0.0 };
                40.0 - gap * 20.0 - recency * 20.0 - penalty
            };
            CrossSignal {
                score,
                direction,
                days: Some(days),
            }
        }
        None => {
            let k_slope = slope(&ks[ks.len().saturating_sub(5)..]);
            CrossSignal {
                score: 50.0 + unit((k - d) / 10.0) * 15.0 + unit(k_slope / 5.0) * 10.0,
                direction: 0,
                days: None,
            }
        }
    };

    Ok(CrossSignal {
        score: scorer_core::clamp_score(signal.score),
        ..signal
    })
}

/// 방향 점수 (5캔들 기울기와 5/8캔들 기울기 차이로 본 가속도).
pub fn direction_score(ks: &[f64], ds: &[f64]) -> f64 {
    let (k_slope, k_accel) = slope_and_accel(ks);
    let (d_slope, d_accel) = slope_and_accel(ds);

    let slope_term = unit((k_slope + d_slope) / 2.0 / 5.0) * 35.0;
    let accel_term = unit((k_accel + d_accel) / 2.0 / 5.0) * 15.0;

    scorer_core::clamp_score(50.0 + slope_term + accel_term)
}

/// 최근 5캔들 기울기와 가속도.
pub(crate) fn slope_and_accel(series: &[f64]) -> (f64, f64) {
    let slope5 = slope(&series[series.len().saturating_sub(5)..]);
    let slope8 = slope(&series[series.len().saturating_sub(8)..]);
    (slope5, slope5 - slope8)
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
    fn test_level_zones() {
        assert_eq!(level_score(0.0), 100.0);
        assert_eq!(level_score(10.0), 90.0);
        assert_eq!(level_score(20.0), 75.0);
        assert_eq!(level_score(50.0), 50.0);
        assert_eq!(level_score(80.0), 25.0);
        assert_eq!(level_score(90.0), 10.0);
        assert_eq!(level_score(100.0), 0.0);
    }

    #[test]
    fn test_persistence_adjustment() {
        let ks = [50.0, 15.0, 15.0, 15.0];
        let ds = [50.0, 15.0, 15.0, 15.0];
        // 75 + 7.5 + 3캔들 × 2
        assert_eq!(level_with_persistence(&ks, &ds), 88.5);

        let ks = [85.0; 8];
        // 17.5 - 5캔들 × 2
        assert_eq!(level_with_persistence(&ks, &ks), 7.5);
    }

    #[test]
    fn test_recent_golden_cross() {
        let ks = [20.0, 20.0, 20.0, 30.0];
        let ds = [25.0, 25.0, 25.0, 25.0];
        let cross = cross_signal(&ks, &ds, 10).unwrap();

        assert_eq!(cross.direction, 1);
        assert_eq!(cross.days, Some(0));
        // 60 + 0.5 × 20 + 20 + 10
        assert_eq!(cross.score, 100.0);
    }

    #[test]
    fn test_dead_cross_in_overbought() {
        let ks = [85.0, 85.0, 75.0, 74.0];
        let ds = [80.0, 80.0, 80.0, 79.0];
        let cross = cross_signal(&ks, &ds, 10).unwrap();

        assert_eq!(cross.direction, -1);
        assert_eq!(cross.days, Some(1));
        assert!(cross.score < 20.0);
    }

    #[test]
    fn test_pseudo_cross_without_cross() {
        let flat = [50.0; 10];
        let cross = cross_signal(&flat, &flat, 10).unwrap();
        assert_eq!(cross.score, 50.0);
        assert_eq!(cross.days, None);
    }

    #[test]
    fn test_cross_length_mismatch() {
        assert!(cross_signal(&[1.0, 2.0], &[1.0], 10).is_err());
    }

    #[test]
    fn test_direction_rising() {
        let rising: Vec<f64> = (0..10).map(|i| 20.0 + i as f64 * 6.0).collect();
        assert!(direction_score(&rising, &rising) > 80.0);
        assert_eq!(direction_score(&[50.0; 10], &[50.0; 10]), 50.0);
    }

    #[test]
    fn test_weights_prefer_level_at_extremes() {
        let stoch = points(&[(5.0, 5.0), (5.0, 5.0), (5.0, 5.0)]);
        let breakdown = analyze(&stoch).unwrap().unwrap();
        assert_eq!(breakdown.weights.level, 0.6);
        assert!(breakdown.score > 50.0);
    }

    #[test]
    fn test_unavailable_without_values() {
        let stoch = vec![StochasticResult {
            k: Some(50.0),
            d: None,
        }];
        assert_eq!(score(&stoch).unwrap(), None);
    }
}
