//! MACD 점수.
//!
//! # 하위 점수
//!
//! 1. **관계**: MACD/시그널 간격, 최근 교차, 0선 위치, 변동성 감쇠
//! 2. **히스토그램**: 현재 부호와 최근 변화 추세
//! 3. **다이버전스**: 가격/MACD 라인 다이버전스
//!
//! 간격과 추세는 최근 히스토그램 표준편차로 정규화해 가격 단위와 무관하게 비교합니다.

use scorer_core::clamp_score;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::divergence::divergence_score;
use super::{sign, unit, weighted_sum, ScoringResult};
use crate::indicators::MacdResult;
use crate::numeric::{
    aligned_tail, detect_cross, last_cross, mean, mean_absolute_change_volatility,
    statistical_volatility, to_options,
};

/// 정규화 기준 구간.
const SCALE_WINDOW: usize = 20;
/// 라인/시그널 교차 탐색 구간.
const SIGNAL_CROSS_LOOKBACK: usize = 10;
/// 0선 교차 탐색 구간.
const ZERO_CROSS_LOOKBACK: usize = 5;
/// 가중치 전환용 0선 교차 구간.
const RECENT_ZERO_CROSS: usize = 3;
/// 변동성 감쇠 구간.
const DAMPENER_WINDOW: usize = 10;
/// 히스토그램 추세에 쓰는 변화량 개수.
const HISTOGRAM_DELTAS: usize = 5;

/// 하위 점수 가중치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdWeights {
    pub relation: f64,
    pub histogram: f64,
    pub divergence: f64,
}

impl MacdWeights {
    /// 0선 교차 직후, 히스토그램이 큰 경우, 기본 순으로 선택합니다.
    pub fn select(recent_zero_cross: bool, histogram: f64) -> Self {
        if recent_zero_cross {
            Self {
                relation: 0.5,
                histogram: 0.3,
                divergence: 0.2,
            }
        } else if histogram.abs() > 0.5 {
            Self {
                relation: 0.35,
                histogram: 0.4,
                divergence: 0.25,
            }
        } else {
            Self {
                relation: 0.4,
                histogram: 0.3,
                divergence: 0.3,
            }
        }
    }
}

/// MACD 점수 세부 내역.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdScoreBreakdown {
    pub relation: f64,
    pub histogram: f64,
    pub divergence: f64,
    pub weights: MacdWeights,
    pub score: f64,
}

/// MACD 점수 (0~100). 라인, 시그널, 히스토그램이 모두 정의된 값이 없으면 `None`.
pub fn score(points: &[MacdResult], prices: &[f64]) -> ScoringResult<Option<f64>> {
    Ok(analyze(points, prices)?.map(|b| b.score))
}

/// 하위 점수를 포함한 MACD 분석.
pub fn analyze(points: &[MacdResult], prices: &[f64]) -> ScoringResult<Option<MacdScoreBreakdown>> {
    let defined: Vec<(f64, f64, f64)> = points.iter().filter_map(MacdResult::values).collect();
    let Some(&(_, _, current_hist)) = defined.last() else {
        return Ok(None);
    };

    let lines: Vec<f64> = defined.iter().map(|p| p.0).collect();
    let signals: Vec<f64> = defined.iter().map(|p| p.1).collect();
    let histograms: Vec<f64> = defined.iter().map(|p| p.2).collect();

    let scale = statistical_volatility(tail(&histograms, SCALE_WINDOW));

    let zero_crosses = zero_line_crosses(tail(&lines, ZERO_CROSS_LOOKBACK))?;
    let relation = relation_score(
        tail(&lines, SIGNAL_CROSS_LOOKBACK),
        tail(&signals, SIGNAL_CROSS_LOOKBACK),
        &zero_crosses,
        tail(&lines, DAMPENER_WINDOW),
        scale,
    )?;
    let histogram = histogram_score(tail(&histograms, HISTOGRAM_DELTAS + 1), scale);

    let line_series: Vec<Option<f64>> = points.iter().map(|p| p.macd).collect();
    let (price_tail, line_tail) =
        aligned_tail(&to_options(prices), &line_series, SCALE_WINDOW);
    let divergence = divergence_score(&price_tail, &line_tail)?;

    let recent_zero_cross = last_cross(&zero_crosses, RECENT_ZERO_CROSS).is_some();
    let weights = MacdWeights::select(recent_zero_cross, current_hist);
    let score = weighted_sum(&[
        (relation, weights.relation),
        (histogram, weights.histogram),
        (divergence, weights.divergence),
    ]);

    debug!(relation, histogram, divergence, scale, score, "MACD 점수");

    Ok(Some(MacdScoreBreakdown {
        relation,
        histogram,
        divergence,
        weights,
        score,
    }))
}

/// 라인/시그널 관계 점수.
///
/// `lines`와 `signals`는 같은 길이의 최근 구간이어야 합니다.
pub fn relation_score(
    lines: &[f64],
    signals: &[f64],
    zero_crosses: &[i8],
    dampener_lines: &[f64],
    scale: f64,
) -> ScoringResult<f64> {
    let (Some(&line), Some(&signal)) = (lines.last(), signals.last()) else {
        return Ok(50.0);
    };

    let mut score = if scale > 0.0 {
        50.0 + ((line - signal) / scale).clamp(-2.0, 2.0) * 15.0
    } else {
        50.0
    };

    let crosses = detect_cross(lines, signals)?;
    match last_cross(&crosses, SIGNAL_CROSS_LOOKBACK) {
        Some((1, days)) => {
            score = 75.0 + 25.0 * (1.0 - days as f64 / SIGNAL_CROSS_LOOKBACK as f64);
        }
        Some((_, days)) => {
            score = 25.0 - 25.0 * (1.0 - days as f64 / SIGNAL_CROSS_LOOKBACK as f64);
        }
        None => {}
    }

    score += match last_cross(zero_crosses, ZERO_CROSS_LOOKBACK) {
        Some((direction, _)) => 10.0 * f64::from(direction),
        None if line > 0.0 && signal > 0.0 => 5.0,
        None if line < 0.0 && signal < 0.0 => -5.0,
        None => 0.0,
    };

    // 라인이 요동치면 신호를 약하게 본다
    let mean_abs_line = mean(&dampener_lines.iter().map(|v| v.abs()).collect::<Vec<_>>());
    if mean_abs_line > 0.0
        && mean_absolute_change_volatility(dampener_lines) / mean_abs_line > 0.5
    {
        score = 50.0 + (score - 50.0) * 0.8;
    }

    Ok(clamp_score(score))
}

/// 히스토그램 점수.
///
/// 최근 변화량에 1..=n 가중치(최신이 가장 큼)를 준 추세와 현재 부호를 합산합니다.
pub fn histogram_score(recent: &[f64], scale: f64) -> f64 {
    let Some(&current) = recent.last() else {
        return 50.0;
    };

    let deltas: Vec<f64> = recent.windows(2).map(|w| w[1] - w[0]).collect();
    let weight_total: f64 = (1..=deltas.len()).map(|w| w as f64).sum();
    let trend = if weight_total > 0.0 {
        deltas
            .iter()
            .enumerate()
            .map(|(i, d)| d * (i + 1) as f64)
            .sum::<f64>()
            / weight_total
    } else {
        0.0
    };

    let trend_term = if scale > 0.0 {
        unit(trend / scale) * 25.0
    } else {
        0.0
    };

    clamp_score(50.0 + sign(current) * 15.0 + trend_term)
}

/// MACD 라인의 0선 교차.
fn zero_line_crosses(lines: &[f64]) -> ScoringResult<Vec<i8>> {
    let zeros = vec![0.0; lines.len()];
    Ok(detect_cross(lines, &zeros)?)
}

fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}
