//! 이동평균 점수.
//!
//! # 하위 점수 (가중치)
//!
//! 1. **배열 (40%)**: 단기/중기/장기 이동평균의 정배열/역배열과 각 기울기
//! 2. **교차 (30%)**: 최근 20캔들 내 단기/중기 골든/데드 크로스와 경과 기간
//! 3. **가격 위치 (30%)**: 현재가가 이동평균들보다 위/아래에 있는 정도

use scorer_core::clamp_score;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{last_defined, weighted_sum, ScoringResult};
use crate::numeric::{aligned_tail, defined_tail, detect_cross, last_cross, slope};

/// 기울기 계산 구간.
const SLOPE_WINDOW: usize = 5;
/// 교차 탐색 구간.
const CROSS_LOOKBACK: usize = 20;
/// 횡보로 판단하는 기울기 절대값 (가격/캔들).
const SIDEWAYS_SLOPE: f64 = 0.1;

/// 이동평균 점수 세부 내역.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaScoreBreakdown {
    pub array: f64,
    pub cross: f64,
    pub relation: f64,
    pub score: f64,
}

/// 이동평균 점수 (0~100).
///
/// 세 이동평균 중 하나라도 정의된 값이 없거나 가격이 비어 있으면 `None`.
pub fn score(
    short: &[Option<f64>],
    mid: &[Option<f64>],
    long: &[Option<f64>],
    prices: &[f64],
) -> ScoringResult<Option<f64>> {
    Ok(analyze(short, mid, long, prices)?.map(|b| b.score))
}

/// 하위 점수를 포함한 이동평균 분석.
pub fn analyze(
    short: &[Option<f64>],
    mid: &[Option<f64>],
    long: &[Option<f64>],
    prices: &[f64],
) -> ScoringResult<Option<MaScoreBreakdown>> {
    let (Some(s), Some(m), Some(l), Some(&price)) = (
        last_defined(short),
        last_defined(mid),
        last_defined(long),
        prices.last(),
    ) else {
        return Ok(None);
    };

    let slopes = [
        slope(&defined_tail(short, SLOPE_WINDOW)),
        slope(&defined_tail(mid, SLOPE_WINDOW)),
        slope(&defined_tail(long, SLOPE_WINDOW)),
    ];

    let array = array_score([s, m, l], slopes);
    let cross = cross_score(short, mid)?;
    let relation = relation_score(price, [s, m, l]);
    let score = weighted_sum(&[(array, 0.4), (cross, 0.3), (relation, 0.3)]);

    debug!(array, cross, relation, score, "MA 점수");

    Ok(Some(MaScoreBreakdown {
        array,
        cross,
        relation,
        score,
    }))
}

/// 배열 점수.
///
/// `slopes`는 최근 5개 이동평균의 최소제곱 기울기(가격 단위)입니다.
/// 정배열(단기 > 중기 > 장기)은 상승 기울기 개수에 따라 100/85/70/60,
/// 역배열은 0/15/30/40, 혼조 또는 횡보는 `50 + (상승 - 하락) × 5`.
pub fn array_score(values: [f64; 3], slopes: [f64; 3]) -> f64 {
    let up = slopes.iter().filter(|&&s| s > 0.0).count();
    let down = slopes.iter().filter(|&&s| s < 0.0).count();
    let balance = 50.0 + (up as f64 - down as f64) * 5.0;

    if slopes.iter().all(|s| s.abs() < SIDEWAYS_SLOPE) {
        return balance;
    }

    let [short, mid, long] = values;
    if short > mid && mid > long {
        match up {
            3 => 100.0,
            2 => 85.0,
            1 => 70.0,
            _ => 60.0,
        }
    } else if short < mid && mid < long {
        match up {
            0 => 0.0,
            1 => 15.0,
            2 => 30.0,
            _ => 40.0,
        }
    } else {
        balance
    }
}

/// 단기/중기 교차 점수.
///
/// 골든 크로스는 최근일수록 100에, 데드 크로스는 최근일수록 0에 가깝습니다.
pub fn cross_score(short: &[Option<f64>], mid: &[Option<f64>]) -> ScoringResult<f64> {
    let (a, b) = aligned_tail(short, mid, CROSS_LOOKBACK);
    let crosses = detect_cross(&a, &b)?;
    let span = (CROSS_LOOKBACK - 1) as f64;

    Ok(match last_cross(&crosses, CROSS_LOOKBACK) {
        Some((1, days)) => 100.0 - 40.0 * days as f64 / span,
        Some((_, days)) => 40.0 * days as f64 / span,
        None => 50.0,
    })
}

/// 가격 위치 점수.
///
/// 이동평균 평균 대비 이격도(%)와 가격 아래에 있는 이동평균 개수로 구간을 나눕니다.
pub fn relation_score(price: f64, averages: [f64; 3]) -> f64 {
    let avg = averages.iter().sum::<f64>() / 3.0;
    if avg == 0.0 || !avg.is_finite() {
        return 50.0;
    }

    let deviation = (price - avg) / avg * 100.0;
    let above = averages.iter().filter(|&&ma| price > ma).count();

    let score = if above == 3 && deviation > 5.0 {
        80.0 + (deviation - 5.0).min(20.0)
    } else if above == 3 && deviation >= 0.5 {
        60.0 + deviation * 4.0
    } else if above == 0 && deviation < -5.0 {
        20.0 - (deviation.abs() - 5.0).min(20.0)
    } else if above == 0 && deviation <= -0.5 {
        40.0 + deviation * 4.0
    } else {
        50.0 + deviation.clamp(-5.0, 5.0) * 2.0
    };

    clamp_score(score)
}
