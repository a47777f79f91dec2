//! 가격과 지표 간 다이버전스 점수.
//!
//! 가격은 더 낮은 저점을 만들었는데 지표는 더 높은 저점을 만들면 상승
//! 다이버전스, 가격은 더 높은 고점인데 지표는 더 낮은 고점이면 하락
//! 다이버전스로 봅니다.

use scorer_core::clamp_score;
use tracing::debug;

use super::ScoringResult;
use crate::numeric::{find_local_extrema, ExtremaKind, ExtremaParams, ExtremaPoint, NumericError};

/// 다이버전스 탐지용 극값 파라미터.
const EXTREMA_PARAMS: ExtremaParams = ExtremaParams {
    threshold: 0.0,
    window: 2,
    min_duration: 3,
    reversed: false,
};

/// 변화율 강도 기준 (%).
const STRONG_CHANGE_PCT: f64 = 3.0;

/// 다이버전스 점수 (0~100, 없으면 50).
///
/// # 에러
///
/// 두 시계열의 길이가 다르면 `LengthMismatch`.
pub fn divergence_score(prices: &[f64], indicator: &[f64]) -> ScoringResult<f64> {
    if prices.len() != indicator.len() {
        return Err(NumericError::LengthMismatch {
            left: prices.len(),
            right: indicator.len(),
        }
        .into());
    }

    let bullish = divergence_offset(prices, indicator, ExtremaKind::Low);
    let bearish = divergence_offset(prices, indicator, ExtremaKind::High);

    if bullish > 0.0 || bearish > 0.0 {
        debug!(bullish, bearish, "다이버전스 감지");
    }

    Ok(clamp_score(50.0 + bullish - bearish))
}

/// 한 방향 다이버전스의 점수 편차 (0이면 없음).
fn divergence_offset(prices: &[f64], indicator: &[f64], kind: ExtremaKind) -> f64 {
    let price_points = find_local_extrema(prices, kind, EXTREMA_PARAMS);
    let indicator_points = find_local_extrema(indicator, kind, EXTREMA_PARAMS);

    let (Some((p1, p2)), Some((i1, i2))) = (last_two(&price_points), last_two(&indicator_points))
    else {
        return 0.0;
    };

    let diverges = match kind {
        ExtremaKind::Low => p2.value < p1.value && i2.value > i1.value,
        ExtremaKind::High => p2.value > p1.value && i2.value < i1.value,
    };
    if !diverges {
        return 0.0;
    }

    let price_change = change_pct(p1.value, p2.value);
    let indicator_change = change_pct(i1.value, i2.value);
    let base = match (
        price_change > STRONG_CHANGE_PCT,
        indicator_change > STRONG_CHANGE_PCT,
    ) {
        (true, true) => 40.0,
        (true, false) | (false, true) => 30.0,
        (false, false) => 15.0,
    };

    base * quality(&[p1, p2, i1, i2], p2)
}

fn last_two(points: &[ExtremaPoint]) -> Option<(ExtremaPoint, ExtremaPoint)> {
    match points {
        [.., first, second] => Some((*first, *second)),
        _ => None,
    }
}

fn change_pct(from: f64, to: f64) -> f64 {
    if from == 0.0 {
        0.0
    } else {
        (to - from).abs() / from.abs() * 100.0
    }
}

/// 극값 강도와 최신 극값의 지속 기간으로 본 신호 품질 (0.5~1.0).
fn quality(points: &[ExtremaPoint], newest: ExtremaPoint) -> f64 {
    let mean_strength = points.iter().map(|p| p.strength).sum::<f64>() / points.len() as f64;
    let duration_bonus = if newest.duration.unwrap_or(0) >= 5 {
        0.25
    } else {
        0.0
    };

    let quality = 0.5 + 0.25 * mean_strength + duration_bonus;
    if quality.is_nan() {
        0.5
    } else {
        quality.clamp(0.5, 1.0)
    }
}
