//! 볼린저 밴드 점수.
//!
//! # 하위 점수
//!
//! 1. **위치**: %B 구간 점수 (RSI 확인으로 강화/약화)
//! 2. **밴드 폭**: 스퀴즈/확장과 중간 밴드 추세
//! 3. **추세**: 중간/상단/하단 밴드와 가격의 기울기
//! 4. **반전**: W 바닥 / M 천장 패턴
//! 5. **패턴**: 밴드 워킹과 밴드 태그
//!
//! 폭이 0인 밴드(가격 변화 없음)에서는 터치와 패턴을 감지하지 않습니다.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{last_defined, scale_offset, sign, unit, weighted_sum, PatternSignal, ScoringResult};
use crate::indicators::BollingerBandsResult;
use crate::numeric::{mean, slope_pct};

/// 분석 구간.
const WINDOW: usize = 20;
/// 밴드 폭/추세 비교 구간.
const TREND_WINDOW: usize = 10;
/// 밴드 워킹 판정 구간.
const WALK_WINDOW: usize = 5;
/// 하단 밴드 터치 허용 배수.
const LOWER_TOUCH: f64 = 1.01;
/// 상단 밴드 터치 허용 배수.
const UPPER_TOUCH: f64 = 0.99;

/// 밴드 값과 같은 시점의 가격.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BandPoint {
    upper: f64,
    middle: f64,
    lower: f64,
    percent_b: f64,
    price: f64,
}

impl BandPoint {
    fn has_width(&self) -> bool {
        self.upper - self.lower > 0.0
    }

    fn touches_lower(&self) -> bool {
        self.has_width() && self.price <= self.lower * LOWER_TOUCH
    }

    fn touches_upper(&self) -> bool {
        self.has_width() && self.price >= self.upper * UPPER_TOUCH
    }

    fn bandwidth(&self) -> f64 {
        if self.middle != 0.0 {
            (self.upper - self.lower) / self.middle
        } else {
            0.0
        }
    }
}

/// 하위 점수 가중치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerWeights {
    pub position: f64,
    pub bandwidth: f64,
    pub trend: f64,
    pub reversal: f64,
    pub pattern: f64,
}

impl BollingerWeights {
    /// 밴드 폭 급변, 밴드 이탈, 강한 반전/패턴, 기본 순으로 선택합니다.
    pub fn select(bandwidth_ratio: f64, percent_b: f64, reversal: f64, pattern: f64) -> Self {
        if bandwidth_ratio < 0.6 || bandwidth_ratio > 1.6 {
            Self {
                position: 0.2,
                bandwidth: 0.35,
                trend: 0.2,
                reversal: 0.15,
                pattern: 0.1,
            }
        } else if !(0.0..=1.0).contains(&percent_b) {
            Self {
                position: 0.4,
                bandwidth: 0.1,
                trend: 0.2,
                reversal: 0.15,
                pattern: 0.15,
            }
        } else if (reversal - 50.0).abs() > 20.0 || (pattern - 50.0).abs() > 20.0 {
            Self {
                position: 0.2,
                bandwidth: 0.1,
                trend: 0.15,
                reversal: 0.4,
                pattern: 0.15,
            }
        } else {
            Self {
                position: 0.3,
                bandwidth: 0.15,
                trend: 0.2,
                reversal: 0.2,
                pattern: 0.15,
            }
        }
    }
}

/// 볼린저 밴드 점수 세부 내역.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerScoreBreakdown {
    pub position: f64,
    pub bandwidth: f64,
    pub bandwidth_ratio: f64,
    pub trend: f64,
    pub reversal: f64,
    pub w_bottom: PatternSignal,
    pub m_top: PatternSignal,
    pub pattern: f64,
    pub weights: BollingerWeights,
    pub score: f64,
}

/// 볼린저 밴드 점수 (0~100). 완전히 정의된 밴드가 없으면 `None`.
pub fn score(
    points: &[BollingerBandsResult],
    prices: &[f64],
    rsi: &[Option<f64>],
) -> ScoringResult<Option<f64>> {
    Ok(analyze(points, prices, rsi)?.map(|b| b.score))
}

/// 하위 점수를 포함한 볼린저 밴드 분석.
pub fn analyze(
    points: &[BollingerBandsResult],
    prices: &[f64],
    rsi: &[Option<f64>],
) -> ScoringResult<Option<BollingerScoreBreakdown>> {
    let window = band_window(points, prices);
    let Some(current) = window.last().copied() else {
        return Ok(None);
    };

    let position = position_score(current.percent_b, last_defined(rsi));
    let (bandwidth, bandwidth_ratio) = bandwidth_score(&window);
    let trend = trend_score(&window);

    let w_bottom = detect_w_bottom(&window);
    let m_top = detect_m_top(&window);
    let reversal = scorer_core::clamp_score(50.0 + 50.0 * w_bottom.value() - 50.0 * m_top.value());
    let pattern = pattern_score(&window);

    let weights = BollingerWeights::select(bandwidth_ratio, current.percent_b, reversal, pattern);
    let score = weighted_sum(&[
        (position, weights.position),
        (bandwidth, weights.bandwidth),
        (trend, weights.trend),
        (reversal, weights.reversal),
        (pattern, weights.pattern),
    ]);

    debug!(
        percent_b = current.percent_b,
        position, bandwidth, bandwidth_ratio, trend, reversal, pattern, score, "볼린저 밴드 점수"
    );

    Ok(Some(BollingerScoreBreakdown {
        position,
        bandwidth,
        bandwidth_ratio,
        trend,
        reversal,
        w_bottom,
        m_top,
        pattern,
        weights,
        score,
    }))
}

/// 마지막 캔들 기준으로 밴드와 가격을 맞춘 최근 구간.
fn band_window(points: &[BollingerBandsResult], prices: &[f64]) -> Vec<BandPoint> {
    let mut window: Vec<BandPoint> = points
        .iter()
        .rev()
        .zip(prices.iter().rev())
        .filter_map(|(p, &price)| {
            p.bands().map(|(upper, middle, lower, percent_b)| BandPoint {
                upper,
                middle,
                lower,
                percent_b,
                price,
            })
        })
        .take(WINDOW)
        .collect();
    window.reverse();
    window
}

/// %B 위치 점수.
///
/// 하단 근처(%B < 0.2)에서 RSI도 과매도면 강화, RSI가 50을 넘으면 약화합니다.
/// 상단 근처는 반대로 적용합니다.
pub fn position_score(percent_b: f64, rsi: Option<f64>) -> f64 {
    let b = percent_b;
    let base = if b <= 0.0 {
        85.0 + (b.abs() * 50.0).min(15.0)
    } else if b <= 0.2 {
        70.0 + (0.2 - b) / 0.2 * 15.0
    } else if b < 0.8 {
        70.0 - (b - 0.2) / 0.6 * 40.0
    } else if b < 1.0 {
        30.0 - (b - 0.8) / 0.2 * 15.0
    } else {
        15.0 - ((b - 1.0) * 50.0).min(15.0)
    };

    let multiplier = match rsi {
        Some(r) if (b < 0.2 && r < 30.0) || (b > 0.8 && r > 70.0) => 1.1,
        Some(r) if (b < 0.2 && r > 50.0) || (b > 0.8 && r < 50.0) => 0.8,
        _ => 1.0,
    };

    scale_offset(base, multiplier)
}

/// 밴드 폭 점수와 (현재 폭 / 직전 평균 폭) 비율.
fn bandwidth_score(window: &[BandPoint]) -> (f64, f64) {
    let widths: Vec<f64> = window.iter().map(BandPoint::bandwidth).collect();
    let Some((&current, previous)) = widths.split_last() else {
        return (50.0, 1.0);
    };

    let previous = &previous[previous.len().saturating_sub(TREND_WINDOW)..];
    let previous_mean = mean(previous);
    let ratio = if previous_mean > 0.0 {
        current / previous_mean
    } else {
        1.0
    };

    let middles: Vec<f64> = tail(window, TREND_WINDOW).iter().map(|p| p.middle).collect();
    let trend = slope_pct(&middles);

    (bandwidth_from_ratio(ratio, trend), ratio)
}

/// 밴드 폭 비율과 중간 밴드 추세(%/캔들)로 계산한 점수.
///
/// `trend`는 `slope_pct`(현재 값 대비 %) 단위이며 0.5 기준도 % 단위입니다.
/// 가격 단위 기울기를 쓰는 시장 상황 판정 기준과는 별개입니다.
///
/// 스퀴즈(비율 < 0.8)와 확장(비율 > 1.2)은 추세 방향으로 점수를 밀어냅니다.
pub fn bandwidth_from_ratio(ratio: f64, trend: f64) -> f64 {
    let score = if ratio < 0.8 {
        50.0 + sign(trend) * ((0.8 - ratio) / 0.4).min(1.0) * 20.0
    } else if ratio > 1.2 {
        50.0 + sign(trend) * ((ratio - 1.2) / 0.8).min(1.0) * 30.0
    } else {
        50.0 + unit(trend / 0.5) * 10.0
    };
    scorer_core::clamp_score(score)
}

/// 밴드와 가격의 기울기로 본 추세 점수.
fn trend_score(window: &[BandPoint]) -> f64 {
    let recent = tail(window, TREND_WINDOW);
    let series = |f: fn(&BandPoint) -> f64| -> f64 {
        slope_pct(&recent.iter().map(f).collect::<Vec<_>>())
    };

    trend_from_slopes([
        series(|p| p.middle),
        series(|p| p.upper),
        series(|p| p.lower),
        series(|p| p.price),
    ])
}

/// (중간, 상단, 하단, 가격) 기울기로 계산한 추세 점수.
///
/// 기울기는 모두 `slope_pct`(%/캔들) 단위이며 0.5 기준도 % 단위입니다.
pub fn trend_from_slopes(slopes: [f64; 4]) -> f64 {
    let middle = slopes[0];
    let score = if slopes.iter().all(|&s| s > 0.0) {
        75.0 + (middle / 0.5).min(1.0) * 25.0
    } else if slopes.iter().all(|&s| s < 0.0) {
        25.0 - (middle.abs() / 0.5).min(1.0) * 25.0
    } else {
        50.0 + unit(middle / 0.5) * 15.0
    };
    scorer_core::clamp_score(score)
}

/// W 바닥 감지.
///
/// 하단 밴드를 3캔들 이상 간격으로 두 번 터치하고, 사이 반등 높이가 2% 이상이며
/// 두 저점 차이가 5% 이내일 때 감지합니다. 현재가가 반등 고점을 넘지 못했으면
/// 강도를 0.7배로 낮춥니다.
fn detect_w_bottom(window: &[BandPoint]) -> PatternSignal {
    let touches: Vec<usize> = (0..window.len())
        .filter(|&i| window[i].touches_lower())
        .collect();
    let (Some(&first), Some(&last)) = (touches.first(), touches.last()) else {
        return PatternSignal::none();
    };
    if last < first + 3 {
        return PatternSignal::none();
    }

    let (p1, p2) = (window[first].price, window[last].price);
    let bottom = touches
        .iter()
        .map(|&i| window[i].price)
        .fold(f64::INFINITY, f64::min);
    let rebound = window[first + 1..last]
        .iter()
        .map(|p| p.price)
        .fold(f64::NEG_INFINITY, f64::max);

    if bottom <= 0.0 || p1 == 0.0 || !rebound.is_finite() {
        return PatternSignal::none();
    }

    let height = (rebound - bottom) / bottom;
    let asymmetry = (p1 - p2).abs() / p1.abs();
    if height < 0.02 || asymmetry > 0.05 {
        return PatternSignal::none();
    }

    let confirmation = match window.last() {
        Some(current) if current.price > rebound => 1.0,
        _ => 0.7,
    };
    PatternSignal::detected(
        (height / 0.1).min(1.0) * (1.0 - 0.5 * asymmetry / 0.05) * confirmation,
    )
}

/// M 천장 감지 (W 바닥의 대칭).
fn detect_m_top(window: &[BandPoint]) -> PatternSignal {
    let touches: Vec<usize> = (0..window.len())
        .filter(|&i| window[i].touches_upper())
        .collect();
    let (Some(&first), Some(&last)) = (touches.first(), touches.last()) else {
        return PatternSignal::none();
    };
    if last < first + 3 {
        return PatternSignal::none();
    }

    let (p1, p2) = (window[first].price, window[last].price);
    let peak = touches
        .iter()
        .map(|&i| window[i].price)
        .fold(f64::NEG_INFINITY, f64::max);
    let trough = window[first + 1..last]
        .iter()
        .map(|p| p.price)
        .fold(f64::INFINITY, f64::min);

    if peak <= 0.0 || p1 == 0.0 || !trough.is_finite() {
        return PatternSignal::none();
    }

    let height = (peak - trough) / peak;
    let asymmetry = (p1 - p2).abs() / p1.abs();
    if height < 0.02 || asymmetry > 0.05 {
        return PatternSignal::none();
    }

    let confirmation = match window.last() {
        Some(current) if current.price < trough => 1.0,
        _ => 0.7,
    };
    PatternSignal::detected(
        (height / 0.1).min(1.0) * (1.0 - 0.5 * asymmetry / 0.05) * confirmation,
    )
}

/// 밴드 워킹 / 밴드 태그 점수.
fn pattern_score(window: &[BandPoint]) -> f64 {
    let recent = tail(window, WALK_WINDOW);
    let upper_walk = walk_signal(recent.iter().filter(|p| p.touches_upper()).count());
    let lower_walk = walk_signal(recent.iter().filter(|p| p.touches_lower()).count());

    if upper_walk.detected {
        return 50.0 + 30.0 * upper_walk.strength;
    }
    if lower_walk.detected {
        return 50.0 - 30.0 * lower_walk.strength;
    }

    match recent.last() {
        Some(p) if p.touches_upper() => 35.0,
        Some(p) if p.touches_lower() => 65.0,
        _ => 50.0,
    }
}

/// 최근 5캔들 중 3캔들 이상 밴드에 붙어 있으면 밴드 워킹.
fn walk_signal(count: usize) -> PatternSignal {
    if count >= 3 {
        PatternSignal::detected(count as f64 / WALK_WINDOW as f64)
    } else {
        PatternSignal::none()
    }
}

fn tail(window: &[BandPoint], n: usize) -> &[BandPoint] {
    &window[window.len().saturating_sub(n)..]
}
