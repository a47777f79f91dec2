//! RSI 점수.
//!
//! # 하위 점수
//!
//! 1. **수준**: 최근 RSI 변동성에 따라 과매도/과매수 기준(30/70 또는 25/75)을 조정
//! 2. **방향**: 최근 5개 변화량의 연속성과 평균
//! 3. **다이버전스**: 최근 20캔들 가격/RSI 다이버전스
//!
//! RSI가 20 미만 또는 80 초과인 극단 구간에서는 수준 가중치를 높입니다.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::divergence::divergence_score;
use super::{last_defined, weighted_sum, ScoringResult};
use crate::numeric::{aligned_tail, defined_tail, mean, statistical_volatility, to_options};

/// 수준 변동성 계산 구간.
const VOLATILITY_WINDOW: usize = 10;
/// 변동성 기준 (이보다 크면 완화된 기준 사용).
const VOLATILITY_THRESHOLD: f64 = 5.0;
/// 방향 계산에 쓰는 변화량 개수.
const DIRECTION_DELTAS: usize = 5;
/// 다이버전스 탐색 구간.
const DIVERGENCE_WINDOW: usize = 20;

/// 하위 점수 가중치.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiWeights {
    pub level: f64,
    pub direction: f64,
    pub divergence: f64,
}

impl RsiWeights {
    /// 현재 RSI에 따른 가중치.
    pub fn for_rsi(rsi: f64) -> Self {
        if !(20.0..=80.0).contains(&rsi) {
            Self {
                level: 0.6,
                direction: 0.25,
                divergence: 0.15,
            }
        } else {
            Self {
                level: 0.5,
                direction: 0.3,
                divergence: 0.2,
            }
        }
    }
}

/// RSI 점수 세부 내역.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiScoreBreakdown {
    pub level: f64,
    pub direction: f64,
    pub divergence: f64,
    pub weights: RsiWeights,
    pub score: f64,
}

/// RSI 점수 (0~100). 정의된 RSI가 없으면 `None`.
pub fn score(rsi: &[Option<f64>], prices: &[f64]) -> ScoringResult<Option<f64>> {
    Ok(analyze(rsi, prices)?.map(|b| b.score))
}

/// 하위 점수를 포함한 RSI 분석.
pub fn analyze(rsi: &[Option<f64>], prices: &[f64]) -> ScoringResult<Option<RsiScoreBreakdown>> {
    let Some(current) = last_defined(rsi) else {
        return Ok(None);
    };

    let level = level_score(current, &defined_tail(rsi, VOLATILITY_WINDOW));
    let direction = direction_score(&defined_tail(rsi, DIRECTION_DELTAS + 1));

    let (price_tail, rsi_tail) = aligned_tail(&to_options(prices), rsi, DIVERGENCE_WINDOW);
    let divergence = divergence_score(&price_tail, &rsi_tail)?;

    let weights = RsiWeights::for_rsi(current);
    let score = weighted_sum(&[
        (level, weights.level),
        (direction, weights.direction),
        (divergence, weights.divergence),
    ]);

    debug!(rsi = current, level, direction, divergence, score, "RSI 점수");

    Ok(Some(RsiScoreBreakdown {
        level,
        direction,
        divergence,
        weights,
        score,
    }))
}

/// 적응형 수준 점수.
///
/// 최근 RSI 표준편차가 5를 넘으면 과매도/과매수 기준을 25/75로 넓힙니다.
pub fn level_score(rsi: f64, recent: &[f64]) -> f64 {
    let (oversold, overbought) = if statistical_volatility(recent) > VOLATILITY_THRESHOLD {
        (25.0, 75.0)
    } else {
        (30.0, 70.0)
    };

    if rsi <= oversold {
        80.0 + (oversold - rsi) / oversold * 20.0
    } else if rsi >= overbought {
        20.0 - (rsi - overbought) / (100.0 - overbought) * 20.0
    } else {
        70.0 - (rsi - oversold) / (overbought - oversold) * 40.0
    }
}

/// 방향 점수.
///
/// 마지막 값까지 연속 상승(하락)이 3회 이상이고 평균 변화가 1을 넘으면 강한
/// 상승(하락), 그 외에는 평균 변화의 부호로 약한 방향을 판단합니다.
pub fn direction_score(recent: &[f64]) -> f64 {
    if recent.len() < 2 {
        return 50.0;
    }

    let deltas: Vec<f64> = recent.windows(2).map(|w| w[1] - w[0]).collect();
    let avg = mean(&deltas);
    let up_run = deltas.iter().rev().take_while(|&&d| d > 0.0).count();
    let down_run = deltas.iter().rev().take_while(|&&d| d < 0.0).count();

    if up_run >= 3 && avg > 1.0 {
        80.0 + avg.min(10.0) * 2.0
    } else if down_run >= 3 && avg < -1.0 {
        20.0 - avg.abs().min(10.0) * 2.0
    } else if avg > 0.0 {
        60.0 + avg.min(2.0) * 5.0
    } else if avg < 0.0 {
        40.0 - avg.abs().min(2.0) * 5.0
    } else {
        50.0
    }
}
