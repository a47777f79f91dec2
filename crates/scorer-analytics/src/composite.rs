//! 종합 점수 계산기.
//!
//! 여섯 지표 점수를 시장 상황별 가중치로 합산해 단일 점수(0~100)를 산출합니다.
//!
//! # 처리 순서
//!
//! 1. 지표별 점수 계산 (MA, RSI, MACD, 스토캐스틱, 스토캐스틱 RSI, 볼린저 밴드)
//! 2. 계산 가능한 지표 목록 추출
//! 3. 장기 이동평균 기울기와 ATR로 시장 상황 판정, 가중치 재정규화
//! 4. 가중 합산 → 최종 점수, 단순 합계 / 5 → 평균 점수
//! 5. 최종 점수 구간별 해석
//!
//! 계산기는 상태를 갖지 않으므로 같은 입력에는 항상 같은 결과를 반환합니다.

use scorer_core::{
    clamp_score, Candle, CompositeResult, IndicatorKind, IndicatorPeriods, Interpretation,
    MarketAnalysis, OhlcSeries, ScoreComponents, ScorerConfig,
};
use tracing::{debug, info};

use crate::indicators::{
    BollingerBandsResult, IndicatorEngine, IndicatorSet, MacdResult, StochasticResult,
};
use crate::market_condition::classify;
use crate::scoring::{bollinger, ma, macd, rsi, stochastic, stochastic_rsi, ScoringResult};

/// 평균 점수 분모.
///
/// 지표는 여섯 개지만 기존 응답과의 호환을 위해 5로 나눕니다.
pub const AVG_SCORE_DIVISOR: f64 = 5.0;

/// 종합 점수 입력.
///
/// 모든 시계열은 오래된 값부터 정렬되어 있어야 하며, 지표 시계열은 가격과
/// 같은 길이로 정렬되어 있다고 가정합니다 (길이가 달라도 마지막 캔들 기준으로 맞춤).
#[derive(Debug, Clone, Copy)]
pub struct AnalysisInput<'a> {
    pub prices: &'a [f64],
    pub short_ma: &'a [Option<f64>],
    pub mid_ma: &'a [Option<f64>],
    pub long_ma: &'a [Option<f64>],
    pub long_term_ma: &'a [Option<f64>],
    pub rsi: &'a [Option<f64>],
    pub macd: &'a [MacdResult],
    pub stochastic: &'a [StochasticResult],
    pub stochastic_rsi: &'a [StochasticResult],
    pub bollinger: &'a [BollingerBandsResult],
    pub atr: &'a [Option<f64>],
}

impl<'a> AnalysisInput<'a> {
    /// 계산된 지표 묶음으로 입력을 구성합니다.
    pub fn from_set(prices: &'a [f64], set: &'a IndicatorSet) -> Self {
        Self {
            prices,
            short_ma: &set.short_ma,
            mid_ma: &set.mid_ma,
            long_ma: &set.long_ma,
            long_term_ma: &set.long_term_ma,
            rsi: &set.rsi,
            macd: &set.macd,
            stochastic: &set.stochastic,
            stochastic_rsi: &set.stochastic_rsi,
            bollinger: &set.bollinger,
            atr: &set.atr,
        }
    }
}

/// 종합 점수 계산기.
#[derive(Debug, Default)]
pub struct CompositeScorer {
    /// 지표 계산 엔진
    indicator_engine: IndicatorEngine,

    /// 지표 기간
    periods: IndicatorPeriods,
}

impl CompositeScorer {
    /// 기본 기간과 소수점 4자리로 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 설정으로부터 생성.
    pub fn from_config(config: &ScorerConfig) -> Self {
        Self {
            indicator_engine: IndicatorEngine::with_precision(config.engine.precision),
            periods: config.indicators.clone(),
        }
    }

    /// 지표 기간.
    pub fn periods(&self) -> &IndicatorPeriods {
        &self.periods
    }

    /// 계산된 지표로 종합 점수를 산출합니다.
    ///
    /// # 에러
    ///
    /// 교차 감지 입력 길이 불일치 (내부 계약 위반)
    pub fn analyze(&self, input: &AnalysisInput<'_>) -> ScoringResult<CompositeResult> {
        let individual_score = ScoreComponents {
            ma: ma::score(input.short_ma, input.mid_ma, input.long_ma, input.prices)?,
            rsi: rsi::score(input.rsi, input.prices)?,
            macd: macd::score(input.macd, input.prices)?,
            stochastic: stochastic::score(input.stochastic)?,
            stochastic_rsi: stochastic_rsi::score(input.stochastic_rsi, input.rsi)?,
            bollinger_band: bollinger::score(input.bollinger, input.prices, input.rsi)?,
        };

        let available = individual_score.available();
        let market_condition = classify(input.long_term_ma, input.atr, &available);

        let final_score = final_score(&individual_score, &available, &market_condition.weights);
        let avg_score = avg_score(&individual_score, &available);
        let interpretation = Interpretation::from_score(final_score);

        debug!(
            available = available.len(),
            scores = ?individual_score,
            "지표별 점수"
        );
        info!(
            final_score,
            avg_score,
            condition = %market_condition.label,
            signal = %interpretation.kind,
            "종합 점수 계산 완료"
        );

        Ok(CompositeResult {
            individual_score,
            final_score,
            avg_score,
            market_condition,
            interpretation,
        })
    }

    /// OHLC 시계열에서 모든 지표를 계산한 뒤 종합 점수를 산출합니다.
    pub fn analyze_series(&self, series: &OhlcSeries) -> ScoringResult<CompositeResult> {
        let set = self.indicator_engine.compute_all(series, &self.periods)?;
        self.analyze(&AnalysisInput::from_set(series.close(), &set))
    }

    /// 캔들 목록으로 마켓 분석 레코드를 생성합니다.
    ///
    /// 캔들은 어떤 순서여도 되며 UTC 시각 기준으로 정렬해 사용합니다.
    pub fn analyze_candles(&self, market: &str, candles: &[Candle]) -> ScoringResult<MarketAnalysis> {
        let series = OhlcSeries::from_candles(candles);
        let result = self.analyze_series(&series)?;

        let mut analysis = MarketAnalysis::new(market, result);
        if let Some(last) = candles.iter().max_by_key(|c| c.candle_date_time_utc) {
            analysis = analysis.with_last_candle(last.candle_date_time_utc, last.candle_date_time_kst);
        }
        Ok(analysis)
    }
}

/// 사용 가능한 지표의 가중 합 (없으면 0).
fn final_score(
    scores: &ScoreComponents,
    available: &[IndicatorKind],
    weights: &scorer_core::WeightVector,
) -> f64 {
    if available.is_empty() {
        return 0.0;
    }

    let total: f64 = available
        .iter()
        .filter_map(|&kind| scores.get(kind).map(|score| score * weights.get(kind)))
        .sum();
    clamp_score(total)
}

/// 사용 가능한 점수 합계 / 5.
fn avg_score(scores: &ScoreComponents, available: &[IndicatorKind]) -> f64 {
    let total: f64 = available.iter().filter_map(|&kind| scores.get(kind)).sum();
    total / AVG_SCORE_DIVISOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use scorer_core::{MarketConditionLabel, SignalKind, WeightVector};

    #[test]
    fn test_empty_input_scores_zero() {
        let input = AnalysisInput {
            prices: &[],
            short_ma: &[],
            mid_ma: &[],
            long_ma: &[],
            long_term_ma: &[],
            rsi: &[],
            macd: &[],
            stochastic: &[],
            stochastic_rsi: &[],
            bollinger: &[],
            atr: &[],
        };

        let result = CompositeScorer::new().analyze(&input).unwrap();
        assert_eq!(result.final_score, 0.0);
        assert_eq!(result.avg_score, 0.0);
        assert_eq!(
            result.market_condition.label,
            MarketConditionLabel::InsufficientData
        );
        assert_eq!(result.interpretation.kind, SignalKind::StrongSell);
        assert_eq!(result.market_condition.weights, WeightVector::default());
    }

    #[test]
    fn test_avg_score_divides_by_five() {
        let scores = ScoreComponents {
            ma: Some(60.0),
            rsi: Some(40.0),
            macd: Some(50.0),
            ..Default::default()
        };
        let available = scores.available();
        assert_eq!(avg_score(&scores, &available), 30.0);
    }

    #[test]
    fn test_final_score_uses_renormalized_weights() {
        let scores = ScoreComponents {
            ma: Some(80.0),
            rsi: Some(40.0),
            ..Default::default()
        };
        let available = scores.available();
        let weights = WeightVector::new(0.3, 0.1, 0.2, 0.2, 0.1, 0.1).renormalized(&available);

        // 0.75 × 80 + 0.25 × 40
        assert!((final_score(&scores, &available, &weights) - 70.0).abs() < 1e-9);
    }
}
