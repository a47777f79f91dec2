//! 종합 점수 엔진 시나리오 테스트.
//!
//! 캔들 → 지표 → 지표별 점수 → 시장 상황 → 종합 점수 전체 흐름을 검증합니다.

use proptest::prelude::*;
use scorer_analytics::{AnalysisInput, CompositeScorer, IndicatorEngine, AVG_SCORE_DIVISOR};
use scorer_core::{IndicatorPeriods, MarketConditionLabel, OhlcSeries, ScorerConfig};

/// 짧은 기간 설정 (50캔들로 모든 지표가 정의되도록).
///
/// 기본 설정의 장기(60)/초장기(120) 이동평균은 120캔들 이상이 필요합니다.
fn short_period_scorer() -> CompositeScorer {
    let mut config = ScorerConfig::default();
    config.indicators = IndicatorPeriods {
        short_ma: 5,
        mid_ma: 10,
        long_ma: 20,
        long_term_ma: 40,
        ..IndicatorPeriods::default()
    };
    CompositeScorer::from_config(&config)
}

fn geometric(start: f64, pct: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| start * (1.0 + pct / 100.0).powi(i as i32))
        .collect()
}

fn assert_near(actual: Option<f64>, expected: f64) {
    let value = actual.expect("점수가 정의되어야 함");
    assert!(
        (value - expected).abs() < 1e-6,
        "expected {expected}, got {value}"
    );
}

#[test]
fn test_flat_market_is_neutral() {
    let scorer = short_period_scorer();
    let series = OhlcSeries::from_closes(vec![100.0; 50]);

    let result = scorer.analyze_series(&series).unwrap();
    let scores = &result.individual_score;

    assert_near(scores.ma, 50.0);
    assert_near(scores.rsi, 50.0);
    assert_near(scores.macd, 50.0);
    assert_near(scores.bollinger_band, 50.0);
    assert!((result.final_score - 50.0).abs() < 10.0);
    assert_eq!(
        result.market_condition.label,
        MarketConditionLabel::LowVolatilitySideways
    );
    assert!((result.market_condition.weights.sum() - 1.0).abs() < 1e-9);
}

#[test]
fn test_default_periods_need_long_history() {
    // 기본 설정에서 50캔들이면 장기/초장기 이동평균이 정의되지 않음
    let scorer = CompositeScorer::new();
    let series = OhlcSeries::from_closes(vec![100.0; 50]);

    let result = scorer.analyze_series(&series).unwrap();
    assert!(result.individual_score.ma.is_none());
    assert!(result.individual_score.rsi.is_some());
    assert_eq!(
        result.market_condition.label,
        MarketConditionLabel::InsufficientData
    );
    assert_eq!(result.market_condition.weights.ma, 0.0);
    assert!((result.market_condition.weights.sum() - 1.0).abs() < 1e-9);
}

#[test]
fn test_rising_market_is_strong_uptrend() {
    let scorer = CompositeScorer::new();
    let series = OhlcSeries::from_closes(geometric(100.0, 1.0, 150));

    let result = scorer.analyze_series(&series).unwrap();

    assert_eq!(
        result.market_condition.label,
        MarketConditionLabel::StrongUptrend
    );
    assert!(result.individual_score.ma.unwrap() > 60.0);
    assert_eq!(result.individual_score.available().len(), 6);
    assert!((0.0..=100.0).contains(&result.final_score));
}

#[test]
fn test_regime_thresholds_are_price_units() {
    // 가격 1000 수준에서 캔들당 0.2 상승 → 장기 이동평균 기울기 0.2 > 0.15
    let scorer = CompositeScorer::new();
    let prices: Vec<f64> = (0..150).map(|i| 1000.0 + 0.2 * i as f64).collect();

    let result = scorer.analyze_series(&OhlcSeries::from_closes(prices)).unwrap();
    assert_eq!(
        result.market_condition.label,
        MarketConditionLabel::StrongUptrend
    );
}

#[test]
fn test_falling_market_is_strong_downtrend() {
    let scorer = CompositeScorer::new();
    let series = OhlcSeries::from_closes(geometric(100.0, -1.0, 150));

    let result = scorer.analyze_series(&series).unwrap();

    assert_eq!(
        result.market_condition.label,
        MarketConditionLabel::StrongDowntrend
    );
    assert!(result.individual_score.ma.unwrap() < 40.0);
}

#[test]
fn test_avg_score_uses_fixed_divisor() {
    let engine = IndicatorEngine::new();
    let prices = geometric(100.0, 0.5, 150);
    let series = OhlcSeries::from_closes(prices.clone());
    let set = engine
        .compute_all(&series, &IndicatorPeriods::default())
        .unwrap();

    // MA와 RSI만 제공
    let input = AnalysisInput {
        prices: &prices,
        short_ma: &set.short_ma,
        mid_ma: &set.mid_ma,
        long_ma: &set.long_ma,
        long_term_ma: &set.long_term_ma,
        rsi: &set.rsi,
        macd: &[],
        stochastic: &[],
        stochastic_rsi: &[],
        bollinger: &[],
        atr: &set.atr,
    };

    let result = CompositeScorer::new().analyze(&input).unwrap();
    let scores = &result.individual_score;
    let (ma, rsi) = (scores.ma.unwrap(), scores.rsi.unwrap());

    assert!(scores.macd.is_none());
    assert!((result.avg_score - (ma + rsi) / AVG_SCORE_DIVISOR).abs() < 1e-9);

    // 재정규화된 두 가중치의 합은 1
    let weights = &result.market_condition.weights;
    assert!((weights.ma + weights.rsi - 1.0).abs() < 1e-9);
    assert_eq!(weights.bollinger_band, 0.0);
}

#[test]
fn test_analysis_is_deterministic() {
    let scorer = CompositeScorer::new();
    let prices: Vec<f64> = (0..150)
        .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1)
        .collect();
    let series = OhlcSeries::from_closes(prices);

    let first = scorer.analyze_series(&series).unwrap();
    let second = scorer.analyze_series(&series).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_result_json_shape() {
    let scorer = CompositeScorer::new();
    let series = OhlcSeries::from_closes(geometric(100.0, 0.3, 150));
    let result = scorer.analyze_series(&series).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    for key in [
        "individualScore",
        "finalScore",
        "avgScore",
        "marketCondition",
        "interpretation",
    ] {
        assert!(json.get(key).is_some(), "missing key {key}");
    }
    assert!(json["individualScore"].get("stochasticRsi").is_some());
    assert!(json["individualScore"].get("bollingerBand").is_some());
}

prop_compose! {
    fn random_walk()(
        start in 10.0f64..10_000.0,
        steps in prop::collection::vec(-0.05f64..0.05, 40..160),
    ) -> Vec<f64> {
        let mut price = start;
        let mut prices = Vec::with_capacity(steps.len());
        for step in steps {
            price *= 1.0 + step;
            prices.push(price);
        }
        prices
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_scores_stay_in_range(prices in random_walk()) {
        let scorer = CompositeScorer::new();
        let result = scorer.analyze_series(&OhlcSeries::from_closes(prices)).unwrap();

        for (_, score) in result.individual_score.entries() {
            if let Some(score) = score {
                prop_assert!((0.0..=100.0).contains(&score), "score {} out of range", score);
            }
        }
        prop_assert!((0.0..=100.0).contains(&result.final_score));
        prop_assert!(result.avg_score >= 0.0);
        prop_assert!(result.avg_score <= 600.0 / AVG_SCORE_DIVISOR);
    }
}
