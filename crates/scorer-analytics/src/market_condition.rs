//! MarketCondition 분류기
//!
//! 장기 이동평균의 기울기와 ATR 변동성으로 시장 레짐을 판정하고, 레짐별 기본
//! 가중치를 사용 가능한 지표로 재정규화합니다.

use scorer_core::{IndicatorKind, MarketCondition, MarketConditionLabel};
use serde::{Deserialize, Serialize};

use crate::numeric::{defined_tail, slope, slope_pct};
use crate::scoring::last_defined;

/// 기울기 계산 구간.
const SLOPE_WINDOW: usize = 20;
/// 강한 추세 기울기 (가격/캔들, 최소제곱 기울기).
const STRONG_TREND_SLOPE: f64 = 0.15;
/// 추세 기울기 (가격/캔들, 최소제곱 기울기).
const TREND_SLOPE: f64 = 0.08;
/// 고변동성 기준 (ATR / 가격, %).
const HIGH_VOLATILITY_PCT: f64 = 3.0;

/// 분류 근거.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionMetrics {
    /// 장기 이동평균 기울기 (가격/캔들), 레짐 판정 기준
    pub slope: f64,
    /// 같은 기울기를 현재 값 대비 %로 환산한 참고 값
    pub slope_pct: f64,
    /// ATR / 장기 이동평균 (%)
    pub volatility_pct: f64,
}

/// 레짐 판정.
///
/// # 판정 로직
///
/// 기울기는 최근 20개 장기 이동평균의 최소제곱 기울기(가격 단위)입니다.
///
/// 1. 기울기 > 0.15 → **StrongUptrend**, > 0.08 → **Uptrend**
/// 2. 기울기 < -0.15 → **StrongDowntrend**, < -0.08 → **Downtrend**
/// 3. 그 외 ATR% > 3 → **HighVolatilitySideways**, 아니면 **LowVolatilitySideways**
///
/// 장기 이동평균 또는 ATR에 정의된 값이 없으면 **InsufficientData**.
pub fn classify_label(
    long_term_ma: &[Option<f64>],
    atr: &[Option<f64>],
) -> (MarketConditionLabel, Option<ConditionMetrics>) {
    let ma_tail = defined_tail(long_term_ma, SLOPE_WINDOW);
    let (Some(&current_ma), Some(current_atr)) = (ma_tail.last(), last_defined(atr)) else {
        return (MarketConditionLabel::InsufficientData, None);
    };

    let slope = slope(&ma_tail);
    let volatility = if current_ma != 0.0 {
        current_atr / current_ma.abs() * 100.0
    } else {
        0.0
    };

    let label = if slope > STRONG_TREND_SLOPE {
        MarketConditionLabel::StrongUptrend
    } else if slope > TREND_SLOPE {
        MarketConditionLabel::Uptrend
    } else if slope < -STRONG_TREND_SLOPE {
        MarketConditionLabel::StrongDowntrend
    } else if slope < -TREND_SLOPE {
        MarketConditionLabel::Downtrend
    } else if volatility > HIGH_VOLATILITY_PCT {
        MarketConditionLabel::HighVolatilitySideways
    } else {
        MarketConditionLabel::LowVolatilitySideways
    };

    (
        label,
        Some(ConditionMetrics {
            slope,
            slope_pct: slope_pct(&ma_tail),
            volatility_pct: volatility,
        }),
    )
}

/// 레짐을 판정하고 사용 가능한 지표로 가중치를 재정규화합니다.
pub fn classify(
    long_term_ma: &[Option<f64>],
    atr: &[Option<f64>],
    available: &[IndicatorKind],
) -> MarketCondition {
    let (label, _) = classify_label(long_term_ma, atr);
    MarketCondition {
        label,
        weights: label.base_weights().renormalized(available),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::to_options;

    fn linear(start: f64, step: f64, len: usize) -> Vec<Option<f64>> {
        to_options(&(0..len).map(|i| start + step * i as f64).collect::<Vec<_>>())
    }

    #[test]
    fn test_insufficient_data() {
        let (label, metrics) = classify_label(&[None, None], &[Some(1.0)]);
        assert_eq!(label, MarketConditionLabel::InsufficientData);
        assert!(metrics.is_none());

        let condition = classify(&to_options(&[100.0; 30]), &[], &IndicatorKind::ALL);
        assert_eq!(condition.label, MarketConditionLabel::InsufficientData);
        assert!((condition.weights.ma - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_trend_labels() {
        let atr = vec![Some(1.0); 30];
        let label = |start: f64, step: f64| classify_label(&linear(start, step, 30), &atr).0;

        assert_eq!(label(100.0, 0.2), MarketConditionLabel::StrongUptrend);
        assert_eq!(label(100.0, 0.1), MarketConditionLabel::Uptrend);
        assert_eq!(label(100.0, -0.2), MarketConditionLabel::StrongDowntrend);
        assert_eq!(label(100.0, -0.1), MarketConditionLabel::Downtrend);
        assert_eq!(label(100.0, 0.05), MarketConditionLabel::LowVolatilitySideways);
    }

    #[test]
    fn test_thresholds_do_not_scale_with_price() {
        // 가격 수준이 1000이어도 캔들당 0.2 상승은 강한 상승 추세
        let (label, metrics) = classify_label(&linear(1000.0, 0.2, 30), &[Some(1.0)]);
        let metrics = metrics.unwrap();

        assert_eq!(label, MarketConditionLabel::StrongUptrend);
        assert!((metrics.slope - 0.2).abs() < 1e-9);
        assert!(metrics.slope_pct < 0.15);
    }

    #[test]
    fn test_sideways_by_volatility() {
        let flat = to_options(&[100.0; 30]);
        assert_eq!(
            classify_label(&flat, &[Some(5.0)]).0,
            MarketConditionLabel::HighVolatilitySideways
        );

        let (label, metrics) = classify_label(&flat, &[Some(1.0)]);
        assert_eq!(label, MarketConditionLabel::LowVolatilitySideways);
        assert_eq!(metrics.unwrap().volatility_pct, 1.0);
    }

    #[test]
    fn test_weights_renormalized_to_available() {
        let flat = to_options(&[100.0; 30]);
        let available = [IndicatorKind::Rsi, IndicatorKind::BollingerBand];
        let condition = classify(&flat, &[Some(1.0)], &available);

        assert!((condition.weights.sum() - 1.0).abs() < 1e-12);
        assert_eq!(condition.weights.ma, 0.0);
        assert!((condition.weights.rsi - 0.2 / 0.35).abs() < 1e-12);
    }
}
