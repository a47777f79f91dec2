//! 모멘텀 지표 (Momentum Indicators).
//!
//! 가격 변화 속도와 과매수/과매도를 측정하는 지표들을 제공합니다.
//! - RSI (Relative Strength Index)
//! - Stochastic Oscillator
//! - Stochastic RSI

use serde::{Deserialize, Serialize};

use super::trend::sma_of_options;
use super::{IndicatorError, IndicatorResult, IndicatorSeries};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 스토캐스틱 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochasticParams {
    /// %K 기간 (기본: 14).
    pub k_period: usize,
    /// Slow %K 평활 기간 (기본: 3).
    pub smooth_period: usize,
    /// %D 기간 (기본: 3).
    pub d_period: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            smooth_period: 3,
            d_period: 3,
        }
    }
}

/// 스토캐스틱 RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StochasticRsiParams {
    /// RSI 기간 (기본: 14).
    pub rsi_period: usize,
    /// RSI 값에 적용할 스토캐스틱 파라미터.
    pub stochastic: StochasticParams,
}

impl Default for StochasticRsiParams {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            stochastic: StochasticParams::default(),
        }
    }
}

/// 스토캐스틱 결과.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StochasticResult {
    /// %K (Slow %K).
    pub k: Option<f64>,
    /// %D (%K의 이동평균).
    pub d: Option<f64>,
}

impl StochasticResult {
    /// %K와 %D가 모두 정의된 경우.
    pub fn values(&self) -> Option<(f64, f64)> {
        match (self.k, self.d) {
            (Some(k), Some(d)) => Some((k, d)),
            _ => None,
        }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// RSI (Relative Strength Index) 계산.
    ///
    /// RSI = 100 - (100 / (1 + RS))
    /// RS = 평균 상승폭 / 평균 하락폭
    ///
    /// 첫 평균은 처음 `period`개 변화량의 단순 평균이고, 이후는 Wilder 평활
    /// `(이전 평균 × (n - 1) + 현재 값) / n`을 사용합니다.
    ///
    /// # 반환
    /// 0-100 사이의 RSI 값들 (첫 값은 인덱스 `period`)
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<IndicatorSeries> {
        let period = params.period;
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "RSI 기간은 0보다 커야 합니다".to_string(),
            ));
        }

        let mut result = vec![None; prices.len()];
        if prices.len() <= period {
            return Ok(result);
        }

        let changes: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
        let n = period as f64;

        let mut avg_gain = changes[..period].iter().map(|c| c.max(0.0)).sum::<f64>() / n;
        let mut avg_loss = changes[..period].iter().map(|c| (-c).max(0.0)).sum::<f64>() / n;
        result[period] = Some(rsi_value(avg_gain, avg_loss));

        for (i, &change) in changes.iter().enumerate().skip(period) {
            avg_gain = (avg_gain * (n - 1.0) + change.max(0.0)) / n;
            avg_loss = (avg_loss * (n - 1.0) + (-change).max(0.0)) / n;
            result[i + 1] = Some(rsi_value(avg_gain, avg_loss));
        }

        Ok(result)
    }

    /// 스토캐스틱 오실레이터 계산.
    ///
    /// Fast %K = (현재가 - 최저가) / (최고가 - 최저가) × 100
    /// Slow %K = Fast %K의 이동평균
    /// %D = Slow %K의 이동평균
    ///
    /// 최고가와 최저가가 같으면 Fast %K는 50입니다.
    pub fn stochastic(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: StochasticParams,
    ) -> IndicatorResult<Vec<StochasticResult>> {
        validate_stochastic(&params)?;
        if high.len() != close.len() || low.len() != close.len() {
            return Err(IndicatorError::Misaligned(format!(
                "고가 {}, 저가 {}, 종가 {}",
                high.len(),
                low.len(),
                close.len()
            )));
        }

        let wrap = |s: &[f64]| s.iter().map(|&v| Some(v)).collect::<Vec<_>>();
        Ok(stochastic_lines(&wrap(high), &wrap(low), &wrap(close), params))
    }

    /// 스토캐스틱 RSI 계산.
    ///
    /// RSI 값을 고가/저가/종가로 사용하는 스토캐스틱입니다.
    pub fn stochastic_rsi(
        &self,
        prices: &[f64],
        params: StochasticRsiParams,
    ) -> IndicatorResult<Vec<StochasticResult>> {
        validate_stochastic(&params.stochastic)?;
        let rsi = self.rsi(prices, RsiParams { period: params.rsi_period })?;
        Ok(stochastic_lines(&rsi, &rsi, &rsi, params.stochastic))
    }
}

fn rsi_value(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            // 변화 없음: 중립
            50.0
        } else {
            100.0
        }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}

fn validate_stochastic(params: &StochasticParams) -> IndicatorResult<()> {
    if params.k_period == 0 || params.smooth_period == 0 || params.d_period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "스토캐스틱 기간은 0보다 커야 합니다".to_string(),
        ));
    }
    Ok(())
}

/// 정의되지 않은 값을 허용하는 스토캐스틱 계산.
fn stochastic_lines(
    high: &[Option<f64>],
    low: &[Option<f64>],
    close: &[Option<f64>],
    params: StochasticParams,
) -> Vec<StochasticResult> {
    let len = close.len();
    let k_period = params.k_period;

    let mut fast_k: IndicatorSeries = vec![None; len];
    if len >= k_period {
        for i in (k_period - 1)..len {
            let start = i + 1 - k_period;
            let highs: Option<Vec<f64>> = high[start..=i].iter().copied().collect();
            let lows: Option<Vec<f64>> = low[start..=i].iter().copied().collect();
            let (Some(highs), Some(lows), Some(current)) = (highs, lows, close[i]) else {
                continue;
            };

            let highest = highs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let lowest = lows.iter().copied().fold(f64::INFINITY, f64::min);
            let range = highest - lowest;

            fast_k[i] = Some(if range == 0.0 {
                50.0
            } else {
                (current - lowest) / range * 100.0
            });
        }
    }

    let slow_k = sma_of_options(&fast_k, params.smooth_period);
    let d = sma_of_options(&slow_k, params.d_period);

    slow_k
        .into_iter()
        .zip(d)
        .map(|(k, d)| StochasticResult { k, d })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rsi_first_defined_index() {
        let calc = MomentumCalculator::new();
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let rsi = calc.rsi(&prices, RsiParams { period: 14 }).unwrap();

        assert!(rsi[13].is_none());
        assert_eq!(rsi[14], Some(100.0));
    }

    #[test]
    fn test_rsi_flat_is_neutral() {
        let calc = MomentumCalculator::new();
        let rsi = calc.rsi(&[100.0; 30], RsiParams::default()).unwrap();
        assert_eq!(rsi[29], Some(50.0));
    }

    #[test]
    fn test_rsi_falling_is_zero() {
        let calc = MomentumCalculator::new();
        let prices: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let rsi = calc.rsi(&prices, RsiParams::default()).unwrap();
        assert_eq!(rsi[19], Some(0.0));
    }

    #[test]
    fn test_rsi_wilder_smoothing() {
        let calc = MomentumCalculator::new();
        // 변화량: +1, -1, +2
        let prices = [10.0, 11.0, 10.0, 12.0];
        let rsi = calc.rsi(&prices, RsiParams { period: 2 }).unwrap();

        // 초기: gain 0.5, loss 0.5 → 50
        assert_eq!(rsi[2], Some(50.0));
        // gain (0.5 + 2) / 2 = 1.25, loss 0.5 / 2 = 0.25 → RS 5
        let expected = 100.0 - 100.0 / 6.0;
        assert!((rsi[3].unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_rsi_short_input_and_zero_period() {
        let calc = MomentumCalculator::new();
        let rsi = calc.rsi(&[1.0, 2.0], RsiParams::default()).unwrap();
        assert!(rsi.iter().all(Option::is_none));
        assert!(calc.rsi(&[1.0, 2.0], RsiParams { period: 0 }).is_err());
    }

    #[test]
    fn test_stochastic_alignment_and_range() {
        let calc = MomentumCalculator::new();
        let close: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let high: Vec<f64> = close.iter().map(|c| c + 1.0).collect();
        let low: Vec<f64> = close.iter().map(|c| c - 1.0).collect();

        let stoch = calc
            .stochastic(&high, &low, &close, StochasticParams::default())
            .unwrap();

        assert_eq!(stoch.len(), 30);
        // %D 첫 값: k + smooth + d - 3 = 17
        assert!(stoch[16].d.is_none());
        assert!(stoch[17].values().is_some());
        for point in stoch.iter().filter_map(StochasticResult::values) {
            assert!((0.0..=100.0).contains(&point.0));
            assert!((0.0..=100.0).contains(&point.1));
        }
    }

    #[test]
    fn test_stochastic_flat_range_is_fifty() {
        let calc = MomentumCalculator::new();
        let flat = vec![100.0; 20];
        let stoch = calc
            .stochastic(&flat, &flat, &flat, StochasticParams::default())
            .unwrap();
        assert_eq!(stoch[19].values(), Some((50.0, 50.0)));
    }

    #[test]
    fn test_stochastic_misaligned() {
        let calc = MomentumCalculator::new();
        let result = calc.stochastic(&[1.0, 2.0], &[1.0], &[1.0, 2.0], StochasticParams::default());
        assert!(matches!(result, Err(IndicatorError::Misaligned(_))));
    }

    #[test]
    fn test_stochastic_rsi_warmup() {
        let calc = MomentumCalculator::new();
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.4).cos() * 3.0).collect();
        let stoch_rsi = calc
            .stochastic_rsi(&prices, StochasticRsiParams::default())
            .unwrap();

        // RSI 14 + %K 14 + 3 + 3 - 3
        assert!(stoch_rsi[30].d.is_none());
        assert!(stoch_rsi[31].values().is_some());
    }
}
