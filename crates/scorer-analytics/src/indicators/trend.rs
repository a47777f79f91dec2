//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표들을 제공합니다.
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult, IndicatorSeries};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 12 }
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

/// MACD 결과.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MacdResult {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Option<f64>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Option<f64>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Option<f64>,
}

impl MacdResult {
    /// 세 값이 모두 정의된 경우 (라인, 시그널, 히스토그램).
    pub fn values(&self) -> Option<(f64, f64, f64)> {
        match (self.macd, self.signal, self.histogram) {
            (Some(m), Some(s), Some(h)) => Some((m, s, h)),
            _ => None,
        }
    }
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// SMA = (P1 + P2 + ... + Pn) / n
    ///
    /// # 반환
    /// 각 시점의 SMA 값 (처음 period-1개는 None, 데이터가 부족하면 전부 None)
    pub fn sma(&self, prices: &[f64], params: SmaParams) -> IndicatorResult<IndicatorSeries> {
        let period = params.period;
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        let mut result = vec![None; prices.len()];
        for i in (period - 1)..prices.len() {
            let sum: f64 = prices[i + 1 - period..=i].iter().sum();
            result[i] = Some(sum / period as f64);
        }

        Ok(result)
    }

    /// 지수 이동평균 (EMA) 계산.
    ///
    /// EMA = (현재가 × k) + (이전 EMA × (1 - k)), k = 2 / (period + 1).
    /// 첫 EMA는 SMA로 시작합니다.
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<IndicatorSeries> {
        if params.period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "기간은 0보다 커야 합니다".to_string(),
            ));
        }

        Ok(ema_values(prices, params.period))
    }

    /// MACD 계산.
    ///
    /// MACD 라인 = 단기 EMA - 장기 EMA
    /// 시그널 라인 = MACD 라인의 EMA
    /// 히스토그램 = MACD 라인 - 시그널 라인
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        if params.fast_period == 0 || params.slow_period == 0 || params.signal_period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "MACD 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if params.fast_period >= params.slow_period {
            return Err(IndicatorError::InvalidParameter(format!(
                "단기 기간({})은 장기 기간({})보다 작아야 합니다",
                params.fast_period, params.slow_period
            )));
        }

        let fast = ema_values(prices, params.fast_period);
        let slow = ema_values(prices, params.slow_period);

        let mut result = vec![MacdResult::default(); prices.len()];
        let start = params.slow_period - 1;
        if prices.len() <= start {
            return Ok(result);
        }

        // 장기 EMA가 정의된 시점부터 MACD 라인이 연속으로 정의됨
        let line: Vec<f64> = (start..prices.len())
            .map(|i| match (fast[i], slow[i]) {
                (Some(f), Some(s)) => f - s,
                _ => 0.0,
            })
            .collect();
        let signal = ema_values(&line, params.signal_period);

        for (offset, &macd) in line.iter().enumerate() {
            let entry = &mut result[start + offset];
            entry.macd = Some(macd);
            if let Some(sig) = signal[offset] {
                entry.signal = Some(sig);
                entry.histogram = Some(macd - sig);
            }
        }

        Ok(result)
    }
}

/// SMA로 시작하는 EMA. 기간보다 짧으면 전부 None.
pub(crate) fn ema_values(values: &[f64], period: usize) -> IndicatorSeries {
    let mut result = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut prev = values[..period].iter().sum::<f64>() / period as f64;
    result[period - 1] = Some(prev);

    // 상수 구간에서 EMA가 정확히 유지되어야 함
    for (i, &value) in values.iter().enumerate().skip(period) {
        let ema = prev + multiplier * (value - prev);
        result[i] = Some(ema);
        prev = ema;
    }

    result
}

/// 정의된 값으로만 이루어진 창의 단순 이동평균.
pub(crate) fn sma_of_options(values: &[Option<f64>], period: usize) -> IndicatorSeries {
    let mut result = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        if window.iter().all(Option::is_some) {
            let sum: f64 = window.iter().flatten().sum();
            result[i] = Some(sum / period as f64);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_prices() -> Vec<f64> {
        vec![
            100.0, 102.0, 101.0, 103.0, 105.0, 104.0, 106.0, 108.0, 107.0, 109.0, 111.0, 110.0,
            112.0, 114.0, 113.0, 115.0, 117.0, 116.0, 118.0, 120.0, 119.0, 121.0, 123.0, 122.0,
            124.0, 126.0, 125.0, 127.0, 129.0, 128.0, 130.0, 132.0, 131.0, 133.0, 135.0, 134.0,
        ]
    }

    #[test]
    fn test_sma_warmup_and_value() {
        let trend = TrendIndicators::new();
        let sma = trend.sma(&[1.0, 2.0, 3.0, 4.0, 5.0], SmaParams { period: 3 }).unwrap();

        assert_eq!(sma.len(), 5);
        assert!(sma[1].is_none());
        assert_eq!(sma[2], Some(2.0));
        assert_eq!(sma[4], Some(4.0));
    }

    #[test]
    fn test_sma_short_input_is_all_none() {
        let trend = TrendIndicators::new();
        let sma = trend.sma(&[1.0, 2.0], SmaParams { period: 20 }).unwrap();
        assert_eq!(sma, vec![None, None]);
    }

    #[test]
    fn test_zero_period_is_error() {
        let trend = TrendIndicators::new();
        assert!(trend.sma(&[1.0], SmaParams { period: 0 }).is_err());
        assert!(trend.ema(&[1.0], EmaParams { period: 0 }).is_err());
    }

    #[test]
    fn test_ema_seeded_with_sma() {
        let trend = TrendIndicators::new();
        let ema = trend.ema(&[2.0, 4.0, 6.0, 8.0], EmaParams { period: 3 }).unwrap();

        assert_eq!(ema[2], Some(4.0));
        // k = 0.5 → 8 * 0.5 + 4 * 0.5
        assert_eq!(ema[3], Some(6.0));
    }

    #[test]
    fn test_macd_alignment() {
        let trend = TrendIndicators::new();
        let prices = sample_prices();
        let macd = trend.macd(&prices, MacdParams::default()).unwrap();

        assert_eq!(macd.len(), prices.len());
        assert!(macd[24].macd.is_none());
        assert!(macd[25].macd.is_some());
        assert!(macd[32].signal.is_none());
        assert!(macd[33].values().is_some());

        // 상승 추세에서 MACD 라인은 양수
        assert!(macd[35].macd.unwrap() > 0.0);
    }

    #[test]
    fn test_macd_flat_is_zero() {
        let trend = TrendIndicators::new();
        let prices = vec![100.0; 50];
        let macd = trend.macd(&prices, MacdParams::default()).unwrap();

        let (line, signal, hist) = macd[49].values().unwrap();
        assert_eq!(line, 0.0);
        assert_eq!(signal, 0.0);
        assert_eq!(hist, 0.0);
    }

    #[test]
    fn test_macd_invalid_periods() {
        let trend = TrendIndicators::new();
        let params = MacdParams {
            fast_period: 26,
            slow_period: 12,
            signal_period: 9,
        };
        assert!(trend.macd(&sample_prices(), params).is_err());
    }

    #[test]
    fn test_sma_of_options_requires_full_window() {
        let values = [None, Some(1.0), Some(2.0), Some(3.0)];
        let sma = sma_of_options(&values, 2);
        assert_eq!(sma, vec![None, None, Some(1.5), Some(2.5)]);
    }
}
