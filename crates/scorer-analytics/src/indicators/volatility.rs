//! 변동성 지표 (Volatility Indicators).
//!
//! 가격 변동성을 측정하는 지표들을 제공합니다.
//! - Bollinger Bands (볼린저 밴드)
//! - ATR (Average True Range, 평균 실제 범위)

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult, IndicatorSeries};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: f64,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

/// 볼린저 밴드 결과.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BollingerBandsResult {
    /// 상단 밴드 (MA + k × σ).
    pub upper: Option<f64>,
    /// 중간 밴드 (이동평균).
    pub middle: Option<f64>,
    /// 하단 밴드 (MA - k × σ).
    pub lower: Option<f64>,
    /// %B 지표 ((현재가 - 하단) / (상단 - 하단)).
    pub percent_b: Option<f64>,
    /// 밴드 폭 ((상단 - 하단) / 중간).
    pub bandwidth: Option<f64>,
}

impl BollingerBandsResult {
    /// 상단, 중간, 하단, %B가 모두 정의된 경우.
    pub fn bands(&self) -> Option<(f64, f64, f64, f64)> {
        match (self.upper, self.middle, self.lower, self.percent_b) {
            (Some(u), Some(m), Some(l), Some(b)) => Some((u, m, l, b)),
            _ => None,
        }
    }
}

/// ATR 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AtrParams {
    /// ATR 기간 (기본: 14).
    pub period: usize,
}

impl Default for AtrParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

/// 변동성 지표 계산기.
#[derive(Debug, Default)]
pub struct VolatilityIndicators;

impl VolatilityIndicators {
    /// 새로운 변동성 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 볼린저 밴드 계산.
    ///
    /// 중간 밴드 = N일 이동평균
    /// 상단/하단 밴드 = 중간 밴드 ± (k × 모표준편차)
    ///
    /// 밴드 폭이 0이면 %B는 0.5입니다.
    pub fn bollinger_bands(
        &self,
        prices: &[f64],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        let period = params.period;
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "볼린저 밴드 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if params.std_dev_multiplier.is_nan() || params.std_dev_multiplier <= 0.0 {
            return Err(IndicatorError::InvalidParameter(format!(
                "표준편차 배수는 양수여야 합니다: {}",
                params.std_dev_multiplier
            )));
        }

        let mut result = vec![BollingerBandsResult::default(); prices.len()];
        if prices.len() < period {
            return Ok(result);
        }

        for i in (period - 1)..prices.len() {
            let window = &prices[i + 1 - period..=i];
            let middle = window.iter().sum::<f64>() / period as f64;
            let variance = window.iter().map(|p| (p - middle).powi(2)).sum::<f64>() / period as f64;
            let offset = params.std_dev_multiplier * variance.sqrt();

            let upper = middle + offset;
            let lower = middle - offset;
            let width = upper - lower;

            let percent_b = if width == 0.0 {
                0.5
            } else {
                (prices[i] - lower) / width
            };
            let bandwidth = if middle != 0.0 {
                Some(width / middle)
            } else {
                None
            };

            result[i] = BollingerBandsResult {
                upper: Some(upper),
                middle: Some(middle),
                lower: Some(lower),
                percent_b: Some(percent_b),
                bandwidth,
            };
        }

        Ok(result)
    }

    /// ATR (Average True Range) 계산.
    ///
    /// TR = max(고가 - 저가, |고가 - 전일 종가|, |저가 - 전일 종가|)
    /// 첫 캔들의 TR은 고가 - 저가입니다.
    /// ATR은 처음 N개 TR의 평균으로 시작해 Wilder 평활을 적용합니다.
    pub fn atr(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: AtrParams,
    ) -> IndicatorResult<IndicatorSeries> {
        let period = params.period;
        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "ATR 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if high.len() != close.len() || low.len() != close.len() {
            return Err(IndicatorError::Misaligned(format!(
                "고가 {}, 저가 {}, 종가 {}",
                high.len(),
                low.len(),
                close.len()
            )));
        }

        let len = close.len();
        let mut result = vec![None; len];
        if len < period {
            return Ok(result);
        }

        let true_ranges: Vec<f64> = (0..len)
            .map(|i| {
                let range = high[i] - low[i];
                if i == 0 {
                    range
                } else {
                    let prev_close = close[i - 1];
                    range
                        .max((high[i] - prev_close).abs())
                        .max((low[i] - prev_close).abs())
                }
            })
            .collect();

        let n = period as f64;
        let mut atr = true_ranges[..period].iter().sum::<f64>() / n;
        result[period - 1] = Some(atr);

        for (i, &tr) in true_ranges.iter().enumerate().skip(period) {
            atr = (atr * (n - 1.0) + tr) / n;
            result[i] = Some(atr);
        }

        Ok(result)
    }
}
