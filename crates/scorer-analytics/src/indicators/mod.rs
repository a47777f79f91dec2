//! 기술적 지표 모듈.
//!
//! 점수 계산에 필요한 기술적 지표를 원시 OHLC 시계열에서 계산합니다.
//! 모든 결과는 입력과 같은 길이로 정렬되며, 워밍업 구간은 `None`입니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균 (Simple Moving Average)
//! - **EMA**: 지수 이동평균 (Exponential Moving Average)
//! - **MACD**: 이동평균 수렴/확산 (Moving Average Convergence Divergence)
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수 (Relative Strength Index)
//! - **Stochastic**: 스토캐스틱 오실레이터
//! - **Stochastic RSI**: RSI에 적용한 스토캐스틱
//!
//! ## 변동성 지표 (Volatility Indicators)
//! - **Bollinger Bands**: 볼린저 밴드
//! - **ATR**: 평균 실제 범위 (Average True Range)
//!
//! # 사용 예시
//!
//! ```ignore
//! use scorer_analytics::indicators::{IndicatorEngine, SmaParams, RsiParams};
//!
//! let engine = IndicatorEngine::new();
//!
//! // SMA 계산
//! let sma = engine.sma(&prices, SmaParams { period: 20 })?;
//!
//! // RSI 계산
//! let rsi = engine.rsi(&prices, RsiParams { period: 14 })?;
//! ```

pub mod momentum;
pub mod trend;
pub mod volatility;

use scorer_core::{round_ceil, IndicatorPeriods, OhlcSeries};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use momentum::{
    MomentumCalculator, RsiParams, StochasticParams, StochasticResult, StochasticRsiParams,
};
pub use trend::{EmaParams, MacdParams, MacdResult, SmaParams, TrendIndicators};
pub use volatility::{AtrParams, BollingerBandsParams, BollingerBandsResult, VolatilityIndicators};

/// 지표 계산 오류.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),

    /// 입력 시계열 길이 불일치
    #[error("입력 시계열 길이 불일치: {0}")]
    Misaligned(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 입력과 같은 길이의 지표 시계열 (워밍업 구간은 `None`).
pub type IndicatorSeries = Vec<Option<f64>>;

/// 점수 계산에 필요한 모든 지표.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    pub short_ma: IndicatorSeries,
    pub mid_ma: IndicatorSeries,
    pub long_ma: IndicatorSeries,
    pub long_term_ma: IndicatorSeries,
    pub rsi: IndicatorSeries,
    pub macd: Vec<MacdResult>,
    pub stochastic: Vec<StochasticResult>,
    pub stochastic_rsi: Vec<StochasticResult>,
    pub bollinger: Vec<BollingerBandsResult>,
    pub atr: IndicatorSeries,
}

/// 통합 지표 엔진.
///
/// 모든 기술적 지표 계산을 위한 통합 인터페이스를 제공합니다.
/// 출력 값은 `precision` 자릿수로 올림 처리됩니다.
#[derive(Debug)]
pub struct IndicatorEngine {
    trend: TrendIndicators,
    momentum: MomentumCalculator,
    volatility: VolatilityIndicators,
    precision: u32,
}

impl Default for IndicatorEngine {
    fn default() -> Self {
        Self::with_precision(4)
    }
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성 (소수점 4자리).
    pub fn new() -> Self {
        Self::default()
    }

    /// 출력 자릿수를 지정해 지표 엔진 생성.
    pub fn with_precision(precision: u32) -> Self {
        Self {
            trend: TrendIndicators::new(),
            momentum: MomentumCalculator::new(),
            volatility: VolatilityIndicators::new(),
            precision,
        }
    }

    /// 출력 자릿수.
    pub fn precision(&self) -> u32 {
        self.precision
    }

    // ==================== 추세 지표 ====================

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// # 반환
    /// 계산된 SMA 값들의 벡터 (처음 period-1개는 None)
    pub fn sma(&self, prices: &[f64], params: SmaParams) -> IndicatorResult<IndicatorSeries> {
        Ok(self.round_series(self.trend.sma(prices, params)?))
    }

    /// 지수 이동평균 (EMA) 계산.
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<IndicatorSeries> {
        Ok(self.round_series(self.trend.ema(prices, params)?))
    }

    /// MACD 계산.
    ///
    /// # 반환
    /// MACD 라인, 시그널 라인, 히스토그램
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> IndicatorResult<Vec<MacdResult>> {
        let points = self.trend.macd(prices, params)?;
        Ok(points
            .into_iter()
            .map(|p| MacdResult {
                macd: self.round(p.macd),
                signal: self.round(p.signal),
                histogram: self.round(p.histogram),
            })
            .collect())
    }

    // ==================== 모멘텀 지표 ====================

    /// RSI 계산.
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<IndicatorSeries> {
        Ok(self.round_series(self.momentum.rsi(prices, params)?))
    }

    /// 스토캐스틱 오실레이터 계산.
    pub fn stochastic(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: StochasticParams,
    ) -> IndicatorResult<Vec<StochasticResult>> {
        let points = self.momentum.stochastic(high, low, close, params)?;
        Ok(self.round_stochastic(points))
    }

    /// 스토캐스틱 RSI 계산.
    pub fn stochastic_rsi(
        &self,
        prices: &[f64],
        params: StochasticRsiParams,
    ) -> IndicatorResult<Vec<StochasticResult>> {
        let points = self.momentum.stochastic_rsi(prices, params)?;
        Ok(self.round_stochastic(points))
    }

    // ==================== 변동성 지표 ====================

    /// 볼린저 밴드 계산.
    pub fn bollinger_bands(
        &self,
        prices: &[f64],
        params: BollingerBandsParams,
    ) -> IndicatorResult<Vec<BollingerBandsResult>> {
        let points = self.volatility.bollinger_bands(prices, params)?;
        Ok(points
            .into_iter()
            .map(|p| BollingerBandsResult {
                upper: self.round(p.upper),
                middle: self.round(p.middle),
                lower: self.round(p.lower),
                percent_b: self.round(p.percent_b),
                bandwidth: self.round(p.bandwidth),
            })
            .collect())
    }

    /// ATR 계산.
    pub fn atr(
        &self,
        high: &[f64],
        low: &[f64],
        close: &[f64],
        params: AtrParams,
    ) -> IndicatorResult<IndicatorSeries> {
        Ok(self.round_series(self.volatility.atr(high, low, close, params)?))
    }

    // ==================== 일괄 계산 ====================

    /// 점수 계산에 필요한 모든 지표를 한 번에 계산합니다.
    pub fn compute_all(
        &self,
        series: &OhlcSeries,
        periods: &IndicatorPeriods,
    ) -> IndicatorResult<IndicatorSet> {
        let close = series.close();
        let (high, low) = (series.high(), series.low());

        Ok(IndicatorSet {
            short_ma: self.sma(close, SmaParams { period: periods.short_ma })?,
            mid_ma: self.sma(close, SmaParams { period: periods.mid_ma })?,
            long_ma: self.sma(close, SmaParams { period: periods.long_ma })?,
            long_term_ma: self.sma(close, SmaParams { period: periods.long_term_ma })?,
            rsi: self.rsi(close, RsiParams { period: periods.rsi })?,
            macd: self.macd(
                close,
                MacdParams {
                    fast_period: periods.macd_fast,
                    slow_period: periods.macd_slow,
                    signal_period: periods.macd_signal,
                },
            )?,
            stochastic: self.stochastic(
                high,
                low,
                close,
                StochasticParams {
                    k_period: periods.stochastic_k,
                    smooth_period: periods.stochastic_smooth,
                    d_period: periods.stochastic_d,
                },
            )?,
            stochastic_rsi: self.stochastic_rsi(
                close,
                StochasticRsiParams {
                    rsi_period: periods.stoch_rsi_rsi,
                    stochastic: StochasticParams {
                        k_period: periods.stoch_rsi_stochastic,
                        smooth_period: periods.stoch_rsi_smooth,
                        d_period: periods.stoch_rsi_d,
                    },
                },
            )?,
            bollinger: self.bollinger_bands(
                close,
                BollingerBandsParams {
                    period: periods.bollinger_period,
                    std_dev_multiplier: periods.bollinger_multiplier,
                },
            )?,
            atr: self.atr(high, low, close, AtrParams { period: periods.atr })?,
        })
    }

    // ==================== 유틸리티 ====================

    fn round(&self, value: Option<f64>) -> Option<f64> {
        value.map(|v| round_ceil(v, self.precision))
    }

    fn round_series(&self, series: IndicatorSeries) -> IndicatorSeries {
        series.into_iter().map(|v| self.round(v)).collect()
    }

    fn round_stochastic(&self, points: Vec<StochasticResult>) -> Vec<StochasticResult> {
        points
            .into_iter()
            .map(|p| StochasticResult {
                k: self.round(p.k),
                d: self.round(p.d),
            })
            .collect()
    }
}
