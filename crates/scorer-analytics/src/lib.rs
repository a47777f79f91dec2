//! 지표 계산 및 점수 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 수치 헬퍼 (기울기, 교차, 변동성, 극값)
//! - 기술적 지표 (이동평균, RSI, MACD, 스토캐스틱, 스토캐스틱 RSI, 볼린저 밴드, ATR)
//! - 지표별 점수 계산과 다이버전스
//! - 시장 상황 분류
//! - 종합 점수 계산 및 여러 마켓 일괄 분석
//!
//! # Re-exports
//!
//! - [`indicators`]: 지표 계산 엔진 (IndicatorEngine, IndicatorSet 등)
//! - [`composite`]: 종합 점수 계산기 (CompositeScorer, AnalysisInput)
//! - [`batch`]: 일괄 분석 (analyze_markets, MarketRequest, MarketOutcome)

pub mod batch;
pub mod composite;
pub mod indicators;
pub mod market_condition;
pub mod numeric;
pub mod scoring;

// Indicators 모듈 re-exports
pub use indicators::{
    AtrParams,
    // 변동성 지표
    BollingerBandsParams,
    BollingerBandsResult,
    EmaParams,
    IndicatorEngine,
    IndicatorError,
    IndicatorResult,
    IndicatorSeries,
    IndicatorSet,
    MacdParams,
    MacdResult,
    MomentumCalculator,
    // 모멘텀 지표
    RsiParams,
    // 추세 지표
    SmaParams,
    StochasticParams,
    StochasticResult,
    StochasticRsiParams,
    TrendIndicators,
    VolatilityIndicators,
};

// Scoring 모듈 re-exports
pub use scoring::{PatternSignal, ScoringError, ScoringResult};

pub use batch::{analyze_markets, MarketOutcome, MarketRequest};
pub use composite::{AnalysisInput, CompositeScorer, AVG_SCORE_DIVISOR};
pub use market_condition::{classify, classify_label, ConditionMetrics};
pub use numeric::NumericError;
