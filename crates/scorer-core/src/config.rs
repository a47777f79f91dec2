//! 설정 관리.
//!
//! 지표 기간, 엔진 옵션, 로깅 설정을 정의하고 파일/환경 변수에서 로드합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ScorerError, ScorerResult};

/// 점수 엔진 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScorerConfig {
    /// 지표 계산 기간
    #[serde(default)]
    pub indicators: IndicatorPeriods,
    /// 엔진 옵션
    #[serde(default)]
    pub engine: EngineConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 지표 계산 기간.
///
/// 기본값은 일봉 기준 업비트 차트의 표준 설정입니다.
/// 모든 지표가 정의되려면 `long_term_ma`(기본 120)개 이상의 캔들이 필요하며,
/// 그보다 짧으면 이동평균 점수와 시장 상황 판정이 사용 불가로 처리됩니다.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndicatorPeriods {
    /// 단기 이동평균
    pub short_ma: usize,
    /// 중기 이동평균
    pub mid_ma: usize,
    /// 장기 이동평균
    pub long_ma: usize,
    /// 시장 상황 판단용 초장기 이동평균
    pub long_term_ma: usize,
    /// RSI 기간
    pub rsi: usize,
    /// MACD 단기 EMA
    pub macd_fast: usize,
    /// MACD 장기 EMA
    pub macd_slow: usize,
    /// MACD 시그널
    pub macd_signal: usize,
    /// 스토캐스틱 %K 기간
    pub stochastic_k: usize,
    /// 스토캐스틱 %K 평활 기간
    pub stochastic_smooth: usize,
    /// 스토캐스틱 %D 기간
    pub stochastic_d: usize,
    /// 스토캐스틱 RSI의 RSI 기간
    pub stoch_rsi_rsi: usize,
    /// 스토캐스틱 RSI의 스토캐스틱 기간
    pub stoch_rsi_stochastic: usize,
    /// 스토캐스틱 RSI %K 평활 기간
    pub stoch_rsi_smooth: usize,
    /// 스토캐스틱 RSI %D 기간
    pub stoch_rsi_d: usize,
    /// 볼린저 밴드 기간
    pub bollinger_period: usize,
    /// 볼린저 밴드 표준편차 배수
    pub bollinger_multiplier: f64,
    /// ATR 기간
    pub atr: usize,
}

impl Default for IndicatorPeriods {
    fn default() -> Self {
        Self {
            short_ma: 5,
            mid_ma: 20,
            long_ma: 60,
            long_term_ma: 120,
            rsi: 14,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            stochastic_k: 14,
            stochastic_smooth: 3,
            stochastic_d: 3,
            stoch_rsi_rsi: 14,
            stoch_rsi_stochastic: 14,
            stoch_rsi_smooth: 3,
            stoch_rsi_d: 3,
            bollinger_period: 20,
            bollinger_multiplier: 2.0,
            atr: 14,
        }
    }
}

impl IndicatorPeriods {
    /// 기간 설정의 일관성을 검증합니다.
    pub fn validate(&self) -> ScorerResult<()> {
        let periods = [
            ("short_ma", self.short_ma),
            ("mid_ma", self.mid_ma),
            ("long_ma", self.long_ma),
            ("long_term_ma", self.long_term_ma),
            ("rsi", self.rsi),
            ("macd_fast", self.macd_fast),
            ("macd_slow", self.macd_slow),
            ("macd_signal", self.macd_signal),
            ("stochastic_k", self.stochastic_k),
            ("stochastic_smooth", self.stochastic_smooth),
            ("stochastic_d", self.stochastic_d),
            ("stoch_rsi_rsi", self.stoch_rsi_rsi),
            ("stoch_rsi_stochastic", self.stoch_rsi_stochastic),
            ("stoch_rsi_smooth", self.stoch_rsi_smooth),
            ("stoch_rsi_d", self.stoch_rsi_d),
            ("bollinger_period", self.bollinger_period),
            ("atr", self.atr),
        ];

        if let Some((name, _)) = periods.iter().find(|(_, p)| *p == 0) {
            return Err(ScorerError::Config(format!(
                "{}은(는) 0보다 커야 합니다",
                name
            )));
        }

        if !(self.short_ma < self.mid_ma && self.mid_ma < self.long_ma) {
            return Err(ScorerError::Config(format!(
                "이동평균 기간은 단기 < 중기 < 장기여야 합니다: {}/{}/{}",
                self.short_ma, self.mid_ma, self.long_ma
            )));
        }

        if self.macd_fast >= self.macd_slow {
            return Err(ScorerError::Config(format!(
                "MACD 단기 기간({})은 장기 기간({})보다 작아야 합니다",
                self.macd_fast, self.macd_slow
            )));
        }

        if !(self.bollinger_multiplier.is_finite() && self.bollinger_multiplier > 0.0) {
            return Err(ScorerError::Config(format!(
                "볼린저 밴드 배수가 잘못되었습니다: {}",
                self.bollinger_multiplier
            )));
        }

        Ok(())
    }
}

/// 엔진 옵션.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    /// 지표 값 반올림 자릿수 (올림 방식)
    pub precision: u32,
    /// 배치 분석 동시 실행 수
    pub batch_parallelism: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            precision: 4,
            batch_parallelism: 4,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl ScorerConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 환경 변수는 `SCORER__ENGINE__PRECISION=2` 형식으로 파일 값을 덮어씁니다.
    pub fn load<P: AsRef<Path>>(path: P) -> ScorerResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("SCORER")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: ScorerConfig = builder.build()?.try_deserialize()?;
        config.indicators.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> ScorerResult<Self> {
        Self::load("config/default.toml")
    }
}
