//! 지표 식별자, 개별 점수, 가중치 벡터.
//!
//! 지표별 값은 문자열 키가 아닌 고정 필드로 보관하고, 순회가 필요할 때는
//! [`IndicatorKind::ALL`] 배열을 사용합니다.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 점수에 참여하는 여섯 가지 지표.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndicatorKind {
    /// 이동평균
    Ma,
    /// 상대강도지수
    Rsi,
    /// MACD
    Macd,
    /// 스토캐스틱
    Stochastic,
    /// 스토캐스틱 RSI
    StochasticRsi,
    /// 볼린저 밴드
    BollingerBand,
}

impl IndicatorKind {
    /// 모든 지표 (고정 순서).
    pub const ALL: [IndicatorKind; 6] = [
        IndicatorKind::Ma,
        IndicatorKind::Rsi,
        IndicatorKind::Macd,
        IndicatorKind::Stochastic,
        IndicatorKind::StochasticRsi,
        IndicatorKind::BollingerBand,
    ];

    /// JSON 키와 동일한 이름.
    pub fn key(self) -> &'static str {
        match self {
            Self::Ma => "ma",
            Self::Rsi => "rsi",
            Self::Macd => "macd",
            Self::Stochastic => "stochastic",
            Self::StochasticRsi => "stochasticRsi",
            Self::BollingerBand => "bollingerBand",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// 지표별 점수 (0~100, 계산 불가 시 `None`).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreComponents {
    pub ma: Option<f64>,
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub stochastic: Option<f64>,
    pub stochastic_rsi: Option<f64>,
    pub bollinger_band: Option<f64>,
}

impl ScoreComponents {
    /// 지표 점수 조회.
    pub fn get(&self, kind: IndicatorKind) -> Option<f64> {
        match kind {
            IndicatorKind::Ma => self.ma,
            IndicatorKind::Rsi => self.rsi,
            IndicatorKind::Macd => self.macd,
            IndicatorKind::Stochastic => self.stochastic,
            IndicatorKind::StochasticRsi => self.stochastic_rsi,
            IndicatorKind::BollingerBand => self.bollinger_band,
        }
    }

    /// 지표 점수 설정.
    pub fn set(&mut self, kind: IndicatorKind, score: Option<f64>) {
        let slot = match kind {
            IndicatorKind::Ma => &mut self.ma,
            IndicatorKind::Rsi => &mut self.rsi,
            IndicatorKind::Macd => &mut self.macd,
            IndicatorKind::Stochastic => &mut self.stochastic,
            IndicatorKind::StochasticRsi => &mut self.stochastic_rsi,
            IndicatorKind::BollingerBand => &mut self.bollinger_band,
        };
        *slot = score;
    }

    /// (지표, 점수) 쌍.
    pub fn entries(&self) -> [(IndicatorKind, Option<f64>); 6] {
        IndicatorKind::ALL.map(|kind| (kind, self.get(kind)))
    }

    /// 유한한 점수를 가진 지표 목록.
    pub fn available(&self) -> Vec<IndicatorKind> {
        self.entries()
            .into_iter()
            .filter(|(_, score)| score.is_some_and(f64::is_finite))
            .map(|(kind, _)| kind)
            .collect()
    }
}

/// 지표별 가중치.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightVector {
    pub ma: f64,
    pub rsi: f64,
    pub macd: f64,
    pub stochastic: f64,
    pub stochastic_rsi: f64,
    pub bollinger_band: f64,
}

impl WeightVector {
    /// 가중치 벡터 생성 (ma, rsi, macd, stochastic, stochasticRsi, bollingerBand 순서).
    pub const fn new(
        ma: f64,
        rsi: f64,
        macd: f64,
        stochastic: f64,
        stochastic_rsi: f64,
        bollinger_band: f64,
    ) -> Self {
        Self {
            ma,
            rsi,
            macd,
            stochastic,
            stochastic_rsi,
            bollinger_band,
        }
    }

    /// 지표 가중치 조회.
    pub fn get(&self, kind: IndicatorKind) -> f64 {
        match kind {
            IndicatorKind::Ma => self.ma,
            IndicatorKind::Rsi => self.rsi,
            IndicatorKind::Macd => self.macd,
            IndicatorKind::Stochastic => self.stochastic,
            IndicatorKind::StochasticRsi => self.stochastic_rsi,
            IndicatorKind::BollingerBand => self.bollinger_band,
        }
    }

    fn set(&mut self, kind: IndicatorKind, weight: f64) {
        match kind {
            IndicatorKind::Ma => self.ma = weight,
            IndicatorKind::Rsi => self.rsi = weight,
            IndicatorKind::Macd => self.macd = weight,
            IndicatorKind::Stochastic => self.stochastic = weight,
            IndicatorKind::StochasticRsi => self.stochastic_rsi = weight,
            IndicatorKind::BollingerBand => self.bollinger_band = weight,
        }
    }

    /// 가중치 합계.
    pub fn sum(&self) -> f64 {
        IndicatorKind::ALL.iter().map(|&k| self.get(k)).sum()
    }

    /// 주어진 지표에만 동일 가중치를 부여합니다.
    pub fn equal(available: &[IndicatorKind]) -> Self {
        let mut weights = Self::default();
        if available.is_empty() {
            return weights;
        }
        let share = 1.0 / available.len() as f64;
        for &kind in available {
            weights.set(kind, share);
        }
        weights
    }

    /// 사용 가능한 지표로 거르고 합이 1이 되도록 재정규화합니다.
    ///
    /// 사용 가능한 지표의 가중치 합이 0이거나 유한하지 않으면 동일 가중치를 사용합니다.
    pub fn renormalized(&self, available: &[IndicatorKind]) -> Self {
        let total: f64 = available.iter().map(|&k| self.get(k)).sum();
        if !total.is_finite() || total <= 0.0 {
            return Self::equal(available);
        }

        let mut weights = Self::default();
        for &kind in available {
            weights.set(kind, self.get(kind) / total);
        }
        weights
    }
}
