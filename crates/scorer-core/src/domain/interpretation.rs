//! 최종 점수 해석.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 점수 구간별 매매 신호.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalKind {
    StrongBuy,
    Buy,
    WeakBuy,
    Hold,
    WeakSell,
    Sell,
    StrongSell,
}

impl SignalKind {
    /// 최종 점수로 신호를 결정합니다. 경계값: 90, 70, 60, 40, 30, 10.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Self::StrongBuy,
            s if s >= 70.0 => Self::Buy,
            s if s >= 60.0 => Self::WeakBuy,
            s if s >= 40.0 => Self::Hold,
            s if s >= 30.0 => Self::WeakSell,
            s if s >= 10.0 => Self::Sell,
            _ => Self::StrongSell,
        }
    }

    /// 영문 표기
    pub fn english(self) -> &'static str {
        match self {
            Self::StrongBuy => "Strong Buy",
            Self::Buy => "Buy",
            Self::WeakBuy => "Weak Buy",
            Self::Hold => "Hold",
            Self::WeakSell => "Weak Sell",
            Self::Sell => "Sell",
            Self::StrongSell => "Strong Sell",
        }
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.english())
    }
}

/// 사람이 읽을 수 있는 점수 해석.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interpretation {
    pub kind: SignalKind,
    pub signal: String,
    pub strength: String,
    pub recommendation: String,
}

impl Interpretation {
    /// 최종 점수에 대한 해석 (순수 조회 테이블).
    pub fn from_score(score: f64) -> Self {
        let kind = SignalKind::from_score(score);
        let (signal, strength, recommendation) = match kind {
            SignalKind::StrongBuy => ("강한 매수", "매우 강함", "적극적인 매수 고려"),
            SignalKind::Buy => ("매수", "강함", "매수 고려"),
            SignalKind::WeakBuy => ("약한 매수", "보통", "분할 매수 고려"),
            SignalKind::Hold => ("중립", "약함", "관망"),
            SignalKind::WeakSell => ("약한 매도", "보통", "분할 매도 고려"),
            SignalKind::Sell => ("매도", "강함", "매도 고려"),
            SignalKind::StrongSell => ("강한 매도", "매우 강함", "적극적인 매도 고려"),
        };

        Self {
            kind,
            signal: signal.to_string(),
            strength: strength.to_string(),
            recommendation: recommendation.to_string(),
        }
    }
}
