//! 캔들 및 OHLC 시계열.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{ScorerError, ScorerResult};
use crate::types::Price;

/// 단일 캔들.
///
/// 업비트 캔들 API의 필드명(`opening_price`, `trade_price` 등)도 그대로
/// 역직렬화할 수 있습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 마켓 코드 (예: KRW-BTC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    /// 캔들 기준 시각 (UTC)
    pub candle_date_time_utc: NaiveDateTime,
    /// 캔들 기준 시각 (KST)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candle_date_time_kst: Option<NaiveDateTime>,
    /// 시가
    #[serde(alias = "opening_price")]
    pub open: Price,
    /// 고가
    #[serde(alias = "high_price")]
    pub high: Price,
    /// 저가
    #[serde(alias = "low_price")]
    pub low: Price,
    /// 종가
    #[serde(alias = "trade_price")]
    pub close: Price,
    /// 누적 거래량
    #[serde(default, alias = "candle_acc_trade_volume")]
    pub volume: f64,
}

/// 시간 오름차순으로 정렬된 OHLC 시계열.
///
/// 네 배열의 길이는 항상 같고, 인덱스 i는 네 배열 모두에서 같은 캔들을 가리킵니다.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OhlcSeries {
    open: Vec<Price>,
    high: Vec<Price>,
    low: Vec<Price>,
    close: Vec<Price>,
}

impl OhlcSeries {
    /// 네 배열로 시계열을 생성합니다.
    ///
    /// # 에러
    ///
    /// 배열 길이가 종가 배열과 다르면 `MisalignedSeries`.
    pub fn new(
        open: Vec<Price>,
        high: Vec<Price>,
        low: Vec<Price>,
        close: Vec<Price>,
    ) -> ScorerResult<Self> {
        let expected = close.len();
        for (series, actual) in [("open", open.len()), ("high", high.len()), ("low", low.len())] {
            if actual != expected {
                return Err(ScorerError::MisalignedSeries {
                    series,
                    expected,
                    actual,
                });
            }
        }

        Ok(Self {
            open,
            high,
            low,
            close,
        })
    }

    /// 캔들 목록으로 시계열을 생성합니다.
    ///
    /// 업비트는 최신 캔들부터 반환하므로 UTC 시각 기준 오름차순으로 정렬합니다.
    pub fn from_candles(candles: &[Candle]) -> Self {
        let mut sorted: Vec<&Candle> = candles.iter().collect();
        sorted.sort_by_key(|c| c.candle_date_time_utc);

        Self {
            open: sorted.iter().map(|c| c.open).collect(),
            high: sorted.iter().map(|c| c.high).collect(),
            low: sorted.iter().map(|c| c.low).collect(),
            close: sorted.iter().map(|c| c.close).collect(),
        }
    }

    /// 종가만으로 시계열을 생성합니다 (시가=고가=저가=종가).
    pub fn from_closes(closes: Vec<Price>) -> Self {
        Self {
            open: closes.clone(),
            high: closes.clone(),
            low: closes.clone(),
            close: closes,
        }
    }

    pub fn open(&self) -> &[Price] {
        &self.open
    }

    pub fn high(&self) -> &[Price] {
        &self.high
    }

    pub fn low(&self) -> &[Price] {
        &self.low
    }

    pub fn close(&self) -> &[Price] {
        &self.close
    }

    /// 캔들 수.
    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    /// 가장 최근 종가.
    pub fn last_close(&self) -> Option<Price> {
        self.close.last().copied()
    }
}
