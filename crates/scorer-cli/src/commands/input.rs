//! 캔들 입력 파일 로드.
//!
//! 두 가지 JSON 형식을 받습니다.
//!
//! ```json
//! // 1. 캔들 배열 (업비트 캔들 API 응답 그대로)
//! [{ "market": "KRW-BTC", "candle_date_time_utc": "2024-01-01T00:00:00", "trade_price": 100.0, ... }]
//!
//! // 2. 마켓 요청
//! { "market": "KRW-BTC", "koreanName": "비트코인", "candles": [ ... ] }
//! ```

use anyhow::{anyhow, Context, Result};
use scorer_analytics::MarketRequest;
use scorer_core::Candle;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// 파일에서 마켓 요청을 로드합니다.
///
/// 마켓 코드는 `market` 인자 → JSON의 `market` → 첫 캔들의 `market` → 파일명 순으로 정합니다.
pub fn load_request(path: &Path, market: Option<&str>) -> Result<MarketRequest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("입력 파일을 읽을 수 없습니다: {}", path.display()))?;

    let fallback = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("UNKNOWN");

    let request = parse_request(&content, market, fallback)
        .with_context(|| format!("입력 파일 형식 오류: {}", path.display()))?;

    debug!(
        path = %path.display(),
        market = %request.market,
        candles = request.candles.len(),
        "입력 파일 로드"
    );
    Ok(request)
}

/// JSON 문자열을 마켓 요청으로 변환합니다.
pub fn parse_request(content: &str, market: Option<&str>, fallback: &str) -> Result<MarketRequest> {
    let value: Value = serde_json::from_str(content)?;

    let mut request = match value {
        Value::Array(items) => from_candles(serde_json::from_value(Value::Array(items))?, fallback),
        Value::Object(mut object) => {
            let candles = object
                .remove("candles")
                .ok_or_else(|| anyhow!("`candles` 필드가 없습니다"))?;
            if object.contains_key("market") {
                object.insert("candles".to_string(), candles);
                serde_json::from_value(Value::Object(object))?
            } else {
                from_candles(serde_json::from_value(candles)?, fallback)
            }
        }
        _ => return Err(anyhow!("캔들 배열 또는 객체여야 합니다")),
    };

    if let Some(market) = market {
        request.market = market.to_string();
    }
    Ok(request)
}

fn from_candles(candles: Vec<Candle>, fallback: &str) -> MarketRequest {
    let market = candles
        .iter()
        .find_map(|c| c.market.clone())
        .unwrap_or_else(|| fallback.to_string());
    MarketRequest::new(market, candles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANDLES: &str = r#"[
        {
            "market": "KRW-BTC",
            "candle_date_time_utc": "2024-01-02T00:00:00",
            "candle_date_time_kst": "2024-01-02T09:00:00",
            "opening_price": 101.0,
            "high_price": 103.0,
            "low_price": 100.0,
            "trade_price": 102.0,
            "candle_acc_trade_volume": 12.5
        },
        {
            "candle_date_time_utc": "2024-01-01T00:00:00",
            "open": 100.0,
            "high": 101.0,
            "low": 99.0,
            "close": 101.0
        }
    ]"#;

    #[test]
    fn test_parse_candle_array() {
        let request = parse_request(CANDLES, None, "fallback").unwrap();

        assert_eq!(request.market, "KRW-BTC");
        assert_eq!(request.candles.len(), 2);
        assert_eq!(request.candles[0].close, 102.0);
        assert_eq!(request.candles[1].volume, 0.0);
    }

    #[test]
    fn test_market_override_wins() {
        let request = parse_request(CANDLES, Some("KRW-ETH"), "fallback").unwrap();
        assert_eq!(request.market, "KRW-ETH");
    }

    #[test]
    fn test_parse_request_object() {
        let content = format!(
            r#"{{ "market": "KRW-XRP", "koreanName": "리플", "candles": {} }}"#,
            CANDLES
        );
        let request = parse_request(&content, None, "fallback").unwrap();

        assert_eq!(request.market, "KRW-XRP");
        assert_eq!(request.korean_name.as_deref(), Some("리플"));
        assert_eq!(request.candles.len(), 2);
    }

    #[test]
    fn test_object_without_market_uses_fallback() {
        let content = r#"{ "candles": [{
            "candle_date_time_utc": "2024-01-01T00:00:00",
            "open": 1.0, "high": 1.0, "low": 1.0, "close": 1.0
        }] }"#;
        let request = parse_request(content, None, "KRW-DOGE").unwrap();
        assert_eq!(request.market, "KRW-DOGE");
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(parse_request("42", None, "x").is_err());
        assert!(parse_request(r#"{ "market": "KRW-BTC" }"#, None, "x").is_err());
        assert!(parse_request("{not json", None, "x").is_err());
    }
}
