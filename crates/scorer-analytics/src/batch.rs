//! 여러 마켓 일괄 분석.
//!
//! 점수 계산은 CPU 작업이므로 각 마켓을 `spawn_blocking`으로 blocking thread
//! pool에서 실행하고, `buffer_unordered`로 동시 실행 수를 제한합니다.
//! 한 마켓의 실패는 결과에 기록될 뿐 나머지 마켓에는 영향을 주지 않습니다.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use scorer_core::{Candle, MarketAnalysis};
use serde::{Deserialize, Serialize};
use tracing::{info, warn, Instrument};

use crate::composite::CompositeScorer;

/// 단일 마켓 분석 요청.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketRequest {
    pub market: String,
    #[serde(default)]
    pub korean_name: Option<String>,
    #[serde(default)]
    pub english_name: Option<String>,
    pub candles: Vec<Candle>,
}

impl MarketRequest {
    pub fn new(market: impl Into<String>, candles: Vec<Candle>) -> Self {
        Self {
            market: market.into(),
            korean_name: None,
            english_name: None,
            candles,
        }
    }
}

/// 단일 마켓 분석 결과.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketOutcome {
    pub market: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<MarketAnalysis>,
    pub execution_time_ms: u64,
}

/// 여러 마켓을 병렬로 분석합니다.
///
/// 결과는 요청 순서대로 반환됩니다. `parallelism`이 0이면 1로 처리합니다.
pub async fn analyze_markets(
    scorer: Arc<CompositeScorer>,
    requests: Vec<MarketRequest>,
    parallelism: usize,
) -> Vec<MarketOutcome> {
    let total = requests.len();
    let started = Instant::now();

    let tasks = requests.into_iter().enumerate().map(|(index, request)| {
        let scorer = Arc::clone(&scorer);
        let span = scorer_core::market_span!("analyze_market", request.market, request.candles.len());
        async move { (index, analyze_one(scorer, request).await) }.instrument(span)
    });

    let mut outcomes: Vec<(usize, MarketOutcome)> = stream::iter(tasks)
        .buffer_unordered(parallelism.max(1))
        .collect()
        .await;
    outcomes.sort_by_key(|(index, _)| *index);

    let successful = outcomes.iter().filter(|(_, o)| o.success).count();
    info!(
        total,
        successful,
        failed = total - successful,
        total_time_ms = started.elapsed().as_millis() as u64,
        "일괄 분석 완료"
    );

    outcomes.into_iter().map(|(_, outcome)| outcome).collect()
}

async fn analyze_one(scorer: Arc<CompositeScorer>, request: MarketRequest) -> MarketOutcome {
    let started = Instant::now();
    let market = request.market.clone();

    // CPU 작업을 blocking thread pool에서 실행
    let result = tokio::task::spawn_blocking(move || {
        scorer
            .analyze_candles(&request.market, &request.candles)
            .map(|analysis| analysis.with_names(request.korean_name, request.english_name))
    })
    .await;

    let execution_time_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(Ok(analysis)) => MarketOutcome {
            market,
            success: true,
            error: None,
            analysis: Some(analysis),
            execution_time_ms,
        },
        Ok(Err(e)) => {
            warn!(error = %e, "마켓 분석 실패");
            MarketOutcome {
                market,
                success: false,
                error: Some(e.to_string()),
                analysis: None,
                execution_time_ms,
            }
        }
        Err(e) => {
            warn!(error = %e, "분석 태스크 실행 실패");
            MarketOutcome {
                market,
                success: false,
                error: Some(format!("분석 태스크 실행 실패: {}", e)),
                analysis: None,
                execution_time_ms,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn candles(closes: &[f64]) -> Vec<Candle> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                market: None,
                candle_date_time_utc: start + Duration::days(i as i64),
                candle_date_time_kst: None,
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000.0,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_results_keep_request_order() {
        let scorer = Arc::new(CompositeScorer::new());
        let rising: Vec<f64> = (0..150).map(|i| 100.0 + i as f64).collect();
        let requests = vec![
            MarketRequest::new("KRW-BTC", candles(&rising)),
            MarketRequest::new("KRW-ETH", candles(&[100.0; 150])),
            MarketRequest::new("KRW-XRP", Vec::new()),
        ];

        let outcomes = analyze_markets(scorer, requests, 2).await;

        let markets: Vec<&str> = outcomes.iter().map(|o| o.market.as_str()).collect();
        assert_eq!(markets, vec!["KRW-BTC", "KRW-ETH", "KRW-XRP"]);
        assert!(outcomes.iter().all(|o| o.success));

        let empty = outcomes[2].analysis.as_ref().unwrap();
        assert_eq!(empty.result.final_score, 0.0);
        assert!(empty.last_candle_date_time_utc.is_none());
    }

    #[tokio::test]
    async fn test_zero_parallelism_still_runs() {
        let scorer = Arc::new(CompositeScorer::new());
        let requests = vec![MarketRequest::new("KRW-BTC", candles(&[100.0; 30]))];

        let outcomes = analyze_markets(scorer, requests, 0).await;
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].success);
    }
}
