//! 여러 마켓 일괄 분석 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! # 디렉토리의 캔들 파일 전체를 8개씩 병렬 분석
//! scorer batch data/*.json -p 8
//! ```

use anyhow::Result;
use scorer_analytics::{analyze_markets, CompositeScorer, MarketOutcome};
use scorer_core::ScorerConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use super::input::load_request;

/// 일괄 분석 CLI 설정
#[derive(Debug, Clone)]
pub struct BatchCliConfig {
    /// 입력 파일 목록
    pub inputs: Vec<PathBuf>,
    /// 동시 실행 수 (지정하지 않으면 설정 파일 값)
    pub parallelism: Option<usize>,
}

/// 입력 파일들을 로드해 일괄 분석합니다.
///
/// 파일 로드 실패는 즉시 에러로 반환하고, 분석 실패는 해당 마켓의 결과에만 기록됩니다.
pub async fn run_batch(config: &ScorerConfig, cli: BatchCliConfig) -> Result<Vec<MarketOutcome>> {
    let requests = cli
        .inputs
        .iter()
        .map(|path| load_request(path, None))
        .collect::<Result<Vec<_>>>()?;

    let parallelism = cli
        .parallelism
        .unwrap_or(config.engine.batch_parallelism);
    info!(markets = requests.len(), parallelism, "일괄 분석 시작");

    let scorer = Arc::new(CompositeScorer::from_config(config));
    Ok(analyze_markets(scorer, requests, parallelism).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLAT: &str = r#"{ "market": "KRW-ETH", "candles": [
        { "candle_date_time_utc": "2024-01-01T00:00:00", "open": 10.0, "high": 10.0, "low": 10.0, "close": 10.0 },
        { "candle_date_time_utc": "2024-01-02T00:00:00", "open": 10.0, "high": 10.0, "low": 10.0, "close": 10.0 }
    ] }"#;

    #[tokio::test]
    async fn test_run_batch_keeps_input_order() {
        let dir = std::env::temp_dir();
        let first = dir.join(format!("scorer-cli-batch-a-{}.json", std::process::id()));
        let second = dir.join(format!("scorer-cli-batch-b-{}.json", std::process::id()));
        std::fs::write(&first, FLAT).unwrap();
        std::fs::write(&second, FLAT.replace("KRW-ETH", "KRW-SOL")).unwrap();

        let outcomes = run_batch(
            &ScorerConfig::default(),
            BatchCliConfig {
                inputs: vec![first.clone(), second.clone()],
                parallelism: Some(2),
            },
        )
        .await
        .unwrap();
        std::fs::remove_file(&first).ok();
        std::fs::remove_file(&second).ok();

        let markets: Vec<&str> = outcomes.iter().map(|o| o.market.as_str()).collect();
        assert_eq!(markets, vec!["KRW-ETH", "KRW-SOL"]);
        assert!(outcomes.iter().all(|o| o.success));
    }

    #[tokio::test]
    async fn test_unreadable_input_fails_fast() {
        let result = run_batch(
            &ScorerConfig::default(),
            BatchCliConfig {
                inputs: vec![PathBuf::from("/nonexistent/scorer-cli/a.json")],
                parallelism: None,
            },
        )
        .await;
        assert!(result.is_err());
    }
}
