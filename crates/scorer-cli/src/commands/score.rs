//! 단일 마켓 점수 계산 명령어.
//!
//! # 사용 예시
//!
//! ```bash
//! # 업비트 일봉 응답 파일로 점수 계산
//! scorer score -i data/KRW-BTC.json
//!
//! # 마켓 코드 지정, 사람이 읽기 쉬운 JSON 출력
//! scorer score -i candles.json -m KRW-ETH --pretty
//! ```

use anyhow::Result;
use scorer_analytics::CompositeScorer;
use scorer_core::{MarketAnalysis, ScorerConfig};
use std::path::Path;
use tracing::info;

use super::input::load_request;

/// 입력 파일 하나로 마켓 분석 레코드를 생성합니다.
pub fn run_score(config: &ScorerConfig, input: &Path, market: Option<&str>) -> Result<MarketAnalysis> {
    let request = load_request(input, market)?;
    info!(
        market = %request.market,
        candles = request.candles.len(),
        "점수 계산 시작"
    );

    let scorer = CompositeScorer::from_config(config);
    let analysis = scorer
        .analyze_candles(&request.market, &request.candles)?
        .with_names(request.korean_name, request.english_name);

    Ok(analysis)
}
