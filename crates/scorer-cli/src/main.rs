//! 시장 점수 엔진 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 비트코인 일봉으로 종합 점수 계산
//! scorer score -i data/KRW-BTC.json
//!
//! # 설정 파일 지정, 결과를 파일로 저장
//! scorer -c config/default.toml score -i data/KRW-ETH.json -o result.json
//!
//! # 여러 마켓 일괄 분석
//! scorer batch data/KRW-BTC.json data/KRW-ETH.json -p 4 --pretty
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use scorer_cli::commands::batch::{run_batch, BatchCliConfig};
use scorer_cli::commands::score::run_score;
use scorer_core::{init_logging, init_logging_from_env, LogConfig, ScorerConfig};

#[derive(Parser)]
#[command(name = "scorer")]
#[command(about = "Market scorer CLI - 기술적 지표 기반 종합 점수 계산", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (없으면 기본값 사용)
    #[arg(short, long, global = true, default_value = "config/default.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 단일 마켓 종합 점수 계산
    Score {
        /// 캔들 JSON 파일
        #[arg(short, long)]
        input: PathBuf,

        /// 마켓 코드 (예: KRW-BTC, 지정하지 않으면 파일에서 추출)
        #[arg(short, long)]
        market: Option<String>,

        /// 결과 저장 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 들여쓰기된 JSON 출력
        #[arg(long, default_value = "false")]
        pretty: bool,
    },

    /// 여러 마켓 일괄 분석
    Batch {
        /// 캔들 JSON 파일 목록
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// 동시 실행 수 (기본: 설정 파일의 engine.batch_parallelism)
        #[arg(short, long)]
        parallelism: Option<usize>,

        /// 결과 저장 경로 (지정하지 않으면 stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 들여쓰기된 JSON 출력
        #[arg(long, default_value = "false")]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env 파일이 없어도 무시
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = ScorerConfig::load(&cli.config)
        .with_context(|| format!("설정 로드 실패: {}", cli.config.display()))?;

    // LOG_FORMAT이 지정되면 환경 변수 설정 우선
    let logging = if std::env::var("LOG_FORMAT").is_ok() {
        init_logging_from_env()
    } else {
        init_logging(LogConfig::from_settings(&config.logging))
    };
    logging.map_err(|e| anyhow!("로깅 초기화 실패: {}", e))?;

    match cli.command {
        Commands::Score {
            input,
            market,
            output,
            pretty,
        } => match run_score(&config, &input, market.as_deref()) {
            Ok(analysis) => {
                info!(
                    market = %analysis.market,
                    final_score = analysis.result.final_score,
                    "점수 계산 완료"
                );
                write_json(&analysis, output.as_deref(), pretty)?;
            }
            Err(e) => {
                error!("Score failed: {:#}", e);
                return Err(e);
            }
        },

        Commands::Batch {
            inputs,
            parallelism,
            output,
            pretty,
        } => {
            let cli_config = BatchCliConfig {
                inputs,
                parallelism,
            };
            match run_batch(&config, cli_config).await {
                Ok(outcomes) => write_json(&outcomes, output.as_deref(), pretty)?,
                Err(e) => {
                    error!("Batch failed: {:#}", e);
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}

/// 결과를 JSON으로 출력합니다.
fn write_json<T: Serialize>(value: &T, output: Option<&Path>, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };

    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("결과 저장 실패: {}", path.display()))?;
            info!(path = %path.display(), "결과 저장 완료");
        }
        None => println!("{}", json),
    }

    Ok(())
}
