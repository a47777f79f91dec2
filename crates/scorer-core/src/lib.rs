//! # Scorer Core
//!
//! 시장 점수 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 점수 엔진 전반에서 사용되는 기본 타입을 제공합니다:
//! - 캔들 및 OHLC 시계열
//! - 지표 식별자, 개별 점수, 가중치 벡터
//! - 시장 상황 분류 및 점수 해석
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
