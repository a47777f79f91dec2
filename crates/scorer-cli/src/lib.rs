//! 점수 엔진 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 캔들 파일 로드 (캔들 배열 또는 마켓 요청 JSON)
//! - 단일 마켓 점수 계산
//! - 여러 마켓 일괄 분석

pub mod commands;
