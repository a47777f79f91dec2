//! CLI 명령어 구현 모듈.

pub mod batch;
pub mod input;
pub mod score;
