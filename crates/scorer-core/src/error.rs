//! 점수 엔진의 에러 타입.
//!
//! 입력 계약 위반과 설정/직렬화 실패를 표현합니다. 데이터 부족은 에러가 아니라
//! `None`(사용 불가)으로 처리되므로 여기에는 포함되지 않습니다.

use thiserror::Error;

/// 핵심 점수 엔진 에러.
#[derive(Debug, Error)]
pub enum ScorerError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 길이가 맞지 않는 시계열
    #[error("시계열 길이 불일치: {series} 길이 {actual}, 기대 {expected}")]
    MisalignedSeries {
        series: &'static str,
        expected: usize,
        actual: usize,
    },

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 점수 엔진 작업을 위한 Result 타입.
pub type ScorerResult<T> = Result<T, ScorerError>;

impl ScorerError {
    /// 호출자의 입력 정렬/형식 문제로 발생한 에러인지 확인합니다.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            ScorerError::MisalignedSeries { .. } | ScorerError::InvalidInput(_)
        )
    }
}

impl From<serde_json::Error> for ScorerError {
    fn from(err: serde_json::Error) -> Self {
        ScorerError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for ScorerError {
    fn from(err: config::ConfigError) -> Self {
        ScorerError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contract_violation() {
        let err = ScorerError::MisalignedSeries {
            series: "high",
            expected: 10,
            actual: 9,
        };
        assert!(err.is_contract_violation());

        let config_err = ScorerError::Config("missing".to_string());
        assert!(!config_err.is_contract_violation());
    }

    #[test]
    fn test_misaligned_message() {
        let err = ScorerError::MisalignedSeries {
            series: "low",
            expected: 3,
            actual: 2,
        };
        assert!(err.to_string().contains("low"));
    }

    #[test]
    fn test_from_serde_error() {
        let parse: Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: ScorerError = parse.unwrap_err().into();
        assert!(matches!(err, ScorerError::Serialization(_)));
    }
}
