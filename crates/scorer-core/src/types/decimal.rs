//! 지표 값 반올림 유틸리티.
//!
//! 지표 값은 소수점 자릿수 기준 올림(+∞ 방향)으로 정리합니다. 하위 임계값
//! 비교가 이 방향성에 의존하므로 반올림(half-up)으로 바꾸면 안 됩니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// 가격 타입.
pub type Price = f64;

/// 지정된 소수점 자릿수로 올림합니다.
///
/// f64를 가장 짧은 10진 표현 문자열로 변환한 뒤 `Decimal`로 올림하므로
/// `0.1`처럼 2진 표현 오차가 있는 값도 `0.11`로 밀려 올라가지 않습니다.
/// `Decimal`로 표현할 수 없는 값(비유한수, 28자리 초과)은 그대로 반환합니다.
pub fn round_ceil(value: f64, dp: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    match value.to_string().parse::<Decimal>() {
        Ok(decimal) => decimal
            .round_dp_with_strategy(dp, RoundingStrategy::ToPositiveInfinity)
            .to_f64()
            .unwrap_or(value),
        Err(_) => value,
    }
}

/// 값을 [0, 100] 점수 범위로 제한합니다. NaN은 중립값 50으로 처리합니다.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        return 50.0;
    }
    value.clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_round_ceil_positive() {
        assert!(approx(round_ceil(1.231, 2), 1.24));
        assert!(approx(round_ceil(29.9901, 2), 30.0));
    }

    #[test]
    fn test_round_ceil_negative_goes_toward_zero() {
        assert!(approx(round_ceil(-1.239, 2), -1.23));
    }

    #[test]
    fn test_round_ceil_keeps_exact_values() {
        assert!(approx(round_ceil(0.1, 2), 0.1));
        assert!(approx(round_ceil(50.0, 4), 50.0));
    }

    #[test]
    fn test_round_ceil_matches_decimal_ceiling() {
        let rounded: Decimal = round_ceil(63.456_01, 3).to_string().parse().unwrap();
        assert_eq!(rounded, dec!(63.457));

        let rounded: Decimal = round_ceil(12.3400, 4).to_string().parse().unwrap();
        assert_eq!(rounded, dec!(12.34));
    }

    #[test]
    fn test_round_ceil_non_finite() {
        assert!(round_ceil(f64::NAN, 2).is_nan());
        assert_eq!(round_ceil(f64::INFINITY, 2), f64::INFINITY);
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(120.0), 100.0);
        assert_eq!(clamp_score(-3.0), 0.0);
        assert_eq!(clamp_score(f64::NAN), 50.0);
    }
}
