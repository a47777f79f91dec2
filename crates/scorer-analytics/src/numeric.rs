//! 수치 헬퍼.
//!
//! 기울기(선형회귀), 교차 감지, 변동성, 국소 극값 탐지를 제공합니다.
//! 모두 상태가 없는 순수 함수이며, 퇴화된 입력(길이 부족, 분산 0)에는
//! 에러 대신 0을 반환합니다. 유일한 에러는 [`detect_cross`]의 길이 불일치입니다.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 수치 헬퍼 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumericError {
    /// 교차 감지 대상 시계열의 길이가 다름 (호출자 버그)
    #[error("시계열 길이 불일치: {left} != {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// 극값 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtremaKind {
    /// 고점
    High,
    /// 저점
    Low,
}

/// 국소 극값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtremaPoint {
    /// 시계열 내 인덱스
    pub index: usize,
    /// 값
    pub value: f64,
    /// 이웃 평균 대비 정규화된 이탈 강도
    pub strength: f64,
    /// 직전 채택 극값 이후 경과 캔들 수 (첫 극값은 0)
    pub duration: Option<usize>,
}

/// 극값 탐지 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtremaParams {
    /// 직전 채택 극값과의 최소 값 차이 (0.5σ와 비교해 큰 쪽 사용)
    pub threshold: f64,
    /// 좌우 비교 이웃 수
    pub window: usize,
    /// 직전 채택 극값과의 최소 캔들 간격
    pub min_duration: usize,
    /// true면 최신 극값부터 반환
    pub reversed: bool,
}

impl Default for ExtremaParams {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            window: 2,
            min_duration: 3,
            reversed: false,
        }
    }
}

/// 최소제곱 선형회귀 기울기 (x = 인덱스).
///
/// 길이 2 미만, 분모 0, 비유한 결과는 모두 0을 반환합니다.
pub fn slope(series: &[f64]) -> f64 {
    let n = series.len();
    if n < 2 {
        return 0.0;
    }

    let n_f = n as f64;
    let x_mean = (n_f - 1.0) / 2.0;
    let y_mean = series.iter().sum::<f64>() / n_f;

    let mut numerator = 0.0;
    let mut denominator = 0.0;
    for (i, &y) in series.iter().enumerate() {
        let x_diff = i as f64 - x_mean;
        numerator += x_diff * (y - y_mean);
        denominator += x_diff * x_diff;
    }

    if denominator == 0.0 {
        return 0.0;
    }

    let result = numerator / denominator;
    if result.is_finite() {
        result
    } else {
        0.0
    }
}

/// 마지막 값 대비 퍼센트 기울기 (캔들당 %).
///
/// 가격 단위가 다른 마켓에서도 같은 임계값을 쓰기 위해 사용합니다.
pub fn slope_pct(series: &[f64]) -> f64 {
    match series.last() {
        Some(&last) if last != 0.0 && last.is_finite() => {
            let pct = slope(series) / last.abs() * 100.0;
            if pct.is_finite() {
                pct
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

/// 두 시계열의 교차 감지.
///
/// 0번 원소는 항상 0, 이후 상향 돌파 +1, 하향 돌파 -1, 그 외 0.
///
/// # 에러
///
/// 길이가 다르면 `LengthMismatch` (잘라내지 않음).
pub fn detect_cross(a: &[f64], b: &[f64]) -> Result<Vec<i8>, NumericError> {
    if a.len() != b.len() {
        return Err(NumericError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mut crosses = vec![0i8; a.len()];
    for i in 1..a.len() {
        if a[i - 1] <= b[i - 1] && a[i] > b[i] {
            crosses[i] = 1;
        } else if a[i - 1] >= b[i - 1] && a[i] < b[i] {
            crosses[i] = -1;
        }
    }

    Ok(crosses)
}

/// 가장 최근 교차와 경과 캔들 수.
///
/// `lookback` 캔들 이내 교차가 없으면 `None`.
pub fn last_cross(crosses: &[i8], lookback: usize) -> Option<(i8, usize)> {
    crosses
        .iter()
        .rev()
        .take(lookback)
        .enumerate()
        .find(|(_, &c)| c != 0)
        .map(|(days, &c)| (c, days))
}

/// 평균 절대 변화량 변동성.
pub fn mean_absolute_change_volatility(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }

    let total: f64 = series.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    total / (series.len() - 1) as f64
}

/// 모표준편차 변동성.
pub fn statistical_volatility(series: &[f64]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }

    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let variance = series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// 산술 평균. 빈 시계열은 0.
pub fn mean(series: &[f64]) -> f64 {
    if series.is_empty() {
        return 0.0;
    }
    series.iter().sum::<f64>() / series.len() as f64
}

/// 국소 극값 탐지.
///
/// 인덱스 i(window <= i < len - window)의 값이 좌우 `window`개 이웃 모두보다
/// 엄격히 크면(High) 또는 작으면(Low) 후보가 됩니다. 후보는 직전 채택 극값과의
/// 차이가 `max(threshold, 0.5σ)`를 넘고 간격이 `min_duration` 이상일 때만
/// 채택됩니다 (첫 후보는 항상 채택).
pub fn find_local_extrema(
    series: &[f64],
    kind: ExtremaKind,
    params: ExtremaParams,
) -> Vec<ExtremaPoint> {
    let window = params.window.max(1);
    let len = series.len();
    if len < 2 * window + 1 {
        return Vec::new();
    }

    let std_dev = statistical_volatility(series);
    let min_change = params.threshold.max(0.5 * std_dev);

    let mut points: Vec<ExtremaPoint> = Vec::new();

    for i in window..len - window {
        let value = series[i];
        let neighbours = series[i - window..i]
            .iter()
            .chain(series[i + 1..=i + window].iter());

        let qualifies = match kind {
            ExtremaKind::High => neighbours.clone().all(|&n| value > n),
            ExtremaKind::Low => neighbours.clone().all(|&n| value < n),
        };
        if !qualifies {
            continue;
        }

        let duration = match points.last() {
            None => 0,
            Some(last) => {
                let gap = i - last.index;
                if (value - last.value).abs() <= min_change || gap < params.min_duration {
                    continue;
                }
                gap
            }
        };

        let neighbour_mean = neighbours.sum::<f64>() / (2 * window) as f64;
        let deviation = (value - neighbour_mean).abs();
        let pct_deviation = if neighbour_mean != 0.0 {
            deviation / neighbour_mean.abs() * 100.0
        } else {
            0.0
        };
        let strength = if std_dev > 0.0 {
            deviation / std_dev * (1.0 + pct_deviation / 100.0)
        } else {
            0.0
        };

        points.push(ExtremaPoint {
            index: i,
            value,
            strength,
            duration: Some(duration),
        });
    }

    if params.reversed {
        points.reverse();
    }

    points
}

/// 정의된 값만 남긴 마지막 `n`개.
pub fn defined_tail(series: &[Option<f64>], n: usize) -> Vec<f64> {
    let defined: Vec<f64> = series.iter().flatten().copied().collect();
    let start = defined.len().saturating_sub(n);
    defined[start..].to_vec()
}

/// 두 시계열이 모두 정의된 인덱스만 끝에서부터 맞춰 마지막 `n`개를 반환합니다.
///
/// 길이가 다른 입력은 마지막 캔들을 기준으로 정렬합니다. 반환되는 두 벡터의
/// 길이는 항상 같습니다.
pub fn aligned_tail(a: &[Option<f64>], b: &[Option<f64>], n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut left = Vec::new();
    let mut right = Vec::new();

    for (x, y) in a.iter().rev().zip(b.iter().rev()) {
        if left.len() == n {
            break;
        }
        if let (Some(x), Some(y)) = (x, y) {
            left.push(*x);
            right.push(*y);
        }
    }

    left.reverse();
    right.reverse();
    (left, right)
}

/// 원시 가격 시계열을 `Option` 시계열로 변환합니다.
pub fn to_options(series: &[f64]) -> Vec<Option<f64>> {
    series.iter().map(|&v| Some(v)).collect()
}
