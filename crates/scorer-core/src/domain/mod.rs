//! 점수 엔진의 도메인 모델.

mod analysis;
mod candle;
mod indicator;
mod interpretation;
mod market_condition;

pub use analysis::*;
pub use candle::*;
pub use indicator::*;
pub use interpretation::*;
pub use market_condition::*;
