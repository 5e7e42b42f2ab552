//! 플래너 타입 모듈
//!
//! Expression and sort-key types the plan compiler uses to parameterize
//! physical operators.

pub mod types;

pub use types::*;
