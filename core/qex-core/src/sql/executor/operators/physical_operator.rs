//! Physical Operator Trait — Volcano Execution Model

use crate::error::QexResult;
use crate::types::{Schema, Tuple};

/// 물리 연산자 트레이트 — Volcano 실행 모델 (Pull 기반)
///
/// `next` returns `Ok(None)` once the operator is exhausted and keeps doing
/// so until `reset` is called.
pub trait PhysicalOperator: Send {
    /// 출력 스키마 반환
    fn schema(&self) -> &Schema;

    /// 출력 튜플당 원본 식별자 수
    fn table_count(&self) -> usize;

    /// 다음 튜플 반환 (None이면 끝)
    fn next(&mut self) -> QexResult<Option<Tuple>>;

    /// 연산자 상태 초기화 (재실행용)
    fn reset(&mut self) -> QexResult<()>;
}

/// Drain an operator into a vector.
pub fn collect_all(op: &mut dyn PhysicalOperator) -> QexResult<Vec<Tuple>> {
    let mut out = Vec::new();
    while let Some(tuple) = op.next()? {
        out.push(tuple);
    }
    Ok(out)
}
