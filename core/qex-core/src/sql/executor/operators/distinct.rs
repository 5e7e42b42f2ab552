//! Distinct Operator — drops adjacent duplicates from sorted input

use crate::error::QexResult;
use crate::sql::executor::operators::PhysicalOperator;
use crate::types::{Schema, Tuple};

/// 중복 제거 연산자 — 입력이 정렬되어 있어야 함
pub struct DistinctOperator {
    input: Box<dyn PhysicalOperator>,
    /// Last emitted tuple; `None` equals no real tuple
    last: Option<Tuple>,
}

impl DistinctOperator {
    pub fn new(input: Box<dyn PhysicalOperator>) -> Self {
        Self { input, last: None }
    }
}

impl PhysicalOperator for DistinctOperator {
    fn schema(&self) -> &Schema {
        self.input.schema()
    }

    fn table_count(&self) -> usize {
        self.input.table_count()
    }

    fn next(&mut self) -> QexResult<Option<Tuple>> {
        while let Some(tuple) = self.input.next()? {
            let duplicate = match &self.last {
                Some(last) => last.payload_eq(&tuple)?,
                None => false,
            };
            if !duplicate {
                self.last = Some(tuple.clone());
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }

    fn reset(&mut self) -> QexResult<()> {
        self.last = None;
        self.input.reset()
    }
}
