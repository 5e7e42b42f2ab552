//! Sort Operator — ORDER BY clause handling (in-memory)

use crate::error::QexResult;
use crate::sql::executor::comparator::{TupleComparator, sort_tuples};
use crate::sql::executor::expr::Evaluator;
use crate::sql::executor::operators::PhysicalOperator;
use crate::sql::planner::SortKey;
use crate::types::{Schema, Tuple};
use std::sync::Arc;

/// Sort 연산자 (ORDER BY) — 전체 입력을 메모리에 적재 후 정렬
pub struct SortOperator {
    input: Box<dyn PhysicalOperator>,
    comparator: TupleComparator,
    /// Materialized sorted result (sort requires all data)
    sorted: Option<Vec<Tuple>>,
    position: usize,
}

impl SortOperator {
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        keys: Vec<SortKey>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        let comparator = TupleComparator::new(keys, evaluator, input.schema().clone());
        Self {
            input,
            comparator,
            sorted: None,
            position: 0,
        }
    }

    /// Materialize all input tuples into one sorted vector.
    fn materialize(&mut self) -> QexResult<Vec<Tuple>> {
        let mut tuples = Vec::new();
        while let Some(tuple) = self.input.next()? {
            tuples.push(tuple);
        }
        sort_tuples(&mut tuples, &self.comparator)?;
        tracing::debug!(tuples = tuples.len(), "in-memory sort complete");
        Ok(tuples)
    }
}

impl PhysicalOperator for SortOperator {
    fn schema(&self) -> &Schema {
        self.input.schema()
    }

    fn table_count(&self) -> usize {
        self.input.table_count()
    }

    fn next(&mut self) -> QexResult<Option<Tuple>> {
        if self.sorted.is_none() {
            self.sorted = Some(self.materialize()?);
        }
        let next = self
            .sorted
            .as_ref()
            .and_then(|rows| rows.get(self.position))
            .cloned();
        if next.is_some() {
            self.position += 1;
        }
        Ok(next)
    }

    fn reset(&mut self) -> QexResult<()> {
        self.position = 0;
        Ok(())
    }
}
