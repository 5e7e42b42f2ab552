//! Filter Operator — WHERE / HAVING clause evaluation

use crate::error::QexResult;
use crate::sql::executor::expr::Evaluator;
use crate::sql::executor::operators::PhysicalOperator;
use crate::sql::planner::Expr;
use crate::types::{Schema, Tuple};
use std::sync::Arc;

/// 필터 연산자 (WHERE 조건) — 조건이 없으면 그대로 통과
pub struct FilterOperator {
    input: Box<dyn PhysicalOperator>,
    predicate: Option<Expr>,
    evaluator: Arc<dyn Evaluator>,
}

/// HAVING is a filter over group-by output.
pub type HavingOperator = FilterOperator;

impl FilterOperator {
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        predicate: Option<Expr>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        Self {
            input,
            predicate,
            evaluator,
        }
    }

    pub fn predicate(&self) -> Option<&Expr> {
        self.predicate.as_ref()
    }
}

impl PhysicalOperator for FilterOperator {
    fn schema(&self) -> &Schema {
        self.input.schema()
    }

    fn table_count(&self) -> usize {
        self.input.table_count()
    }

    fn next(&mut self) -> QexResult<Option<Tuple>> {
        loop {
            let Some(tuple) = self.input.next()? else {
                return Ok(None);
            };
            let keep = match &self.predicate {
                None => true,
                Some(predicate) => {
                    self.evaluator
                        .is_satisfied(&tuple, predicate, self.input.schema())?
                }
            };
            if keep {
                return Ok(Some(tuple));
            }
        }
    }

    fn reset(&mut self) -> QexResult<()> {
        self.input.reset()
    }
}
