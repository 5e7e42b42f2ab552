//! ExternalSort Operator — ORDER BY over inputs larger than memory

use crate::config::ExecutorConfig;
use crate::error::QexResult;
use crate::sql::executor::comparator::TupleComparator;
use crate::sql::executor::expr::Evaluator;
use crate::sql::executor::external_sort::ExternalSort;
use crate::sql::executor::operators::{PhysicalOperator, TempScanOperator};
use crate::sql::planner::SortKey;
use crate::types::{Schema, Tuple};
use std::sync::Arc;

/// 외부 정렬 연산자 — 첫 `next` 호출 시 입력 전체를 정렬된 런으로 만듦
pub struct ExternalSortOperator {
    input: Box<dyn PhysicalOperator>,
    sorter: ExternalSort,
    /// Reader over the final run once the sort has happened
    output: Option<TempScanOperator>,
}

impl ExternalSortOperator {
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        keys: Vec<SortKey>,
        evaluator: Arc<dyn Evaluator>,
        config: &ExecutorConfig,
    ) -> Self {
        let comparator = TupleComparator::new(keys, evaluator, input.schema().clone());
        Self {
            input,
            sorter: ExternalSort::new(comparator, config),
            output: None,
        }
    }
}

impl PhysicalOperator for ExternalSortOperator {
    fn schema(&self) -> &Schema {
        self.input.schema()
    }

    fn table_count(&self) -> usize {
        self.input.table_count()
    }

    fn next(&mut self) -> QexResult<Option<Tuple>> {
        if self.output.is_none() {
            let run = self.sorter.run(self.input.as_mut())?;
            self.output = Some(TempScanOperator::new(run, self.input.schema().clone())?);
        }
        match &mut self.output {
            Some(output) => output.next(),
            None => Ok(None),
        }
    }

    fn reset(&mut self) -> QexResult<()> {
        match &mut self.output {
            Some(output) => output.reset(),
            None => Ok(()),
        }
    }
}
