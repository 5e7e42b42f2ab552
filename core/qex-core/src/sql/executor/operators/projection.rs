//! Projection Operator — SELECT column selection and computation

use crate::error::QexResult;
use crate::sql::executor::expr::Evaluator;
use crate::sql::executor::operators::PhysicalOperator;
use crate::sql::planner::Expr;
use crate::types::{Column, Schema, Tuple};
use std::sync::Arc;

/// SELECT 목록의 한 항목
#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub expr: Expr,
    pub alias: Option<String>,
}

impl SelectItem {
    pub fn new(expr: Expr) -> Self {
        Self { expr, alias: None }
    }

    pub fn aliased(expr: Expr, alias: impl Into<String>) -> Self {
        Self {
            expr,
            alias: Some(alias.into()),
        }
    }

    /// Output column name: the alias, the column name, or the display form.
    fn output_name(&self) -> String {
        match (&self.alias, &self.expr) {
            (Some(alias), _) => alias.clone(),
            (None, Expr::Column(name)) => name.clone(),
            (None, expr) => expr.to_string(),
        }
    }
}

/// Projection 연산자 (SELECT 컬럼 선택/계산)
///
/// Every output tuple carries a single fresh row id, counted from 1.
pub struct ProjectionOperator {
    input: Box<dyn PhysicalOperator>,
    schema: Schema,
    /// Expressions to evaluate for each output column; empty means `SELECT *`
    items: Vec<SelectItem>,
    evaluator: Arc<dyn Evaluator>,
    next_row_id: u64,
}

impl ProjectionOperator {
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        items: Vec<SelectItem>,
        evaluator: Arc<dyn Evaluator>,
    ) -> QexResult<Self> {
        let schema = if items.is_empty() {
            input.schema().clone()
        } else {
            let columns = items
                .iter()
                .map(|item| {
                    let tag = item.expr.infer_type(input.schema())?;
                    Ok(Column::new(item.output_name(), tag))
                })
                .collect::<QexResult<Vec<_>>>()?;
            Schema::new(columns)?
        };
        Ok(Self {
            input,
            schema,
            items,
            evaluator,
            next_row_id: 1,
        })
    }
}

impl PhysicalOperator for ProjectionOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn table_count(&self) -> usize {
        1
    }

    fn next(&mut self) -> QexResult<Option<Tuple>> {
        let Some(mut tuple) = self.input.next()? else {
            return Ok(None);
        };
        let row_id = self.next_row_id;
        self.next_row_id += 1;

        if self.items.is_empty() {
            // SELECT * — pass through all columns
            tuple.renumber(row_id);
            return Ok(Some(tuple));
        }

        let values = self
            .items
            .iter()
            .map(|item| {
                self.evaluator
                    .evaluate(&tuple, &item.expr, self.input.schema())
            })
            .collect::<QexResult<Vec<_>>>()?;
        Ok(Some(Tuple::with_source(values, row_id)))
    }

    fn reset(&mut self) -> QexResult<()> {
        self.next_row_id = 1;
        self.input.reset()
    }
}
