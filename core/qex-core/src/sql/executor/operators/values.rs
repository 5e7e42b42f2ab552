//! Values Operator — in-memory tuple source

use crate::error::{QexError, QexResult};
use crate::sql::executor::operators::PhysicalOperator;
use crate::types::{Schema, SourceIds, Tuple, Value};

/// 메모리 튜플 소스 — 미리 적재된 튜플을 순차적으로 반환
pub struct ValuesOperator {
    schema: Schema,
    table_count: usize,
    rows: Vec<Tuple>,
    /// Current position in rows
    position: usize,
}

impl ValuesOperator {
    /// Tuples must match the schema width and carry `table_count` ids.
    pub fn new(schema: Schema, table_count: usize, rows: Vec<Tuple>) -> QexResult<Self> {
        for row in &rows {
            if row.len() != schema.len() || row.source_ids().len() != table_count {
                return Err(QexError::Schema(format!(
                    "row with {} values and {} ids does not fit schema of {} columns, {} tables",
                    row.len(),
                    row.source_ids().len(),
                    schema.len(),
                    table_count
                )));
            }
        }
        Ok(Self {
            schema,
            table_count,
            rows,
            position: 0,
        })
    }

    /// One row per value list, numbered from 1.
    pub fn from_rows(schema: Schema, rows: Vec<Vec<Value>>) -> QexResult<Self> {
        let tuples = rows
            .into_iter()
            .zip(1u64..)
            .map(|(values, id)| Tuple::new(values, SourceIds::from_slice(&[id])))
            .collect();
        Self::new(schema, 1, tuples)
    }
}

impl PhysicalOperator for ValuesOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn table_count(&self) -> usize {
        self.table_count
    }

    fn next(&mut self) -> QexResult<Option<Tuple>> {
        let row = self.rows.get(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }

    fn reset(&mut self) -> QexResult<()> {
        self.position = 0;
        Ok(())
    }
}
