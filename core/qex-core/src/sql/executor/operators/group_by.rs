//! GroupBy Operator — sort-based grouping with per-attribute statistics
//!
//! The input is sorted on the grouping keys (ascending, full-row tiebreak)
//! with an external sort, then a single forward pass folds adjacent rows with
//! equal keys into one output row. Output rows are written to a statistics
//! run file and served from there, so `reset` never recomputes.
//!
//! Output columns: the keys, `COUNT(*)`, `COUNT(DISTINCT *)`, then for every
//! non-key attribute in position order `SUM`, `AVG`, `MAX`, `MIN`, `COUNT`
//! (numeric attributes) or `MAX`, `MIN`, `COUNT` (all others).

use crate::config::ExecutorConfig;
use crate::error::{QexError, QexResult};
use crate::sql::executor::comparator::TupleComparator;
use crate::sql::executor::expr::Evaluator;
use crate::sql::executor::external_sort::ExternalSort;
use crate::sql::executor::operators::{PhysicalOperator, TempScanOperator};
use crate::sql::planner::{Expr, SortKey};
use crate::storage::{RecordLayout, RunWriter};
use crate::types::{Column, Schema, Tuple, TypeTag, Value};
use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// 그룹 키가 아닌 속성 하나
#[derive(Debug, Clone, Copy)]
struct AggregatedAttr {
    position: usize,
    tag: TypeTag,
}

/// 그룹 하나의 누적 상태
struct GroupState {
    keys: Vec<Value>,
    count: i64,
    distinct: i64,
    /// Last row counted by `COUNT(DISTINCT *)`
    last_distinct: Tuple,
    attrs: Vec<AttrState>,
}

struct AttrState {
    sum: Option<Value>,
    max: Value,
    min: Value,
    count: i64,
}

/// GROUP BY 연산자 — 외부 정렬 후 인접 그룹 집계
pub struct GroupByOperator {
    input: Box<dyn PhysicalOperator>,
    schema: Schema,
    key_positions: Vec<usize>,
    attrs: Vec<AggregatedAttr>,
    sorter: ExternalSort,
    temp_dir: PathBuf,
    /// Reader over the statistics file once computed
    output: Option<TempScanOperator>,
}

impl GroupByOperator {
    /// `keys` are attribute names of the input schema; an empty list makes
    /// the whole input a single group.
    pub fn new(
        input: Box<dyn PhysicalOperator>,
        keys: Vec<String>,
        evaluator: Arc<dyn Evaluator>,
        config: &ExecutorConfig,
    ) -> QexResult<Self> {
        let input_schema = input.schema().clone();
        let key_positions = keys
            .iter()
            .map(|name| input_schema.position(name))
            .collect::<QexResult<Vec<_>>>()?;

        let attrs: Vec<AggregatedAttr> = input_schema
            .columns()
            .iter()
            .enumerate()
            .filter(|(pos, _)| !key_positions.contains(pos))
            .map(|(position, col)| AggregatedAttr {
                position,
                tag: col.tag,
            })
            .collect();

        let schema = output_schema(&input_schema, &key_positions, &attrs)?;
        let sort_keys = keys
            .into_iter()
            .map(|name| SortKey::asc(Expr::Column(name)))
            .collect();
        let comparator = TupleComparator::new(sort_keys, evaluator, input_schema);

        Ok(Self {
            input,
            schema,
            key_positions,
            attrs,
            sorter: ExternalSort::new(comparator, config),
            temp_dir: config.temp_dir().to_path_buf(),
            output: None,
        })
    }

    /// Sort the input, fold the groups and write the statistics file.
    fn materialize(&mut self) -> QexResult<TempScanOperator> {
        let start = Instant::now();
        let sorted = self.sorter.run(self.input.as_mut())?;
        let mut reader = sorted.open()?;
        let mut writer = RunWriter::create(&self.temp_dir, RecordLayout::run(&self.schema, 1))?;

        let mut group: Option<GroupState> = None;
        let mut next_group_id = 1u64;
        while let Some(tuple) = reader.next_tuple()? {
            let same_group = match &group {
                Some(state) => self.same_keys(&state.keys, &tuple)?,
                None => false,
            };
            if same_group {
                if let Some(state) = group.as_mut() {
                    self.accumulate(state, tuple)?;
                }
                continue;
            }
            if let Some(done) = group.take() {
                writer.push(&self.close(done, next_group_id))?;
                next_group_id += 1;
            }
            group = Some(self.open_group(tuple)?);
        }
        if let Some(done) = group.take() {
            writer.push(&self.close(done, next_group_id))?;
        }

        let stats = writer.finish()?;
        tracing::debug!(
            groups = stats.tuples(),
            input_tuples = sorted.tuples(),
            elapsed_us = start.elapsed().as_micros(),
            "group-by statistics written"
        );
        TempScanOperator::new(stats, self.schema.clone())
    }

    fn key_values(&self, tuple: &Tuple) -> QexResult<Vec<Value>> {
        self.key_positions
            .iter()
            .map(|&pos| value_at(tuple, pos).cloned())
            .collect()
    }

    fn same_keys(&self, keys: &[Value], tuple: &Tuple) -> QexResult<bool> {
        for (key, &pos) in keys.iter().zip(&self.key_positions) {
            if key.compare(value_at(tuple, pos)?)? != Ordering::Equal {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn open_group(&self, tuple: Tuple) -> QexResult<GroupState> {
        let attrs = self
            .attrs
            .iter()
            .map(|attr| {
                let value = value_at(&tuple, attr.position)?.clone();
                Ok(AttrState {
                    sum: attr.tag.is_numeric().then(|| value.clone()),
                    max: value.clone(),
                    min: value,
                    count: 1,
                })
            })
            .collect::<QexResult<Vec<_>>>()?;
        Ok(GroupState {
            keys: self.key_values(&tuple)?,
            count: 1,
            distinct: 1,
            last_distinct: tuple,
            attrs,
        })
    }

    fn accumulate(&self, state: &mut GroupState, tuple: Tuple) -> QexResult<()> {
        state.count += 1;
        for (attr, acc) in self.attrs.iter().zip(state.attrs.iter_mut()) {
            let value = value_at(&tuple, attr.position)?;
            if let Some(sum) = acc.sum.as_mut() {
                *sum = sum.checked_add(value)?;
            }
            if value.compare(&acc.max)? == Ordering::Greater {
                acc.max = value.clone();
            }
            if value.compare(&acc.min)? == Ordering::Less {
                acc.min = value.clone();
            }
            acc.count += 1;
        }
        if !state.last_distinct.payload_eq(&tuple)? {
            state.distinct += 1;
            state.last_distinct = tuple;
        }
        Ok(())
    }

    fn close(&self, state: GroupState, group_id: u64) -> Tuple {
        let mut values = Vec::with_capacity(self.schema.len());
        values.extend(state.keys);
        values.push(Value::Integer(state.count));
        values.push(Value::Integer(state.distinct));
        for acc in state.attrs {
            if let Some(sum) = acc.sum {
                let avg = sum.as_f64().unwrap_or_default() / acc.count as f64;
                values.push(sum);
                values.push(Value::Float(avg));
            }
            values.push(acc.max);
            values.push(acc.min);
            values.push(Value::Integer(acc.count));
        }
        Tuple::with_source(values, group_id)
    }
}

fn value_at(tuple: &Tuple, position: usize) -> QexResult<&Value> {
    tuple.value(position).ok_or_else(|| {
        QexError::Schema(format!(
            "column index {} out of range ({})",
            position,
            tuple.len()
        ))
    })
}

fn output_schema(
    input: &Schema,
    key_positions: &[usize],
    attrs: &[AggregatedAttr],
) -> QexResult<Schema> {
    let mut columns: Vec<Column> = key_positions
        .iter()
        .filter_map(|&pos| input.column(pos).cloned())
        .collect();
    columns.push(Column::new("COUNT(*)", TypeTag::Integer));
    columns.push(Column::new("COUNT(DISTINCT *)", TypeTag::Integer));
    for attr in attrs {
        let name = input
            .column(attr.position)
            .map(|c| c.name.as_str())
            .unwrap_or_default();
        if attr.tag.is_numeric() {
            columns.push(Column::new(format!("SUM({})", name), attr.tag));
            columns.push(Column::new(format!("AVG({})", name), TypeTag::Float));
        }
        columns.push(Column::new(format!("MAX({})", name), attr.tag));
        columns.push(Column::new(format!("MIN({})", name), attr.tag));
        columns.push(Column::new(format!("COUNT({})", name), TypeTag::Integer));
    }
    Schema::new(columns)
}

impl PhysicalOperator for GroupByOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn table_count(&self) -> usize {
        1
    }

    fn next(&mut self) -> QexResult<Option<Tuple>> {
        if self.output.is_none() {
            self.output = Some(self.materialize()?);
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
