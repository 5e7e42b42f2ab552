//! Cartesian Operator — cross product of K operands in odometer order

use crate::error::{QexError, QexResult};
use crate::sql::executor::operators::PhysicalOperator;
use crate::types::{Schema, SourceIds, Tuple};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProductState {
    /// No tuple pulled yet
    Fresh,
    Running,
    Exhausted,
}

/// 카티션 곱 연산자 — 가장 오른쪽 피연산자가 가장 빠르게 변함
///
/// Keeps one current tuple per operand. Advancing the product advances the
/// last operand; an exhausted operand is reset, re-primed with its first
/// tuple and carries into the operand on its left.
pub struct CartesianOperator {
    operands: Vec<Box<dyn PhysicalOperator>>,
    schema: Schema,
    current: Vec<Option<Tuple>>,
    state: ProductState,
}

impl CartesianOperator {
    /// Operands come with the alias their attributes are re-qualified under.
    pub fn new(operands: Vec<(String, Box<dyn PhysicalOperator>)>) -> QexResult<Self> {
        if operands.is_empty() {
            return Err(QexError::Schema(
                "cartesian product needs at least one operand".to_string(),
            ));
        }
        let schema = Schema::concat_qualified(
            operands
                .iter()
                .map(|(alias, op)| (alias.as_str(), op.schema())),
        )?;
        let operands: Vec<_> = operands.into_iter().map(|(_, op)| op).collect();
        Ok(Self {
            current: vec![None; operands.len()],
            operands,
            schema,
            state: ProductState::Fresh,
        })
    }

    /// Prime every operand with its first tuple.
    fn start(&mut self) -> QexResult<bool> {
        for (slot, operand) in self.current.iter_mut().zip(self.operands.iter_mut()) {
            match operand.next()? {
                Some(tuple) => *slot = Some(tuple),
                None => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Advance the odometer by one position.
    fn advance(&mut self) -> QexResult<bool> {
        let mut i = self.operands.len() - 1;
        loop {
            if let Some(tuple) = self.operands[i].next()? {
                self.current[i] = Some(tuple);
                return Ok(true);
            }
            if i == 0 {
                return Ok(false);
            }
            // wrap operand i and carry into i - 1
            self.operands[i].reset()?;
            match self.operands[i].next()? {
                Some(tuple) => self.current[i] = Some(tuple),
                None => return Ok(false),
            }
            i -= 1;
        }
    }

    fn combine(&self) -> Tuple {
        let mut values = Vec::with_capacity(self.schema.len());
        let mut ids = SourceIds::new();
        for tuple in self.current.iter().flatten() {
            values.extend_from_slice(tuple.values());
            ids.push(tuple.source_ids().first().copied().unwrap_or_default());
        }
        Tuple::new(values, ids)
    }
}

impl PhysicalOperator for CartesianOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn table_count(&self) -> usize {
        self.operands.len()
    }

    fn next(&mut self) -> QexResult<Option<Tuple>> {
        let produced = match self.state {
            ProductState::Exhausted => return Ok(None),
            ProductState::Fresh => self.start()?,
            ProductState::Running => self.advance()?,
        };
        if !produced {
            self.state = ProductState::Exhausted;
            return Ok(None);
        }
        self.state = ProductState::Running;
        Ok(Some(self.combine()))
    }

    fn reset(&mut self) -> QexResult<()> {
        for operand in &mut self.operands {
            operand.reset()?;
        }
        self.current.iter_mut().for_each(|slot| *slot = None);
        self.state = ProductState::Fresh;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::executor::operators::{ValuesOperator, collect_all};
    use crate::types::{TypeTag, Value};

    fn relation(name: &str, n: i64) -> Box<dyn PhysicalOperator> {
        let col = format!("{}.v", name);
        let schema = Schema::from_pairs(&[(col.as_str(), TypeTag::Integer)]).unwrap();
        let rows = (0..n).map(|i| vec![Value::Integer(i)]).collect();
        Box::new(ValuesOperator::from_rows(schema, rows).unwrap())
    }

    fn ints(t: &Tuple) -> Vec<i64> {
        t.values()
            .iter()
            .map(|v| match v {
                Value::Integer(i) => *i,
                other => panic!("unexpected {:?}", other),
            })
            .collect()
    }

    #[test]
    fn two_operands_odometer_order() {
        let mut product = CartesianOperator::new(vec![
            ("S".to_string(), relation("Sailors", 3)),
            ("B".to_string(), relation("Boats", 2)),
        ])
        .unwrap();
        assert_eq!(product.table_count(), 2);
        let names: Vec<_> = product.schema().columns().iter().map(|c| c.name.clone()).collect();
        assert_eq!(names, vec!["S.v", "B.v"]);

        let rows = collect_all(&mut product).unwrap();
        let got: Vec<_> = rows.iter().map(ints).collect();
        assert_eq!(
            got,
            vec![
                vec![0, 0],
                vec![0, 1],
                vec![1, 0],
                vec![1, 1],
                vec![2, 0],
                vec![2, 1]
            ]
        );
        assert_eq!(rows[5].source_ids(), &[3, 2]);
        assert!(product.next().unwrap().is_none());
    }

    #[test]
    fn three_operands_cardinality() {
        let mut product = CartesianOperator::new(vec![
            ("A".to_string(), relation("A", 2)),
            ("B".to_string(), relation("B", 3)),
            ("C".to_string(), relation("C", 4)),
        ])
        .unwrap();
        let rows = collect_all(&mut product).unwrap();
        assert_eq!(rows.len(), 24);
        assert_eq!(ints(&rows[0]), vec![0, 0, 0]);
        assert_eq!(ints(&rows[4]), vec![0, 1, 0]);
        assert_eq!(ints(&rows[23]), vec![1, 2, 3]);
    }

    #[test]
    fn empty_operand_empties_product() {
        for empty_at in 0..3 {
            let operands = (0..3)
                .map(|i| {
                    let n = if i == empty_at { 0 } else { 2 };
                    (format!("R{}", i), relation(&format!("R{}", i), n))
                })
                .collect();
            let mut product = CartesianOperator::new(operands).unwrap();
            assert!(product.next().unwrap().is_none());
        }
    }

    #[test]
    fn reset_restarts_product() {
        let mut product = CartesianOperator::new(vec![
            ("S".to_string(), relation("S", 2)),
            ("B".to_string(), relation("B", 2)),
        ])
        .unwrap();
        let first = collect_all(&mut product).unwrap();
        product.reset().unwrap();
        assert_eq!(collect_all(&mut product).unwrap(), first);
    }

    #[test]
    fn self_product_needs_aliases() {
        let res = CartesianOperator::new(vec![
            ("S".to_string(), relation("S", 1)),
            ("S".to_string(), relation("S", 1)),
        ]);
        assert!(res.is_err());
        assert!(CartesianOperator::new(vec![]).is_err());
    }
}
