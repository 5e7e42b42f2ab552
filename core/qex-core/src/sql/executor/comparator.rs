//! Tuple Comparator — ORDER BY keys with a positional tiebreak

use crate::error::{QexError, QexResult};
use crate::sql::executor::expr::Evaluator;
use crate::sql::planner::{SortDirection, SortKey};
use crate::types::{Schema, Tuple, Value};
use std::cmp::Ordering;
use std::sync::Arc;

/// 복합 비교기 — 정렬 키 순서대로 비교 후 전체 페이로드로 동점 처리
///
/// Two tuples compare equal only when their payloads are equal, so the
/// order a comparator produces is total and deterministic.
#[derive(Clone)]
pub struct TupleComparator {
    keys: Vec<SortKey>,
    evaluator: Arc<dyn Evaluator>,
    schema: Schema,
}

impl TupleComparator {
    pub fn new(keys: Vec<SortKey>, evaluator: Arc<dyn Evaluator>, schema: Schema) -> Self {
        Self {
            keys,
            evaluator,
            schema,
        }
    }

    /// Comparator with no keys: plain positional order.
    pub fn positional(evaluator: Arc<dyn Evaluator>, schema: Schema) -> Self {
        Self::new(Vec::new(), evaluator, schema)
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Evaluate every sort key against `tuple`, in key order.
    pub fn key_values(&self, tuple: &Tuple) -> QexResult<Vec<Value>> {
        self.keys
            .iter()
            .map(|key| self.evaluator.evaluate(tuple, &key.expr, &self.schema))
            .collect()
    }

    pub fn compare(&self, left: &Tuple, right: &Tuple) -> QexResult<Ordering> {
        self.compare_keyed(&self.key_values(left)?, left, &self.key_values(right)?, right)
    }

    /// Compare two tuples whose key values were evaluated beforehand.
    pub fn compare_keyed(
        &self,
        left_keys: &[Value],
        left: &Tuple,
        right_keys: &[Value],
        right: &Tuple,
    ) -> QexResult<Ordering> {
        for ((key, l), r) in self.keys.iter().zip(left_keys).zip(right_keys) {
            let ord = match key.direction {
                SortDirection::Asc => l.compare(r)?,
                SortDirection::Desc => l.compare(r)?.reverse(),
            };
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        left.payload_cmp(right)
    }
}

impl std::fmt::Debug for TupleComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TupleComparator")
            .field("keys", &self.keys)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Sort in place.
///
/// Keys are evaluated once per tuple and every key and payload column must
/// hold a single value kind, so evaluation and type errors are returned
/// before any reordering happens.
pub fn sort_tuples(tuples: &mut Vec<Tuple>, comparator: &TupleComparator) -> QexResult<()> {
    let mut keyed = std::mem::take(tuples)
        .into_iter()
        .map(|tuple| Ok((comparator.key_values(&tuple)?, tuple)))
        .collect::<QexResult<Vec<(Vec<Value>, Tuple)>>>()?;

    if let Some(((first_keys, first), rest)) = keyed.split_first() {
        for (keys, tuple) in rest {
            same_kinds(first_keys, keys)?;
            same_kinds(first.values(), tuple.values())?;
        }
    }

    // same-kind values always compare, so the fallback is never taken
    keyed.sort_by(|(lk, l), (rk, r)| {
        comparator
            .compare_keyed(lk, l, rk, r)
            .unwrap_or(Ordering::Equal)
    });
    tuples.extend(keyed.into_iter().map(|(_, tuple)| tuple));
    Ok(())
}

fn same_kinds(expected: &[Value], actual: &[Value]) -> QexResult<()> {
    for (e, a) in expected.iter().zip(actual) {
        if e.kind() != a.kind() {
            return Err(QexError::type_mismatch(e.kind(), a.kind()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QexError;
    use crate::sql::executor::expr::RowEvaluator;
    use crate::sql::planner::{BinaryOperator, Expr};
    use crate::types::TypeTag;

    fn schema() -> Schema {
        Schema::from_pairs(&[("T.a", TypeTag::Integer), ("T.b", TypeTag::Text)]).unwrap()
    }

    fn row(a: i64, b: &str) -> Tuple {
        Tuple::with_source(vec![Value::Integer(a), Value::from(b)], 0)
    }

    fn payloads(tuples: &[Tuple]) -> Vec<(i64, String)> {
        tuples
            .iter()
            .map(|t| match t.values() {
                [Value::Integer(a), Value::Text(b)] => (*a, b.clone()),
                other => panic!("unexpected row {:?}", other),
            })
            .collect()
    }

    #[test]
    fn descending_key_then_positional() {
        let cmp = TupleComparator::new(
            vec![SortKey::desc(Expr::col("T.a"))],
            Arc::new(RowEvaluator),
            schema(),
        );
        let mut rows = vec![row(1, "z"), row(2, "b"), row(2, "a"), row(1, "a")];
        sort_tuples(&mut rows, &cmp).unwrap();
        assert_eq!(
            payloads(&rows),
            vec![
                (2, "a".into()),
                (2, "b".into()),
                (1, "a".into()),
                (1, "z".into())
            ]
        );
    }

    #[test]
    fn secondary_key_ordering() {
        let cmp = TupleComparator::new(
            vec![SortKey::asc(Expr::col("T.b")), SortKey::desc(Expr::col("T.a"))],
            Arc::new(RowEvaluator),
            schema(),
        );
        let mut rows = vec![row(1, "b"), row(3, "a"), row(5, "a")];
        sort_tuples(&mut rows, &cmp).unwrap();
        assert_eq!(
            payloads(&rows),
            vec![(5, "a".into()), (3, "a".into()), (1, "b".into())]
        );
    }

    #[test]
    fn positional_comparator() {
        let cmp = TupleComparator::positional(Arc::new(RowEvaluator), schema());
        assert_eq!(cmp.compare(&row(1, "b"), &row(1, "c")).unwrap(), Ordering::Less);
        assert_eq!(cmp.compare(&row(1, "b"), &row(1, "b")).unwrap(), Ordering::Equal);
    }

    #[test]
    fn key_failing_on_some_rows_returns_error() {
        let cmp = TupleComparator::new(
            vec![SortKey::asc(Expr::binary(
                Expr::lit(1000i64),
                BinaryOperator::Divide,
                Expr::col("T.a"),
            ))],
            Arc::new(RowEvaluator),
            schema(),
        );
        let mut rows: Vec<Tuple> = (0..60)
            .map(|i| row(if i % 7 == 0 { 0 } else { i }, "x"))
            .collect();
        let err = sort_tuples(&mut rows, &cmp).unwrap_err();
        assert!(matches!(err, QexError::ArithmeticOverflow(_)));
    }

    #[test]
    fn mixed_key_kinds_rejected() {
        let cmp = TupleComparator::new(
            vec![SortKey::asc(Expr::binary(
                Expr::col("T.a"),
                BinaryOperator::Multiply,
                Expr::lit(1i64),
            ))],
            Arc::new(RowEvaluator),
            schema(),
        );
        let mut rows: Vec<Tuple> = (0..40).map(|i| row(i, "x")).collect();
        rows.push(Tuple::with_source(vec![Value::Float(1.5), Value::from("y")], 0));
        let err = sort_tuples(&mut rows, &cmp).unwrap_err();
        assert!(matches!(err, QexError::TypeMismatch { .. }));
    }

    #[test]
    fn failing_key_surfaces_error() {
        let cmp = TupleComparator::new(
            vec![SortKey::asc(Expr::col("T.missing"))],
            Arc::new(RowEvaluator),
            schema(),
        );
        let mut rows = vec![row(1, "a"), row(2, "b")];
        let err = sort_tuples(&mut rows, &cmp).unwrap_err();
        assert!(matches!(err, QexError::ColumnNotFound(_)));
    }
}
