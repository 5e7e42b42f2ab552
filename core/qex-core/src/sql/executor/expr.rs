//! Expression Evaluation — row-at-a-time

use crate::error::{QexError, QexResult};
use crate::sql::planner::{BinaryOperator, Expr};
use crate::types::{Schema, Tuple, Value};
use std::cmp::Ordering;

/// 표현식 평가기 — 연산자가 사용하는 플러그형 경계
///
/// Boolean results are encoded as `Integer(1)` / `Integer(0)`.
pub trait Evaluator: Send + Sync {
    /// Evaluate `expr` against one tuple laid out by `schema`.
    fn evaluate(&self, tuple: &Tuple, expr: &Expr, schema: &Schema) -> QexResult<Value>;

    /// Order two tuples by the value `expr` takes on each.
    fn compare(
        &self,
        left: &Tuple,
        right: &Tuple,
        expr: &Expr,
        schema: &Schema,
    ) -> QexResult<Ordering> {
        let l = self.evaluate(left, expr, schema)?;
        let r = self.evaluate(right, expr, schema)?;
        l.compare(&r)
    }

    /// Whether a predicate holds for `tuple`.
    fn is_satisfied(&self, tuple: &Tuple, expr: &Expr, schema: &Schema) -> QexResult<bool> {
        truth(&self.evaluate(tuple, expr, schema)?)
    }
}

/// Truth of an evaluated predicate: Integer ≠ 0.
pub fn truth(value: &Value) -> QexResult<bool> {
    match value {
        Value::Integer(v) => Ok(*v != 0),
        other => Err(QexError::type_mismatch("Integer", other.kind())),
    }
}

/// 기본 평가기 — [`evaluate_expr`] 사용
#[derive(Debug, Clone, Copy, Default)]
pub struct RowEvaluator;

impl Evaluator for RowEvaluator {
    fn evaluate(&self, tuple: &Tuple, expr: &Expr, schema: &Schema) -> QexResult<Value> {
        evaluate_expr(expr, tuple, schema)
    }
}

/// Evaluate an [`Expr`] against a tuple, producing a [`Value`].
pub fn evaluate_expr(expr: &Expr, tuple: &Tuple, schema: &Schema) -> QexResult<Value> {
    match expr {
        Expr::Column(name) => {
            let pos = schema.position(name)?;
            tuple.value(pos).cloned().ok_or_else(|| {
                QexError::Schema(format!(
                    "column index {} out of range ({})",
                    pos,
                    tuple.len()
                ))
            })
        }
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Not(inner) => {
            let v = truth(&evaluate_expr(inner, tuple, schema)?)?;
            Ok(Value::Integer(i64::from(!v)))
        }
        Expr::Negative(inner) => match evaluate_expr(inner, tuple, schema)? {
            Value::Integer(v) => v
                .checked_neg()
                .map(Value::Integer)
                .ok_or_else(|| QexError::ArithmeticOverflow(format!("-({})", v))),
            Value::Float(v) => Ok(Value::Float(-v)),
            other => Err(QexError::type_mismatch("numeric", other.kind())),
        },
        Expr::BinaryOp { left, op, right } => match op {
            // AND / OR short-circuit
            BinaryOperator::And => {
                let l = truth(&evaluate_expr(left, tuple, schema)?)?;
                let result = l && truth(&evaluate_expr(right, tuple, schema)?)?;
                Ok(Value::Integer(i64::from(result)))
            }
            BinaryOperator::Or => {
                let l = truth(&evaluate_expr(left, tuple, schema)?)?;
                let result = l || truth(&evaluate_expr(right, tuple, schema)?)?;
                Ok(Value::Integer(i64::from(result)))
            }
            _ => {
                let l = evaluate_expr(left, tuple, schema)?;
                let r = evaluate_expr(right, tuple, schema)?;
                evaluate_binary_op(&l, *op, &r)
            }
        },
    }
}

fn evaluate_binary_op(left: &Value, op: BinaryOperator, right: &Value) -> QexResult<Value> {
    if op.is_comparison() {
        let ord = left.compare_promoted(right)?;
        let result = match op {
            BinaryOperator::Eq => ord == Ordering::Equal,
            BinaryOperator::NotEq => ord != Ordering::Equal,
            BinaryOperator::Lt => ord == Ordering::Less,
            BinaryOperator::LtEq => ord != Ordering::Greater,
            BinaryOperator::Gt => ord == Ordering::Greater,
            _ => ord != Ordering::Less,
        };
        return Ok(Value::Integer(i64::from(result)));
    }

    match (left, right) {
        (Value::Integer(a), Value::Integer(b)) => integer_arithmetic(*a, op, *b),
        (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
            // Integer ↔ Float promotion
            let (a, b) = match (left.as_f64(), right.as_f64()) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(QexError::type_mismatch("numeric", "non-numeric")),
            };
            let v = match op {
                BinaryOperator::Plus => a + b,
                BinaryOperator::Minus => a - b,
                BinaryOperator::Multiply => a * b,
                _ => a / b,
            };
            Ok(Value::Float(v))
        }
        (Value::Integer(_) | Value::Float(_), other) | (other, _) => {
            Err(QexError::type_mismatch("numeric", other.kind()))
        }
    }
}

fn integer_arithmetic(a: i64, op: BinaryOperator, b: i64) -> QexResult<Value> {
    if op == BinaryOperator::Divide && b == 0 {
        return Err(QexError::ArithmeticOverflow(format!(
            "division by zero: {} / 0",
            a
        )));
    }
    let result = match op {
        BinaryOperator::Plus => a.checked_add(b),
        BinaryOperator::Minus => a.checked_sub(b),
        BinaryOperator::Multiply => a.checked_mul(b),
        _ => a.checked_div(b),
    };
    result
        .map(Value::Integer)
        .ok_or_else(|| QexError::ArithmeticOverflow(format!("{} {} {}", a, op.symbol(), b)))
}
