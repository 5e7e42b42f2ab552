//! 표현식 타입 정의
//!
//! Expression trees handed to the operators by the plan compiler: column
//! references, literals, binary operators and negation. Parsing and rewriting
//! happen before these trees reach the executor.

use crate::error::{QexError, QexResult};
use crate::types::{Schema, TypeTag, Value};
use std::fmt;

/// 표현식 — 컬럼, 리터럴, 연산자
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// 컬럼 참조 (qualified attribute name)
    Column(String),
    /// 리터럴 값
    Literal(Value),
    /// 이항 연산 (+, -, *, /, =, !=, <, >, AND, OR)
    BinaryOp {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    /// NOT
    Not(Box<Expr>),
    /// 단항 마이너스
    Negative(Box<Expr>),
}

/// 이항 연산자
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // 산술
    Plus,
    Minus,
    Multiply,
    Divide,
    // 비교
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    // 논리
    And,
    Or,
}

impl BinaryOperator {
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Plus
                | BinaryOperator::Minus
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
        )
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOperator::Eq
                | BinaryOperator::NotEq
                | BinaryOperator::Lt
                | BinaryOperator::LtEq
                | BinaryOperator::Gt
                | BinaryOperator::GtEq
        )
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
        }
    }
}

impl Expr {
    pub fn col(name: impl Into<String>) -> Self {
        Expr::Column(name.into())
    }

    pub fn lit(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn equals(self, right: Expr) -> Self {
        Expr::binary(self, BinaryOperator::Eq, right)
    }

    pub fn lt(self, right: Expr) -> Self {
        Expr::binary(self, BinaryOperator::Lt, right)
    }

    pub fn gt(self, right: Expr) -> Self {
        Expr::binary(self, BinaryOperator::Gt, right)
    }

    pub fn and(self, right: Expr) -> Self {
        Expr::binary(self, BinaryOperator::And, right)
    }

    pub fn or(self, right: Expr) -> Self {
        Expr::binary(self, BinaryOperator::Or, right)
    }

    pub fn negated(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Static result type of the expression against an input schema.
    ///
    /// Comparisons and boolean connectives are Integer; arithmetic is Float
    /// as soon as a Float/Date/Time operand takes part.
    pub fn infer_type(&self, schema: &Schema) -> QexResult<TypeTag> {
        match self {
            Expr::Column(name) => schema
                .get(name)
                .map(|(_, tag)| tag)
                .ok_or_else(|| QexError::ColumnNotFound(name.clone())),
            Expr::Literal(value) => match value {
                Value::Integer(_) => Ok(TypeTag::Integer),
                Value::Float(_) => Ok(TypeTag::Float),
                Value::Text(_) => Ok(TypeTag::Text),
                Value::File(_) => Err(QexError::type_mismatch("scalar", value.kind())),
            },
            Expr::Not(_) => Ok(TypeTag::Integer),
            Expr::Negative(inner) => match inner.infer_type(schema)? {
                TypeTag::Text => Err(QexError::type_mismatch("numeric", "Text")),
                TypeTag::Integer => Ok(TypeTag::Integer),
                _ => Ok(TypeTag::Float),
            },
            Expr::BinaryOp { left, op, right } => {
                if !op.is_arithmetic() {
                    return Ok(TypeTag::Integer);
                }
                let (l, r) = (left.infer_type(schema)?, right.infer_type(schema)?);
                if l == TypeTag::Text || r == TypeTag::Text {
                    return Err(QexError::type_mismatch("numeric", "Text"));
                }
                if l.is_float_like() || r.is_float_like() {
                    Ok(TypeTag::Float)
                } else {
                    Ok(TypeTag::Integer)
                }
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(name) => f.write_str(name),
            Expr::Literal(Value::Text(s)) => write!(f, "'{}'", s),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::BinaryOp { left, op, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Not(inner) => write!(f, "NOT {}", inner),
            Expr::Negative(inner) => write!(f, "-{}", inner),
        }
    }
}

/// 정렬 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// 정렬 키 (ORDER BY / GROUP BY 항목)
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub expr: Expr,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            direction: SortDirection::Desc,
        }
    }
}
