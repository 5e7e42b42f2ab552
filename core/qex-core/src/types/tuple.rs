//! Tuple — positional payload plus per-relation source identifiers

use crate::error::QexResult;
use crate::types::Value;
use smallvec::SmallVec;
use std::cmp::Ordering;

/// Source identifier list; one entry per contributing base relation.
pub type SourceIds = SmallVec<[u64; 2]>;

/// 튜플 — 값 배열 + 원본 릴레이션 행 식별자
///
/// Source identifiers ride along for traceability and output only; they never
/// take part in equality or ordering.
#[derive(Debug, Clone)]
pub struct Tuple {
    values: Vec<Value>,
    source_ids: SourceIds,
}

impl Tuple {
    pub fn new(values: Vec<Value>, source_ids: SourceIds) -> Self {
        Self { values, source_ids }
    }

    /// Tuple from a single base relation row.
    pub fn with_source(values: Vec<Value>, source_id: u64) -> Self {
        let mut source_ids = SourceIds::new();
        source_ids.push(source_id);
        Self { values, source_ids }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn source_ids(&self) -> &[u64] {
        &self.source_ids
    }

    /// Replace every identifier with a single fresh one.
    pub fn renumber(&mut self, source_id: u64) {
        self.source_ids.clear();
        self.source_ids.push(source_id);
    }

    pub fn into_parts(self) -> (Vec<Value>, SourceIds) {
        (self.values, self.source_ids)
    }

    /// Position-by-position comparison of the payload.
    ///
    /// Columns are compared in order until one differs; a shorter payload
    /// sorts first when it is a prefix of the longer one.
    pub fn payload_cmp(&self, other: &Tuple) -> QexResult<Ordering> {
        for (a, b) in self.values.iter().zip(other.values.iter()) {
            let ord = a.compare(b)?;
            if ord != Ordering::Equal {
                return Ok(ord);
            }
        }
        Ok(self.values.len().cmp(&other.values.len()))
    }

    /// Payload equality through [`Value::compare`].
    pub fn payload_eq(&self, other: &Tuple) -> QexResult<bool> {
        Ok(self.payload_cmp(other)? == Ordering::Equal)
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn equality_ignores_source_ids() {
        let a = Tuple::with_source(vec![Value::Integer(1), Value::from("x")], 7);
        let b = Tuple::with_source(vec![Value::Integer(1), Value::from("x")], 99);
        assert_eq!(a, b);
        assert!(a.payload_eq(&b).unwrap());
    }

    #[test]
    fn payload_cmp_positional() {
        let a = Tuple::with_source(vec![Value::Integer(1), Value::Integer(5)], 1);
        let b = Tuple::with_source(vec![Value::Integer(1), Value::Integer(6)], 2);
        assert_eq!(a.payload_cmp(&b).unwrap(), Ordering::Less);
        assert_eq!(b.payload_cmp(&a).unwrap(), Ordering::Greater);
    }

    #[test]
    fn payload_cmp_type_mismatch() {
        let a = Tuple::with_source(vec![Value::Integer(1)], 1);
        let b = Tuple::with_source(vec![Value::from("1")], 1);
        assert!(a.payload_cmp(&b).is_err());
    }

    #[test]
    fn renumber_collapses_ids() {
        let mut t = Tuple::new(vec![Value::Integer(1)], smallvec![3, 4, 5]);
        t.renumber(42);
        assert_eq!(t.source_ids(), &[42]);
    }
}
