//! Schema — qualified attribute name → (position, type tag)

use crate::error::{QexError, QexResult};
use crate::types::TypeTag;
use ahash::AHashMap;

/// A named, typed output column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub tag: TypeTag,
}

impl Column {
    pub fn new(name: impl Into<String>, tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }

    /// Text before the first `.` (`Sailors` for `Sailors.A`).
    pub fn relation(&self) -> &str {
        self.name.split_once('.').map_or("", |(rel, _)| rel)
    }

    /// Text after the first `.`, or the whole name when unqualified.
    pub fn attribute(&self) -> &str {
        self.name.split_once('.').map_or(&self.name, |(_, attr)| attr)
    }
}

/// 연산자 출력 스키마
///
/// Positions are the column indices, so they are dense `0..n` by
/// construction; duplicate names are rejected.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    columns: Vec<Column>,
    index: AHashMap<String, usize>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> QexResult<Self> {
        let mut index = AHashMap::with_capacity(columns.len());
        for (pos, col) in columns.iter().enumerate() {
            if index.insert(col.name.clone(), pos).is_some() {
                return Err(QexError::Schema(format!(
                    "duplicate attribute '{}'",
                    col.name
                )));
            }
        }
        Ok(Self { columns, index })
    }

    /// Build from `(name, tag)` pairs in position order.
    pub fn from_pairs(pairs: &[(&str, TypeTag)]) -> QexResult<Self> {
        Self::new(
            pairs
                .iter()
                .map(|(name, tag)| Column::new(*name, *tag))
                .collect(),
        )
    }

    /// Concatenate operand schemas, re-qualifying each under its alias.
    pub fn concat_qualified<'a>(
        parts: impl IntoIterator<Item = (&'a str, &'a Schema)>,
    ) -> QexResult<Self> {
        let mut columns = Vec::new();
        for (alias, schema) in parts {
            columns.extend(
                schema
                    .columns
                    .iter()
                    .map(|c| Column::new(format!("{}.{}", alias, c.attribute()), c.tag)),
            );
        }
        Self::new(columns)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, position: usize) -> Option<&Column> {
        self.columns.get(position)
    }

    pub fn get(&self, name: &str) -> Option<(usize, TypeTag)> {
        self.index
            .get(name)
            .map(|&pos| (pos, self.columns[pos].tag))
    }

    pub fn position(&self, name: &str) -> QexResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| QexError::ColumnNotFound(name.to_string()))
    }

    pub fn tags(&self) -> impl Iterator<Item = TypeTag> + '_ {
        self.columns.iter().map(|c| c.tag)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.columns == other.columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sailors() -> Schema {
        Schema::from_pairs(&[
            ("Sailors.A", TypeTag::Integer),
            ("Sailors.B", TypeTag::Text),
            ("Sailors.C", TypeTag::Float),
        ])
        .unwrap()
    }

    #[test]
    fn positions_are_dense() {
        let schema = sailors();
        assert_eq!(schema.len(), 3);
        assert_eq!(schema.get("Sailors.A"), Some((0, TypeTag::Integer)));
        assert_eq!(schema.get("Sailors.C"), Some((2, TypeTag::Float)));
        assert_eq!(schema.position("Sailors.B").unwrap(), 1);
    }

    #[test]
    fn duplicate_rejected() {
        let err = Schema::from_pairs(&[("T.a", TypeTag::Integer), ("T.a", TypeTag::Text)])
            .unwrap_err();
        assert!(matches!(err, QexError::Schema(_)));
    }

    #[test]
    fn unknown_column() {
        let err = sailors().position("Sailors.Z").unwrap_err();
        assert!(matches!(err, QexError::ColumnNotFound(_)));
    }

    #[test]
    fn requalified_concat() {
        let boats = Schema::from_pairs(&[("Boats.D", TypeTag::Integer)]).unwrap();
        let joined = Schema::concat_qualified([("S", &sailors()), ("B", &boats)]).unwrap();
        let names: Vec<_> = joined.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["S.A", "S.B", "S.C", "B.D"]);
        assert_eq!(joined.get("B.D"), Some((3, TypeTag::Integer)));
    }

    #[test]
    fn self_join_needs_distinct_aliases() {
        let s = sailors();
        assert!(Schema::concat_qualified([("S", &s), ("S", &s)]).is_err());
        assert!(Schema::concat_qualified([("S1", &s), ("S2", &s)]).is_ok());
    }

    #[test]
    fn column_name_parts() {
        let c = Column::new("Sailors.A", TypeTag::Integer);
        assert_eq!(c.relation(), "Sailors");
        assert_eq!(c.attribute(), "A");
        let agg = Column::new("COUNT(*)", TypeTag::Integer);
        assert_eq!(agg.relation(), "");
        assert_eq!(agg.attribute(), "COUNT(*)");
    }
}
