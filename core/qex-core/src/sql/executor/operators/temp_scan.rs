//! TempScan Operator — reads a sort run or statistics file

use crate::error::{QexError, QexResult};
use crate::sql::executor::operators::PhysicalOperator;
use crate::storage::{RunReader, SortedRun};
use crate::types::{Schema, Tuple};

/// 임시 파일 스캔 연산자 — 런 파일은 이 연산자가 소유하고, drop 시 삭제됨
pub struct TempScanOperator {
    run: SortedRun,
    schema: Schema,
    reader: Option<RunReader>,
}

impl TempScanOperator {
    /// The run's layout must hold exactly `schema.len()` values per record.
    pub fn new(run: SortedRun, schema: Schema) -> QexResult<Self> {
        if run.layout().width() != schema.len() {
            return Err(QexError::Schema(format!(
                "run holds {} values per record, schema has {}",
                run.layout().width(),
                schema.len()
            )));
        }
        Ok(Self {
            run,
            schema,
            reader: None,
        })
    }

    pub fn run(&self) -> &SortedRun {
        &self.run
    }
}

impl PhysicalOperator for TempScanOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn table_count(&self) -> usize {
        self.run.layout().table_count()
    }

    fn next(&mut self) -> QexResult<Option<Tuple>> {
        if self.reader.is_none() {
            self.reader = Some(self.run.open()?);
        }
        match &mut self.reader {
            Some(reader) => reader.next_tuple(),
            None => Ok(None),
        }
    }

    fn reset(&mut self) -> QexResult<()> {
        self.reader = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::executor::operators::collect_all;
    use crate::storage::{RecordLayout, RunWriter};
    use crate::types::{TypeTag, Value};
    use tempfile::tempdir;

    #[test]
    fn reads_and_rewinds() {
        let dir = tempdir().unwrap();
        let schema = Schema::from_pairs(&[("T.a", TypeTag::Integer)]).unwrap();
        let mut writer = RunWriter::create(dir.path(), RecordLayout::run(&schema, 1)).unwrap();
        for i in 0..4 {
            writer
                .push(&Tuple::with_source(vec![Value::Integer(i)], i as u64 + 10))
                .unwrap();
        }
        let mut scan = TempScanOperator::new(writer.finish().unwrap(), schema).unwrap();
        assert_eq!(scan.table_count(), 1);
        let rows = collect_all(&mut scan).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[3].source_ids(), &[13]);
        assert!(scan.next().unwrap().is_none());

        scan.reset().unwrap();
        assert_eq!(collect_all(&mut scan).unwrap(), rows);
    }

    #[test]
    fn file_removed_with_operator() {
        let dir = tempdir().unwrap();
        let schema = Schema::from_pairs(&[("T.a", TypeTag::Integer)]).unwrap();
        let run = RunWriter::create(dir.path(), RecordLayout::run(&schema, 1))
            .unwrap()
            .finish()
            .unwrap();
        let path = run.path().to_path_buf();
        let scan = TempScanOperator::new(run, schema).unwrap();
        assert!(path.exists());
        drop(scan);
        assert!(!path.exists());
    }

    #[test]
    fn width_mismatch_rejected() {
        let dir = tempdir().unwrap();
        let schema = Schema::from_pairs(&[("T.a", TypeTag::Integer)]).unwrap();
        let run = RunWriter::create(dir.path(), RecordLayout::run(&schema, 1))
            .unwrap()
            .finish()
            .unwrap();
        let wider = Schema::from_pairs(&[("T.a", TypeTag::Integer), ("T.b", TypeTag::Integer)])
            .unwrap();
        assert!(TempScanOperator::new(run, wider).is_err());
    }
}
