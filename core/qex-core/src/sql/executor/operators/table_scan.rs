//! TableScan Operator — page-by-page relation file decoding

use crate::config::ExecutorConfig;
use crate::error::{QexError, QexResult};
use crate::sql::executor::operators::PhysicalOperator;
use crate::storage::{PageStream, open_relation};
use crate::types::{Schema, Tuple};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

enum ScanState {
    /// File closed; the next call opens it and re-reads the header
    Unopened,
    Reading(PageStream<BufReader<File>>),
    Exhausted,
}

/// 테이블 스캔 연산자 — 릴레이션 파일을 한 페이지씩 읽어 튜플을 반환
pub struct TableScanOperator {
    path: PathBuf,
    schema: Schema,
    table_count: usize,
    state: ScanState,
    /// Most recently returned tuple
    current: Option<Tuple>,
}

impl TableScanOperator {
    /// Open a relation file and read its header.
    pub fn open(path: impl AsRef<Path>) -> QexResult<Self> {
        let path = path.as_ref().to_path_buf();
        let (schema, stream) = open_relation(&path)?;
        let table_count = stream.layout().table_count();
        tracing::debug!(path = %path.display(), attributes = schema.len(), "table scan opened");
        Ok(Self {
            path,
            schema,
            table_count,
            state: ScanState::Reading(stream),
            current: None,
        })
    }

    /// Open relation `name` inside the configured input directory.
    pub fn from_config(config: &ExecutorConfig, name: &str) -> QexResult<Self> {
        Self::open(config.relation_path(name))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The tuple returned by the last successful `next`.
    pub fn current(&self) -> Option<&Tuple> {
        self.current.as_ref()
    }
}

impl PhysicalOperator for TableScanOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn table_count(&self) -> usize {
        self.table_count
    }

    fn next(&mut self) -> QexResult<Option<Tuple>> {
        if let ScanState::Unopened = self.state {
            let (schema, stream) = open_relation(&self.path)?;
            if schema != self.schema {
                return Err(QexError::CorruptPage(format!(
                    "{} header changed since the scan was opened",
                    self.path.display()
                )));
            }
            self.state = ScanState::Reading(stream);
        }

        let next = match &mut self.state {
            ScanState::Reading(stream) => stream.next_tuple()?,
            _ => None,
        };
        match &next {
            Some(tuple) => self.current = Some(tuple.clone()),
            None => self.state = ScanState::Exhausted,
        }
        Ok(next)
    }

    fn reset(&mut self) -> QexResult<()> {
        self.state = ScanState::Unopened;
        self.current = None;
        Ok(())
    }
}
