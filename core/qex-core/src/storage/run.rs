//! Sort runs — headerless temp files in the run layout
//!
//! A run file is deleted when the [`SortedRun`] owning it is dropped, so
//! superseded runs disappear as soon as the merge that consumed them is done,
//! and an aborted query leaves nothing behind.
//!
//! Pages move straight between the file and the page buffer, with no extra
//! I/O buffering on top, so a merge holds one page per open run.

use crate::error::QexResult;
use crate::storage::codec::{PageStream, RecordLayout};
use crate::storage::page::{PageBuilder, PageReader, PageWriter};
use crate::types::Tuple;
use std::fs::File;
use std::path::Path;
use tempfile::{NamedTempFile, TempPath};

const RUN_PREFIX: &str = "qex-run-";
const RUN_SUFFIX: &str = ".run";

/// 완성된 정렬 런 — 파일 소유권을 가짐
#[derive(Debug)]
pub struct SortedRun {
    path: TempPath,
    layout: RecordLayout,
    tuples: u64,
    pages: u64,
}

impl SortedRun {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    pub fn tuples(&self) -> u64 {
        self.tuples
    }

    pub fn pages(&self) -> u64 {
        self.pages
    }

    /// Open a fresh cursor at the first tuple.
    pub fn open(&self) -> QexResult<RunReader> {
        RunReader::open(&self.path, self.layout.clone())
    }
}

/// 런 작성기 — 페이지 단위로 레코드를 채워 임시 파일에 기록
pub struct RunWriter {
    layout: RecordLayout,
    writer: PageWriter<NamedTempFile>,
    page: PageBuilder,
    scratch: Vec<u8>,
    tuples: u64,
}

impl RunWriter {
    /// Create a new, uniquely named run file inside `temp_dir`.
    pub fn create(temp_dir: &Path, layout: RecordLayout) -> QexResult<Self> {
        let file = tempfile::Builder::new()
            .prefix(RUN_PREFIX)
            .suffix(RUN_SUFFIX)
            .tempfile_in(temp_dir)?;
        tracing::trace!(path = %file.path().display(), "run file created");
        Ok(Self {
            layout,
            writer: PageWriter::new(file),
            page: PageBuilder::new(),
            scratch: Vec::new(),
            tuples: 0,
        })
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    pub fn path(&self) -> &Path {
        self.writer.get_ref().path()
    }

    pub fn push(&mut self, tuple: &Tuple) -> QexResult<()> {
        self.scratch.clear();
        self.layout.encode_into(tuple, &mut self.scratch)?;
        if !self.page.push(&self.scratch) {
            self.writer.write_page(&mut self.page)?;
            self.page.push(&self.scratch);
        }
        self.tuples += 1;
        Ok(())
    }

    /// Write the last page and hand the file over to a [`SortedRun`].
    pub fn finish(mut self) -> QexResult<SortedRun> {
        if !self.page.is_empty() {
            self.writer.write_page(&mut self.page)?;
        }
        self.writer.flush()?;
        let pages = self.writer.pages_written();
        let file = self.writer.into_inner();
        Ok(SortedRun {
            path: file.into_temp_path(),
            layout: self.layout,
            tuples: self.tuples,
            pages,
        })
    }
}

/// 런 커서 — 한 페이지씩 읽으며 튜플을 순서대로 반환
pub struct RunReader {
    stream: PageStream<File>,
}

impl RunReader {
    pub fn open(path: &Path, layout: RecordLayout) -> QexResult<Self> {
        let file = File::open(path)?;
        Ok(Self {
            stream: PageStream::new(PageReader::new(file), layout),
        })
    }

    pub fn next_tuple(&mut self) -> QexResult<Option<Tuple>> {
        self.stream.next_tuple()
    }
}
