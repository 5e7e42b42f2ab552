//! Relation files — header page + data pages
//!
//! Header page layout:
//! ```text
//! [table_count: u8] { [name_len: u8] [name bytes] [type tag: u8] }* [0u8]
//! ```
//! padded with zeros to `PAGE_SIZE`. Data pages follow, holding records in
//! the relation layout of [`RecordLayout::relation`].

use crate::error::{QexError, QexResult};
use crate::storage::codec::{PageStream, RecordLayout};
use crate::storage::page::{PAGE_SIZE, PageBuilder, PageReader, PageWriter};
use crate::types::{Column, Schema, SourceIds, Tuple, TypeTag, Value};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Build the header page for `schema`.
pub fn encode_header(schema: &Schema) -> QexResult<Vec<u8>> {
    let layout = RecordLayout::relation(schema);
    let table_count = u8::try_from(layout.table_count()).map_err(|_| {
        QexError::Schema(format!(
            "{} relations do not fit in a header",
            layout.table_count()
        ))
    })?;

    let mut page = Vec::with_capacity(PAGE_SIZE);
    page.push(table_count);
    for column in schema.columns() {
        let len = u8::try_from(column.name.len())
            .ok()
            .filter(|len| *len > 0)
            .ok_or_else(|| {
                QexError::Schema(format!("invalid attribute name '{}'", column.name))
            })?;
        page.push(len);
        page.extend_from_slice(column.name.as_bytes());
        page.push(column.tag.as_byte());
    }
    page.push(0);

    if page.len() > PAGE_SIZE {
        return Err(QexError::Schema(format!(
            "header needs {} bytes, page holds {}",
            page.len(),
            PAGE_SIZE
        )));
    }
    page.resize(PAGE_SIZE, 0);
    Ok(page)
}

/// Parse a header page into the relation schema and its record layout.
pub fn decode_header(page: &[u8]) -> QexResult<(Schema, RecordLayout)> {
    let truncated = || QexError::CorruptPage("header runs past page end".to_string());

    let table_count = *page.first().ok_or_else(truncated)? as usize;
    let mut offset = 1;
    let mut columns = Vec::new();
    loop {
        let len = *page.get(offset).ok_or_else(truncated)? as usize;
        offset += 1;
        if len == 0 {
            break;
        }
        let name = page.get(offset..offset + len).ok_or_else(truncated)?;
        let name = std::str::from_utf8(name)
            .map_err(|e| QexError::CorruptPage(format!("invalid attribute name: {}", e)))?;
        offset += len;
        let tag = TypeTag::from_byte(*page.get(offset).ok_or_else(truncated)?)?;
        offset += 1;
        columns.push(Column::new(name, tag));
    }

    let schema = Schema::new(columns)
        .map_err(|e| QexError::CorruptPage(format!("bad header schema: {}", e)))?;
    let layout = RecordLayout::relation(&schema);
    if layout.table_count() != table_count {
        return Err(QexError::CorruptPage(format!(
            "header declares {} relations, attributes name {}",
            table_count,
            layout.table_count()
        )));
    }
    Ok((schema, layout))
}

/// Open a relation file: parse its header page and return a stream
/// positioned at the first data page.
pub fn open_relation(path: &Path) -> QexResult<(Schema, PageStream<BufReader<File>>)> {
    let mut reader = PageReader::new(BufReader::new(File::open(path)?));
    let mut header = vec![0u8; PAGE_SIZE];
    if !reader.read_page(&mut header)? {
        return Err(QexError::CorruptPage(format!(
            "{} has no header page",
            path.display()
        )));
    }
    let (schema, layout) = decode_header(&header)?;
    Ok((schema, PageStream::new(reader, layout)))
}

/// 릴레이션 파일 작성기
///
/// Records are packed page by page; a page is written when the next record
/// would not fit and at [`RelationWriter::finish`].
pub struct RelationWriter {
    path: PathBuf,
    layout: RecordLayout,
    writer: PageWriter<BufWriter<File>>,
    page: PageBuilder,
    scratch: Vec<u8>,
    rows: u64,
}

impl RelationWriter {
    /// Create (or truncate) `path` and write the header page.
    pub fn create(path: impl AsRef<Path>, schema: &Schema) -> QexResult<Self> {
        let path = path.as_ref().to_path_buf();
        let header = encode_header(schema)?;
        let mut writer = PageWriter::new(BufWriter::new(File::create(&path)?));
        writer.write_raw(&header)?;
        tracing::debug!(path = %path.display(), attributes = schema.len(), "relation file created");
        Ok(Self {
            path,
            layout: RecordLayout::relation(schema),
            writer,
            page: PageBuilder::new(),
            scratch: Vec::new(),
            rows: 0,
        })
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Append a live tuple; its identifiers are written as given.
    pub fn append(&mut self, tuple: &Tuple) -> QexResult<()> {
        self.scratch.clear();
        self.layout.encode_into(tuple, &mut self.scratch)?;
        self.push_record()?;
        self.rows += 1;
        Ok(())
    }

    /// Append a row, numbering it `rows + 1` in every identifier slot.
    pub fn append_values(&mut self, values: Vec<Value>) -> QexResult<()> {
        let id = self.rows + 1;
        let ids: SourceIds = std::iter::repeat_n(id, self.layout.table_count()).collect();
        self.append(&Tuple::new(values, ids))
    }

    /// Append a record flagged as deleted; scans skip it.
    pub fn append_deleted(&mut self, tuple: &Tuple) -> QexResult<()> {
        self.scratch.clear();
        self.layout.encode_deleted_into(tuple, &mut self.scratch)?;
        self.push_record()
    }

    fn push_record(&mut self) -> QexResult<()> {
        if !self.page.push(&self.scratch) {
            self.writer.write_page(&mut self.page)?;
            self.page.push(&self.scratch);
        }
        Ok(())
    }

    /// Flush the last page and return the number of live rows written.
    pub fn finish(mut self) -> QexResult<u64> {
        if !self.page.is_empty() {
            self.writer.write_page(&mut self.page)?;
        }
        self.writer.flush()?;
        tracing::debug!(
            path = %self.path.display(),
            rows = self.rows,
            pages = self.writer.pages_written(),
            "relation file finished"
        );
        Ok(self.rows)
    }
}
