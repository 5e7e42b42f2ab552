//! Tuple Codec — record layouts for relation files and sort runs
//!
//! Value encoding:
//! - Integer → 8 bytes big-endian
//! - Float / Date / Time → 8 bytes IEEE-754 big-endian
//! - Text → 1 length byte + raw UTF-8 bytes
//! - Source identifier slot → 8 bytes big-endian
//!
//! Relation records start with a status byte (`1` live, `0` deleted) and
//! interleave one identifier slot in front of each relation's attributes.
//! Run records carry all identifiers first, then the payload, and no status
//! byte.

use crate::error::{QexError, QexResult};
use crate::storage::page::{PAGE_CAPACITY, PAGE_HEADER_SIZE, PAGE_SIZE, PageReader, check_record_size};
use crate::types::{Schema, SourceIds, Tuple, TypeTag, Value};
use std::io::Read;

const RECORD_LIVE: u8 = 1;
const RECORD_DELETED: u8 = 0;

/// 레코드 안의 한 칸
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// 8-byte source identifier
    SourceId,
    Value(TypeTag),
}

/// 레코드 레이아웃 — 슬롯 순서 + 상태 바이트 여부
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    slots: Vec<Slot>,
    status_byte: bool,
    table_count: usize,
    width: usize,
}

impl RecordLayout {
    /// Layout of a sort run / statistics file: identifiers, then payload.
    pub fn run(schema: &Schema, table_count: usize) -> Self {
        let mut slots = vec![Slot::SourceId; table_count];
        slots.extend(schema.tags().map(Slot::Value));
        Self {
            slots,
            status_byte: false,
            table_count,
            width: schema.len(),
        }
    }

    /// Layout of a relation file record.
    ///
    /// A new identifier slot opens whenever the relation prefix of the
    /// attribute name changes.
    pub fn relation(schema: &Schema) -> Self {
        let mut slots = Vec::with_capacity(schema.len() + 1);
        let mut current: Option<&str> = None;
        let mut table_count = 0;
        for column in schema.columns() {
            let relation = column.relation();
            if current != Some(relation) {
                slots.push(Slot::SourceId);
                table_count += 1;
                current = Some(relation);
            }
            slots.push(Slot::Value(column.tag));
        }
        Self {
            slots,
            status_byte: true,
            table_count,
            width: schema.len(),
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn table_count(&self) -> usize {
        self.table_count
    }

    /// Number of payload values per record.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Smallest possible encoded record (every text empty).
    pub fn min_record_len(&self) -> usize {
        let slots: usize = self
            .slots
            .iter()
            .map(|s| match s {
                Slot::Value(TypeTag::Text) => 1,
                _ => 8,
            })
            .sum();
        slots + usize::from(self.status_byte)
    }

    /// Encoded size of `tuple` under this layout.
    pub fn encoded_len(&self, tuple: &Tuple) -> usize {
        let values: usize = tuple
            .values()
            .iter()
            .map(|v| match v {
                Value::Text(s) => 1 + s.len(),
                _ => 8,
            })
            .sum();
        usize::from(self.status_byte) + self.table_count * 8 + values
    }

    /// Append the encoded record to `out`.
    pub fn encode_into(&self, tuple: &Tuple, out: &mut Vec<u8>) -> QexResult<()> {
        self.encode_with_status(tuple, RECORD_LIVE, out)
    }

    /// Encode a record flagged as deleted (relation layouts only).
    pub fn encode_deleted_into(&self, tuple: &Tuple, out: &mut Vec<u8>) -> QexResult<()> {
        if !self.status_byte {
            return Err(QexError::Schema(
                "run records have no status byte".to_string(),
            ));
        }
        self.encode_with_status(tuple, RECORD_DELETED, out)
    }

    fn encode_with_status(&self, tuple: &Tuple, status: u8, out: &mut Vec<u8>) -> QexResult<()> {
        if tuple.len() != self.width {
            return Err(QexError::Schema(format!(
                "tuple has {} values, layout expects {}",
                tuple.len(),
                self.width
            )));
        }
        if tuple.source_ids().len() != self.table_count {
            return Err(QexError::Schema(format!(
                "tuple has {} source ids, layout expects {}",
                tuple.source_ids().len(),
                self.table_count
            )));
        }

        let start = out.len();
        if self.status_byte {
            out.push(status);
        }
        let mut ids = tuple.source_ids().iter();
        let mut values = tuple.values().iter();
        for slot in &self.slots {
            match slot {
                Slot::SourceId => {
                    let id = ids.next().copied().unwrap_or_default();
                    out.extend_from_slice(&id.to_be_bytes());
                }
                Slot::Value(tag) => match values.next() {
                    Some(value) => encode_value(value, *tag, out)?,
                    None => {
                        return Err(QexError::Schema("tuple shorter than layout".to_string()));
                    }
                },
            }
        }

        if let Err(e) = check_record_size(out.len() - start) {
            out.truncate(start);
            return Err(e);
        }
        Ok(())
    }

    /// Decode one record at `*offset`, advancing the offset.
    ///
    /// Returns `Ok(None)` for a record flagged as deleted.
    pub fn decode(&self, page: &[u8], offset: &mut usize) -> QexResult<Option<Tuple>> {
        let mut live = true;
        if self.status_byte {
            match take(page, offset, 1)?[0] {
                RECORD_LIVE => {}
                RECORD_DELETED => live = false,
                other => {
                    return Err(QexError::CorruptPage(format!(
                        "invalid record status byte {}",
                        other
                    )));
                }
            }
        }

        let mut ids = SourceIds::new();
        let mut values = Vec::with_capacity(self.width);
        for slot in &self.slots {
            match slot {
                Slot::SourceId => ids.push(read_u64(page, offset)?),
                Slot::Value(tag) => values.push(decode_value(page, offset, *tag)?),
            }
        }

        Ok(live.then(|| Tuple::new(values, ids)))
    }
}

/// Encode a single tuple into a fresh buffer.
pub fn encode_tuple(tuple: &Tuple, layout: &RecordLayout) -> QexResult<Vec<u8>> {
    let mut out = Vec::with_capacity(layout.encoded_len(tuple));
    layout.encode_into(tuple, &mut out)?;
    Ok(out)
}

fn encode_value(value: &Value, tag: TypeTag, out: &mut Vec<u8>) -> QexResult<()> {
    if !value.matches_tag(tag) {
        return Err(QexError::type_mismatch(tag.to_string(), value.kind()));
    }
    match value {
        Value::Integer(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Float(v) => out.extend_from_slice(&v.to_be_bytes()),
        Value::Text(s) => {
            let len = u8::try_from(s.len()).map_err(|_| QexError::RecordTooLarge {
                size: s.len(),
                capacity: u8::MAX as usize,
            })?;
            out.push(len);
            out.extend_from_slice(s.as_bytes());
        }
        Value::File(_) => return Err(QexError::type_mismatch(tag.to_string(), value.kind())),
    }
    Ok(())
}

fn decode_value(page: &[u8], offset: &mut usize, tag: TypeTag) -> QexResult<Value> {
    match tag {
        TypeTag::Integer => Ok(Value::Integer(read_u64(page, offset)? as i64)),
        TypeTag::Float | TypeTag::Date | TypeTag::Time => {
            Ok(Value::Float(f64::from_bits(read_u64(page, offset)?)))
        }
        TypeTag::Text => {
            let len = take(page, offset, 1)?[0] as usize;
            let bytes = take(page, offset, len)?;
            let text = std::str::from_utf8(bytes)
                .map_err(|e| QexError::CorruptPage(format!("invalid text bytes: {}", e)))?;
            Ok(Value::Text(text.to_string()))
        }
    }
}

fn read_u64(page: &[u8], offset: &mut usize) -> QexResult<u64> {
    let bytes = take(page, offset, 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    Ok(u64::from_be_bytes(raw))
}

fn take<'a>(page: &'a [u8], offset: &mut usize, len: usize) -> QexResult<&'a [u8]> {
    let end = *offset + len;
    if end > page.len() {
        return Err(QexError::CorruptPage(format!(
            "record field at byte {} overruns page end",
            *offset
        )));
    }
    let bytes = &page[*offset..end];
    *offset = end;
    Ok(bytes)
}

/// 페이지 스트림 — 한 번에 한 페이지만 메모리에 두고 레코드를 순서대로 디코딩
pub struct PageStream<R: Read> {
    reader: PageReader<R>,
    layout: RecordLayout,
    page: Vec<u8>,
    /// Tuples stored on the current page
    limit: u32,
    /// Records already decoded from the current page
    cursor: u32,
    offset: usize,
}

impl<R: Read> PageStream<R> {
    pub fn new(reader: PageReader<R>, layout: RecordLayout) -> Self {
        Self {
            reader,
            layout,
            page: vec![0u8; PAGE_SIZE],
            limit: 0,
            cursor: 0,
            offset: PAGE_HEADER_SIZE,
        }
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Decode the next live record, reading pages as needed.
    pub fn next_tuple(&mut self) -> QexResult<Option<Tuple>> {
        loop {
            if self.cursor == self.limit {
                if !self.reader.read_page(&mut self.page)? {
                    return Ok(None);
                }
                self.load_page()?;
                continue;
            }
            let decoded = self.layout.decode(&self.page, &mut self.offset)?;
            self.cursor += 1;
            if let Some(tuple) = decoded {
                return Ok(Some(tuple));
            }
        }
    }

    fn load_page(&mut self) -> QexResult<()> {
        let mut raw = [0u8; PAGE_HEADER_SIZE];
        raw.copy_from_slice(&self.page[..PAGE_HEADER_SIZE]);
        let limit = u32::from_be_bytes(raw);
        let min_len = self.layout.min_record_len().max(1);
        if (limit as usize).saturating_mul(min_len) > PAGE_CAPACITY {
            return Err(QexError::CorruptPage(format!(
                "tuple count {} cannot fit in page {}",
                limit,
                self.reader.pages_read()
            )));
        }
        self.limit = limit;
        self.cursor = 0;
        self.offset = PAGE_HEADER_SIZE;
        Ok(())
    }
}
