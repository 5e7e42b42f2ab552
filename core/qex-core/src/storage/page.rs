//! Fixed-size page framing
//!
//! Every data page is `PAGE_SIZE` bytes: a 4-byte big-endian tuple count
//! followed by that many packed records. A record never straddles two pages.

use crate::error::{QexError, QexResult};
use std::io::{ErrorKind, Read, Write};

/// 페이지 크기 (16 KB)
pub const PAGE_SIZE: usize = 16_384;

/// Bytes taken by the tuple count at the start of a data page.
pub const PAGE_HEADER_SIZE: usize = 4;

/// Largest record a data page can hold.
pub const PAGE_CAPACITY: usize = PAGE_SIZE - PAGE_HEADER_SIZE;

/// Reject a record that could never be placed on a page.
pub fn check_record_size(len: usize) -> QexResult<()> {
    if len > PAGE_CAPACITY {
        return Err(QexError::RecordTooLarge {
            size: len,
            capacity: PAGE_CAPACITY,
        });
    }
    Ok(())
}

/// 페이지 빌더 — 인코딩된 레코드를 한 페이지에 채움
pub struct PageBuilder {
    buf: Vec<u8>,
    count: u32,
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PageBuilder {
    pub fn new() -> Self {
        let mut buf = Vec::with_capacity(PAGE_SIZE);
        buf.extend_from_slice(&[0u8; PAGE_HEADER_SIZE]);
        Self { buf, count: 0 }
    }

    /// Append a record if it fits; returns `false` (and leaves the page
    /// untouched) when the record must go to the next page.
    pub fn push(&mut self, record: &[u8]) -> bool {
        if self.buf.len() + record.len() > PAGE_SIZE {
            return false;
        }
        self.buf.extend_from_slice(record);
        self.count += 1;
        true
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Bytes still free on this page.
    pub fn remaining(&self) -> usize {
        PAGE_SIZE - self.buf.len()
    }

    /// Zero-pad to a full page, stamp the count and return the page bytes.
    pub fn finish(&mut self) -> &[u8] {
        self.buf.resize(PAGE_SIZE, 0);
        self.buf[..PAGE_HEADER_SIZE].copy_from_slice(&self.count.to_be_bytes());
        &self.buf
    }

    /// Start a fresh page, keeping the allocation.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.buf.extend_from_slice(&[0u8; PAGE_HEADER_SIZE]);
        self.count = 0;
    }
}

/// Writes whole pages to an underlying sink.
pub struct PageWriter<W: Write> {
    sink: W,
    pages_written: u64,
}

impl<W: Write> PageWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            pages_written: 0,
        }
    }

    /// Write a raw page (header pages are built by the caller).
    pub fn write_raw(&mut self, page: &[u8]) -> QexResult<()> {
        debug_assert_eq!(page.len(), PAGE_SIZE);
        self.sink.write_all(page)?;
        self.pages_written += 1;
        Ok(())
    }

    /// Flush a builder's page and reset the builder.
    pub fn write_page(&mut self, page: &mut PageBuilder) -> QexResult<()> {
        self.sink.write_all(page.finish())?;
        self.pages_written += 1;
        page.clear();
        Ok(())
    }

    pub fn pages_written(&self) -> u64 {
        self.pages_written
    }

    pub fn flush(&mut self) -> QexResult<()> {
        self.sink.flush()?;
        Ok(())
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Reads whole pages from an underlying source.
pub struct PageReader<R: Read> {
    source: R,
    pages_read: u64,
}

impl<R: Read> PageReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            pages_read: 0,
        }
    }

    /// Fill `page` with the next page.
    ///
    /// Returns `Ok(false)` at a clean end of file. A page cut short by the
    /// end of file is corrupt.
    pub fn read_page(&mut self, page: &mut [u8]) -> QexResult<bool> {
        debug_assert_eq!(page.len(), PAGE_SIZE);
        let mut filled = 0;
        while filled < page.len() {
            match self.source.read(&mut page[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if filled == 0 {
            return Ok(false);
        }
        if filled < page.len() {
            return Err(QexError::CorruptPage(format!(
                "short page: {} of {} bytes after page {}",
                filled,
                PAGE_SIZE,
                self.pages_read
            )));
        }
        self.pages_read += 1;
        Ok(true)
    }

    pub fn pages_read(&self) -> u64 {
        self.pages_read
    }
}
