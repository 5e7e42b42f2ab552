//! External Merge Sort — buffer-bounded multi-pass disk sort
//!
//! Pass 1 fills `B` pages worth of tuples (packed exactly as a run writer
//! would pack them), sorts them in memory and writes one run per fill.
//! Pass 2 repeatedly merges groups of up to `B - 1` runs through a min-heap
//! until a single run remains. Merged runs are dropped, and their files
//! deleted, as soon as their group has been written out.

use crate::config::ExecutorConfig;
use crate::error::{QexError, QexResult};
use crate::sql::executor::comparator::{TupleComparator, sort_tuples};
use crate::sql::executor::operators::PhysicalOperator;
use crate::storage::page::{PAGE_HEADER_SIZE, PAGE_SIZE, check_record_size};
use crate::storage::{RecordLayout, RunReader, RunWriter, SortedRun};
use crate::types::Tuple;
use std::cmp::Ordering;
use std::path::PathBuf;
use std::time::Instant;
use tracing::instrument;

/// 외부 정렬기 — 버퍼 페이지 수(B)로 메모리 사용량을 제한
pub struct ExternalSort {
    comparator: TupleComparator,
    buffer_pages: usize,
    temp_dir: PathBuf,
}

impl ExternalSort {
    pub fn new(comparator: TupleComparator, config: &ExecutorConfig) -> Self {
        Self {
            comparator,
            buffer_pages: config.buffer_pages().max(1),
            temp_dir: config.temp_dir().to_path_buf(),
        }
    }

    pub fn with_buffer_pages(mut self, pages: usize) -> Self {
        self.buffer_pages = pages.max(1);
        self
    }

    pub fn buffer_pages(&self) -> usize {
        self.buffer_pages
    }

    /// Runs merged per group in pass 2.
    pub fn fan_in(&self) -> usize {
        self.buffer_pages.saturating_sub(1).max(2)
    }

    /// Drain `input` and return a single sorted run.
    ///
    /// An empty input yields an empty run.
    #[instrument(skip_all, fields(buffer_pages = self.buffer_pages))]
    pub fn run(&self, input: &mut dyn PhysicalOperator) -> QexResult<SortedRun> {
        let start = Instant::now();
        let layout = RecordLayout::run(input.schema(), input.table_count());

        let mut runs = self.generate_runs(input, &layout)?;
        tracing::debug!(target: "sort", runs = runs.len(), "initial runs written");
        if runs.is_empty() {
            return RunWriter::create(&self.temp_dir, layout)?.finish();
        }

        let fan_in = self.fan_in();
        let mut pass = 0usize;
        while runs.len() > 1 {
            pass += 1;
            let mut merged = Vec::with_capacity(runs.len().div_ceil(fan_in));
            while !runs.is_empty() {
                let take = fan_in.min(runs.len());
                let group: Vec<SortedRun> = runs.drain(..take).collect();
                if group.len() == 1 {
                    merged.extend(group);
                    continue;
                }
                merged.push(self.merge_group(&group, &layout)?);
            }
            tracing::debug!(target: "sort", pass, runs = merged.len(), fan_in, "merge pass complete");
            runs = merged;
        }

        let result = runs
            .pop()
            .ok_or_else(|| QexError::Schema("merge produced no run".to_string()))?;
        tracing::debug!(
            target: "sort",
            tuples = result.tuples(),
            pages = result.pages(),
            passes = pass + 1,
            elapsed_us = start.elapsed().as_micros(),
            "external sort complete"
        );
        Ok(result)
    }

    /// Pass 1: one sorted run per buffer fill.
    fn generate_runs(
        &self,
        input: &mut dyn PhysicalOperator,
        layout: &RecordLayout,
    ) -> QexResult<Vec<SortedRun>> {
        let mut runs = Vec::new();
        // Tuple that did not fit in the previous fill
        let mut pending: Option<Tuple> = None;
        loop {
            let (mut buffer, exhausted) = self.fill_buffer(input, layout, &mut pending)?;
            if buffer.is_empty() {
                break;
            }
            sort_tuples(&mut buffer, &self.comparator)?;
            let mut writer = RunWriter::create(&self.temp_dir, layout.clone())?;
            for tuple in &buffer {
                writer.push(tuple)?;
            }
            let run = writer.finish()?;
            tracing::trace!(target: "sort", tuples = run.tuples(), pages = run.pages(), "run written");
            runs.push(run);
            if exhausted {
                break;
            }
        }
        Ok(runs)
    }

    /// Pull tuples until `B` pages are full. Returns the buffer and whether
    /// the input ran dry.
    fn fill_buffer(
        &self,
        input: &mut dyn PhysicalOperator,
        layout: &RecordLayout,
        pending: &mut Option<Tuple>,
    ) -> QexResult<(Vec<Tuple>, bool)> {
        let mut buffer = Vec::new();
        let mut pages_used = 1;
        let mut page_bytes = PAGE_HEADER_SIZE;
        loop {
            let tuple = match pending.take() {
                Some(tuple) => tuple,
                None => match input.next()? {
                    Some(tuple) => tuple,
                    None => return Ok((buffer, true)),
                },
            };
            let len = layout.encoded_len(&tuple);
            check_record_size(len)?;
            if page_bytes + len > PAGE_SIZE {
                if pages_used == self.buffer_pages {
                    *pending = Some(tuple);
                    return Ok((buffer, false));
                }
                pages_used += 1;
                page_bytes = PAGE_HEADER_SIZE;
            }
            page_bytes += len;
            buffer.push(tuple);
        }
    }

    /// Pass 2 step: k-way merge of one group into a new run.
    fn merge_group(&self, group: &[SortedRun], layout: &RecordLayout) -> QexResult<SortedRun> {
        let mut readers = group
            .iter()
            .map(SortedRun::open)
            .collect::<QexResult<Vec<RunReader>>>()?;
        let mut heap = MergeHeap::new(&self.comparator, readers.len());
        for (source, reader) in readers.iter_mut().enumerate() {
            if let Some(tuple) = reader.next_tuple()? {
                heap.push(tuple, source)?;
            }
        }

        let mut writer = RunWriter::create(&self.temp_dir, layout.clone())?;
        while let Some((tuple, source)) = heap.pop()? {
            writer.push(&tuple)?;
            if let Some(next) = readers[source].next_tuple()? {
                heap.push(next, source)?;
            }
        }
        writer.finish()
    }
}

/// 병합용 최소 힙 — 실패할 수 있는 비교기를 사용
///
/// Equal tuples leave the heap in source-run order.
struct MergeHeap<'a> {
    comparator: &'a TupleComparator,
    entries: Vec<(Tuple, usize)>,
}

impl<'a> MergeHeap<'a> {
    fn new(comparator: &'a TupleComparator, capacity: usize) -> Self {
        Self {
            comparator,
            entries: Vec::with_capacity(capacity),
        }
    }

    fn less(&self, i: usize, j: usize) -> QexResult<bool> {
        let (a, a_src) = &self.entries[i];
        let (b, b_src) = &self.entries[j];
        Ok(match self.comparator.compare(a, b)? {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => a_src < b_src,
        })
    }

    fn push(&mut self, tuple: Tuple, source: usize) -> QexResult<()> {
        self.entries.push((tuple, source));
        let mut i = self.entries.len() - 1;
        while i > 0 {
            let parent = (i - 1) / 2;
            if !self.less(i, parent)? {
                break;
            }
            self.entries.swap(i, parent);
            i = parent;
        }
        Ok(())
    }

    fn pop(&mut self) -> QexResult<Option<(Tuple, usize)>> {
        if self.entries.is_empty() {
            return Ok(None);
        }
        let last = self.entries.len() - 1;
        self.entries.swap(0, last);
        let top = self.entries.pop();

        let len = self.entries.len();
        let mut i = 0;
        loop {
            let left = 2 * i + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.less(right, left)? {
                right
            } else {
                left
            };
            if !self.less(child, i)? {
                break;
            }
            self.entries.swap(i, child);
            i = child;
        }
        Ok(top)
    }
}
