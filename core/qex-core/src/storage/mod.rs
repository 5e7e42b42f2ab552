//! Storage module — paged binary files.
//!
//! - [`page`]: fixed-size page framing shared by every file
//! - [`codec`]: record layouts and value encoding
//! - [`relation`]: relation files (header page + data pages)
//! - [`run`]: headerless sort-run files owned by the executor

pub mod codec;
pub mod page;
pub mod relation;
pub mod run;

pub use codec::{PageStream, RecordLayout, Slot, encode_tuple};
pub use page::{PAGE_CAPACITY, PAGE_HEADER_SIZE, PAGE_SIZE, PageBuilder, PageReader, PageWriter};
pub use relation::{RelationWriter, decode_header, encode_header, open_relation};
pub use run::{RunReader, RunWriter, SortedRun};
