//! Result dump — human-readable rendering of an operator's output
//!
//! ```text
//! id | Sailors.A | Sailors.B
//! ---+-----------+----------
//! 1  | 64        | Anna
//! ```
//! The first column is the tuple's first source identifier.

use crate::config::ExecutorConfig;
use crate::error::QexResult;
use crate::sql::executor::operators::PhysicalOperator;
use std::fmt::Write as _;
use std::path::PathBuf;

const ID_HEADER: &str = "id";

/// Drain `op` and render its tuples as an aligned text table.
pub fn render(op: &mut dyn PhysicalOperator) -> QexResult<String> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let header: Vec<String> = std::iter::once(ID_HEADER.to_string())
        .chain(op.schema().columns().iter().map(|c| c.name.clone()))
        .collect();
    while let Some(tuple) = op.next()? {
        let id = tuple
            .source_ids()
            .first()
            .map_or_else(String::new, |id| id.to_string());
        rows.push(
            std::iter::once(id)
                .chain(tuple.values().iter().map(|v| v.to_string()))
                .collect(),
        );
    }

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    write_row(&mut out, &header, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(rule.join("-+-").as_str());
    out.push('\n');
    for row in &rows {
        write_row(&mut out, row, &widths);
    }
    Ok(out)
}

fn write_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let last = cells.len().saturating_sub(1);
    for (i, (cell, width)) in cells.iter().zip(widths).enumerate() {
        if i == last {
            out.push_str(cell);
        } else {
            let _ = write!(out, "{:<width$} | ", cell, width = *width);
        }
    }
    out.push('\n');
}

/// Render `op` into `<output_dir>/<index>` and return the file path.
pub fn dump_to_file(
    op: &mut dyn PhysicalOperator,
    config: &ExecutorConfig,
    index: usize,
) -> QexResult<PathBuf> {
    let table = render(op)?;
    let path = config.output_dir().join(index.to_string());
    std::fs::write(&path, table)?;
    tracing::debug!(path = %path.display(), "query result dumped");
    Ok(path)
}
