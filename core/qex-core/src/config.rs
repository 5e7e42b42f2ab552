//! Executor configuration — directories and the external sort buffer budget
//!
//! One `ExecutorConfig` is built per query and passed by reference into the
//! operators that touch the file system (scan path resolution, external sort,
//! group-by, result dumps).

use crate::error::{QexError, QexResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 외부 정렬 기본 버퍼 페이지 수
pub const DEFAULT_BUFFER_PAGES: usize = 10;

/// Executor configuration.
///
/// # Example
///
/// ```rust
/// use qex_core::ExecutorConfig;
///
/// let config = ExecutorConfig::default()
///     .with_input_dir("./data")
///     .with_buffer_pages(4);
/// assert_eq!(config.buffer_pages(), 4);
/// assert!(config.relation_path("Sailors").ends_with("data/Sailors"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Directory holding relation files
    input_dir: PathBuf,
    /// Directory receiving dumped query results
    output_dir: PathBuf,
    /// Directory for sort runs and group-by statistics files
    temp_dir: PathBuf,
    /// Number of 16 KB pages the external sort may hold at once (B)
    buffer_pages: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            temp_dir: std::env::temp_dir(),
            buffer_pages: DEFAULT_BUFFER_PAGES,
        }
    }
}

impl ExecutorConfig {
    /// Create a config whose three directories all point at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            input_dir: root.to_path_buf(),
            output_dir: root.to_path_buf(),
            temp_dir: root.to_path_buf(),
            buffer_pages: DEFAULT_BUFFER_PAGES,
        }
    }

    /// Load a config from a JSON document.
    ///
    /// Missing fields fall back to [`ExecutorConfig::default`].
    pub fn from_json_str(json: &str) -> QexResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a JSON file.
    pub fn from_json_file(path: &Path) -> QexResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            QexError::Config(format!("cannot read config file {:?}: {}", path, e))
        })?;
        Self::from_json_str(&text)
    }

    // ===== Builders =====

    pub fn with_input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.input_dir = dir.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    /// Set the external sort buffer budget (in pages).
    pub fn with_buffer_pages(mut self, pages: usize) -> Self {
        self.buffer_pages = pages;
        self
    }

    // ===== Accessors =====

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn buffer_pages(&self) -> usize {
        self.buffer_pages
    }

    /// 릴레이션 이름 → 입력 디렉토리 안의 파일 경로
    pub fn relation_path(&self, relation: &str) -> PathBuf {
        self.input_dir.join(relation)
    }

    /// Check the settings an operator relies on before doing any I/O.
    pub fn validate(&self) -> QexResult<()> {
        if self.buffer_pages == 0 {
            return Err(QexError::Config(
                "buffer_pages must be at least 1".to_string(),
            ));
        }
        if !self.temp_dir.is_dir() {
            return Err(QexError::Config(format!(
                "temp directory {:?} does not exist",
                self.temp_dir
            )));
        }
        Ok(())
    }
}
