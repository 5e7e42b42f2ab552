//! # QEX — Paged Relational Query Executor
//!
//! QEX는 고정 크기(16 KB) 바이너리 페이지 위에서 동작하는 단일 노드 쿼리 실행기입니다.
//! Volcano 스타일 pull 연산자 트리로 결과 튜플을 스트리밍하며, ORDER BY / DISTINCT /
//! GROUP BY 입력이 메모리보다 크면 버퍼 페이지 수(B)로 제한된 외부 병합 정렬을 사용합니다.
//!
//! ## 빠른 시작
//!
//! ```rust
//! use qex_core::sql::{Expr, FilterOperator, PhysicalOperator, RowEvaluator, TableScanOperator};
//! use qex_core::storage::RelationWriter;
//! use qex_core::types::{Schema, TypeTag, Value};
//! use std::sync::Arc;
//!
//! # fn main() -> qex_core::QexResult<()> {
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("Sailors");
//!
//! // 릴레이션 파일 작성
//! let schema = Schema::from_pairs(&[("Sailors.A", TypeTag::Integer), ("Sailors.B", TypeTag::Text)])?;
//! let mut writer = RelationWriter::create(&path, &schema)?;
//! writer.append_values(vec![Value::Integer(1), Value::from("Anna")])?;
//! writer.append_values(vec![Value::Integer(7), Value::from("Bo")])?;
//! writer.finish()?;
//!
//! // SELECT * FROM Sailors WHERE Sailors.A > 3
//! let scan = TableScanOperator::open(&path)?;
//! let predicate = Expr::col("Sailors.A").gt(Expr::lit(3i64));
//! let mut filter = FilterOperator::new(Box::new(scan), Some(predicate), Arc::new(RowEvaluator));
//!
//! let row = filter.next()?.expect("one matching row");
//! assert_eq!(row.value(1), Some(&Value::from("Bo")));
//! assert!(filter.next()?.is_none());
//! # Ok(())
//! # }
//! ```
//!
//! ## 실행 파이프라인
//!
//! ```text
//! Relation file → TableScan → Filter → Cartesian → GroupBy / Sort → Distinct
//!              → Projection → dump
//! ```
//!
//! ## 모듈 구조
//!
//! - [`types`] — Value, Tuple, Schema
//! - [`storage`] — 페이지 코덱, 릴레이션 파일, 정렬 런 파일
//! - [`sql`] — 표현식, 물리 연산자, 외부 정렬
//! - [`config`] — 실행기 설정 ([`ExecutorConfig`])
//! - [`error`] — 에러 타입 ([`QexError`])

pub mod config;
pub mod error;
pub mod sql;
pub mod storage;
pub mod types;

// Logging utilities
pub mod logging;

// ===== Re-exports =====
pub use config::{DEFAULT_BUFFER_PAGES, ExecutorConfig};
pub use error::{QexError, QexResult};
pub use types::{Column, Schema, Tuple, TypeTag, Value};
