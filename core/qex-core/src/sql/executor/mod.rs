//! Query Executor Module

pub mod comparator;
pub mod dump;
pub mod expr;
pub mod external_sort;
pub mod operators;

pub use comparator::{TupleComparator, sort_tuples};
pub use expr::{Evaluator, RowEvaluator, evaluate_expr};
pub use external_sort::ExternalSort;
pub use operators::{
    CartesianOperator, DistinctOperator, ExternalSortOperator, FilterOperator, GroupByOperator,
    HavingOperator, PhysicalOperator, ProjectionOperator, SelectItem, SortOperator,
    TableScanOperator, TempScanOperator, ValuesOperator, collect_all,
};
