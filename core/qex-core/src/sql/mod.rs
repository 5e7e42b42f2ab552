// 쿼리 실행 모듈 진입점
pub mod executor;
pub mod planner;

pub use executor::{
    CartesianOperator, DistinctOperator, Evaluator, ExternalSort, ExternalSortOperator,
    FilterOperator, GroupByOperator, HavingOperator, PhysicalOperator, ProjectionOperator,
    RowEvaluator, SelectItem, SortOperator, TableScanOperator, TempScanOperator, TupleComparator,
    ValuesOperator, collect_all, evaluate_expr,
};
pub use planner::{BinaryOperator, Expr, SortDirection, SortKey};
