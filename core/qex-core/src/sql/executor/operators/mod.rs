//! Physical Operators Module

mod cartesian;
mod distinct;
mod external_sort;
mod filter;
mod group_by;
mod physical_operator;
mod projection;
mod sort;
mod table_scan;
mod temp_scan;
mod values;

pub use cartesian::CartesianOperator;
pub use distinct::DistinctOperator;
pub use external_sort::ExternalSortOperator;
pub use filter::{FilterOperator, HavingOperator};
pub use group_by::GroupByOperator;
pub use physical_operator::{PhysicalOperator, collect_all};
pub use projection::{ProjectionOperator, SelectItem};
pub use sort::SortOperator;
pub use table_scan::TableScanOperator;
pub use temp_scan::TempScanOperator;
pub use values::ValuesOperator;
