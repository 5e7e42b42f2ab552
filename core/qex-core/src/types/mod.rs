//! Value, tuple and schema model shared by the codec and every operator

mod schema;
mod tuple;
mod value;

pub use schema::{Column, Schema};
pub use tuple::{SourceIds, Tuple};
pub use value::{TypeTag, Value};
