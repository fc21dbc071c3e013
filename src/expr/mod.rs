pub mod column;
pub mod csc;

pub use column::{ColumnView, SparseColumns};
pub use csc::CscMatrix;
