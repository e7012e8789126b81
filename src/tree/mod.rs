//! Classification trees: parallel-array storage and work-queue growth.

mod grower;
mod storage;

pub use grower::{GrowParams, TreeGrower};
pub use storage::Tree;
