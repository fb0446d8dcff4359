//! Language-independent planning shared by every backend.

pub mod bitfield;
pub mod builder;
pub mod codec;
pub mod dump;
pub mod equality;
pub mod initial;
pub mod plan;
pub mod storage;

pub use builder::PlanBuilder;
pub use plan::*;
pub use storage::{StorageWrapper, collect_storage_types};
