pub mod page_ops;
pub mod repository;
pub mod store;

pub use repository::{ChangeSet, Repository};
pub use store::Store;
