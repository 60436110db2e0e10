pub mod error;
pub mod problem;
pub mod store;

pub use error::StoreError;
pub use problem::{Problem, ProblemFields};
pub use store::{FileStore, KeyValueStore, MemoryStore, ProblemStore};
