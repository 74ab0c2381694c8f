//! Training corpus: example types, storage backends and the bootstrap dataset.

pub mod file;
pub mod memory;
pub mod seed;
pub mod store;
pub mod types;

pub use file::JsonlCorpusStore;
pub use memory::MemoryCorpusStore;
pub use seed::{bootstrap_examples, seed_if_empty};
pub use store::CorpusStore;
pub use types::{Priority, TrainingExample};
