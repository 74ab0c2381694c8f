//! In-memory corpus store.

use parking_lot::RwLock;

use crate::corpus::store::CorpusStore;
use crate::corpus::types::TrainingExample;
use crate::error::Result;

/// Corpus kept in process memory. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryCorpusStore {
    examples: RwLock<Vec<TrainingExample>>,
}

impl MemoryCorpusStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-filled with `examples`.
    pub fn with_examples(examples: Vec<TrainingExample>) -> Self {
        MemoryCorpusStore {
            examples: RwLock::new(examples),
        }
    }
}

impl CorpusStore for MemoryCorpusStore {
    fn find_all(&self) -> Result<Vec<TrainingExample>> {
        Ok(self.examples.read().clone())
    }

    fn save(&self, example: TrainingExample) -> Result<()> {
        self.examples.write().push(example);
        Ok(())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.examples.read().len())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
