//! Storage boundary for the training corpus.

use crate::corpus::types::TrainingExample;
use crate::error::Result;

/// Append-only training corpus.
///
/// Implementations must make `save` atomic: a concurrent `find_all` sees an
/// example either completely or not at all.
pub trait CorpusStore: Send + Sync + std::fmt::Debug {
    /// Snapshot of every stored example in insertion order.
    fn find_all(&self) -> Result<Vec<TrainingExample>>;

    /// Append one example.
    fn save(&self, example: TrainingExample) -> Result<()>;

    /// Number of stored examples.
    fn count(&self) -> Result<usize>;

    /// Whether the store holds no example.
    fn is_empty(&self) -> Result<bool> {
        Ok(self.count()? == 0)
    }

    /// Append many examples, returning the count after each append.
    fn save_all(&self, examples: Vec<TrainingExample>) -> Result<Vec<usize>> {
        let mut counts = Vec::with_capacity(examples.len());
        for example in examples {
            self.save(example)?;
            counts.push(self.count()?);
        }
        Ok(counts)
    }

    /// Name of this store for logging.
    fn name(&self) -> &str;
}
