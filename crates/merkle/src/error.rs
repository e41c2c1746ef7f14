use common::BatchId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MerkleError {
    #[error("Cannot build a tree from an empty leaf sequence")]
    EmptyInput,

    #[error("Leaf digest not found in tree: {0}")]
    LeafNotFound(String),

    #[error("Leaf index out of range: {0}")]
    LeafIndexOutOfRange(usize),

    #[error("No tree registered for batch: {0}")]
    TreeNotFound(BatchId),

    #[error("A tree is already registered for batch: {0}")]
    AlreadyExists(BatchId),

    #[error("File not found in batch {batch_id}: {name}")]
    FileNotFound { batch_id: BatchId, name: String },

    #[error("Batch not found in store: {0}")]
    BatchNotFound(BatchId),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
