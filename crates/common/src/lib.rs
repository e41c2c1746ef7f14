pub mod types;

// Re-export commonly used types
pub use types::{digest_from_hex, digest_to_hex, BatchId, Digest, FileId, SystemConfig, DIGEST_LEN};
