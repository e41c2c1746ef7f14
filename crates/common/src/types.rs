use serde::{Deserialize, Serialize};

// Byte length of a SHA-256 digest
pub const DIGEST_LEN: usize = 32;

// Content digest: the SHA-256 hash of one file's raw bytes,
// compared only by byte equality
pub type Digest = [u8; DIGEST_LEN];

// Opaque identifier of a committed batch of files
pub type BatchId = String;

// Name of a file inside a batch
pub type FileId = String;

// Configuration for the file-verification backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub data_dir: String,
    pub dummy_file_count: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        SystemConfig {
            data_dir: "files".to_string(),
            dummy_file_count: 1000,
        }
    }
}

/// Encode a digest for the system boundary (wire, logs)
pub fn digest_to_hex(digest: &Digest) -> String {
    hex::encode(digest)
}

/// Decode a boundary hex string back into a digest.
/// Returns `None` on bad hex or wrong length.
pub fn digest_from_hex(s: &str) -> Option<Digest> {
    let bytes = hex::decode(s).ok()?;
    <Digest>::try_from(bytes.as_slice()).ok()
}

/// Serde helpers so digests cross the boundary hex-encoded
/// instead of as 32-element number arrays.
pub mod serde_hex {
    use super::{Digest, DIGEST_LEN};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(digest: &Digest, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(digest))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Digest, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(de::Error::custom)?;
        <Digest>::try_from(bytes.as_slice())
            .map_err(|_| de::Error::custom(format!("digest must be {} bytes", DIGEST_LEN)))
    }
}
