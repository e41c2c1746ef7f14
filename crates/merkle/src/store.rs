use crate::error::MerkleError;
use crate::node::hash_data;
use common::{BatchId, Digest, FileId};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

/// 内容存储接口
///
/// 核心对外部存储只有两个要求：
/// - 给出批次内全部文件名，且顺序固定（规范顺序为文件名升序，
///   建树和重建都依赖同一顺序）
/// - 按需读取某个文件当前的原始字节
///
/// 原始字节的持久化方式（数据库、文件系统）由实现方决定。
pub trait ContentStore: Send + Sync {
    /// 批次内全部文件名，按规范顺序排列
    fn list_batch(&self, batch_id: &str) -> Result<Vec<FileId>, MerkleError>;

    /// 读取单个文件当前的原始字节
    fn read_file(&self, batch_id: &str, name: &str) -> Result<Vec<u8>, MerkleError>;
}

/// 按批次的规范顺序计算每个文件当前内容的叶子摘要
pub fn batch_leaf_digests(
    store: &dyn ContentStore,
    batch_id: &str,
) -> Result<Vec<Digest>, MerkleError> {
    let names = store.list_batch(batch_id)?;
    let mut digests = Vec::with_capacity(names.len());
    for name in &names {
        let data = store.read_file(batch_id, name)?;
        digests.push(hash_data(&data));
    }
    Ok(digests)
}

/// 内存内容存储（测试与演示用）
///
/// `BTreeMap` 保证 `list_batch` 天然按文件名升序返回，
/// 即批次的规范顺序。
#[derive(Debug, Default)]
pub struct MemoryStore {
    batches: RwLock<HashMap<BatchId, BTreeMap<FileId, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            batches: RwLock::new(HashMap::new()),
        }
    }

    /// 写入（或覆盖）批次内的一个文件
    pub fn put_file(&self, batch_id: &str, name: &str, data: Vec<u8>) -> Result<(), MerkleError> {
        let mut batches = self
            .batches
            .write()
            .map_err(|_| MerkleError::LockError("Failed to acquire write lock".to_string()))?;

        batches
            .entry(batch_id.to_string())
            .or_default()
            .insert(name.to_string(), data);
        Ok(())
    }

    /// 篡改已存在文件的内容而不重建对应的树
    ///
    /// 模拟提交树之后被改动的存储：承诺的根留在注册表里，
    /// 字节已经不一样了。文件不存在时返回 `FileNotFound`。
    pub fn corrupt_file(
        &self,
        batch_id: &str,
        name: &str,
        data: Vec<u8>,
    ) -> Result<(), MerkleError> {
        let mut batches = self
            .batches
            .write()
            .map_err(|_| MerkleError::LockError("Failed to acquire write lock".to_string()))?;

        let batch = batches
            .get_mut(batch_id)
            .ok_or_else(|| MerkleError::BatchNotFound(batch_id.to_string()))?;
        let entry = batch.get_mut(name).ok_or_else(|| MerkleError::FileNotFound {
            batch_id: batch_id.to_string(),
            name: name.to_string(),
        })?;

        *entry = data;
        Ok(())
    }

    /// 删除整个批次的文件
    pub fn remove_batch(&self, batch_id: &str) -> Result<(), MerkleError> {
        let mut batches = self
            .batches
            .write()
            .map_err(|_| MerkleError::LockError("Failed to acquire write lock".to_string()))?;

        batches
            .remove(batch_id)
            .map(|_| ())
            .ok_or_else(|| MerkleError::BatchNotFound(batch_id.to_string()))
    }
}

impl ContentStore for MemoryStore {
    fn list_batch(&self, batch_id: &str) -> Result<Vec<FileId>, MerkleError> {
        let batches = self
            .batches
            .read()
            .map_err(|_| MerkleError::LockError("Failed to acquire read lock".to_string()))?;

        let batch = batches
            .get(batch_id)
            .ok_or_else(|| MerkleError::BatchNotFound(batch_id.to_string()))?;
        Ok(batch.keys().cloned().collect())
    }

    fn read_file(&self, batch_id: &str, name: &str) -> Result<Vec<u8>, MerkleError> {
        let batches = self
            .batches
            .read()
            .map_err(|_| MerkleError::LockError("Failed to acquire read lock".to_string()))?;

        let batch = batches
            .get(batch_id)
            .ok_or_else(|| MerkleError::BatchNotFound(batch_id.to_string()))?;
        batch
            .get(name)
            .cloned()
            .ok_or_else(|| MerkleError::FileNotFound {
                batch_id: batch_id.to_string(),
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_read() {
        let store = MemoryStore::new();
        store.put_file("batch-1", "a.txt", b"Hello 0".to_vec()).unwrap();

        let data = store.read_file("batch-1", "a.txt").unwrap();
        assert_eq!(data, b"Hello 0");
    }

    #[test]
    fn test_list_batch_sorted_by_name() {
        let store = MemoryStore::new();
        store.put_file("batch-1", "c.txt", vec![3]).unwrap();
        store.put_file("batch-1", "a.txt", vec![1]).unwrap();
        store.put_file("batch-1", "b.txt", vec![2]).unwrap();

        let names = store.list_batch("batch-1").unwrap();
        assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    }

    #[test]
    fn test_missing_batch_and_file() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.list_batch("nope"),
            Err(MerkleError::BatchNotFound(_))
        ));

        store.put_file("batch-1", "a.txt", vec![]).unwrap();
        assert!(matches!(
            store.read_file("batch-1", "nope.txt"),
            Err(MerkleError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_corrupt_requires_existing_file() {
        let store = MemoryStore::new();
        store.put_file("batch-1", "a.txt", b"original".to_vec()).unwrap();

        assert!(store
            .corrupt_file("batch-1", "missing.txt", b"x".to_vec())
            .is_err());

        store
            .corrupt_file("batch-1", "a.txt", b"tampered".to_vec())
            .unwrap();
        assert_eq!(store.read_file("batch-1", "a.txt").unwrap(), b"tampered");
    }

    #[test]
    fn test_batch_leaf_digests_follow_listing_order() {
        let store = MemoryStore::new();
        store.put_file("batch-1", "b.txt", b"second".to_vec()).unwrap();
        store.put_file("batch-1", "a.txt", b"first".to_vec()).unwrap();

        let digests = batch_leaf_digests(&store, "batch-1").unwrap();
        assert_eq!(digests, vec![hash_data(b"first"), hash_data(b"second")]);
    }
}
