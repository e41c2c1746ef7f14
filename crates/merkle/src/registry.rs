use crate::error::MerkleError;
use crate::tree::MerkleTree;
use common::{BatchId, Digest};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// 批次 → Merkle 树的注册表
///
/// 把"所有树放在一个全局列表里"的做法封装为带读写锁的类型：
/// 树本身不可变，读取方共享 `Arc` 引用即可并发进行证明生成与
/// 验证；`rebuild` 在写锁内一次性替换整个表项，读取方要么看到
/// 完整的旧树要么看到完整的新树。同一批次的并发重建在写锁上
/// 串行化，后写者胜。
#[derive(Debug, Default)]
pub struct TreeRegistry {
    trees: RwLock<HashMap<BatchId, Arc<MerkleTree>>>,
}

impl TreeRegistry {
    pub fn new() -> Self {
        TreeRegistry {
            trees: RwLock::new(HashMap::new()),
        }
    }

    /// 注册新批次的树
    ///
    /// 批次已注册时返回 `AlreadyExists`；替换必须走显式的 `rebuild`。
    pub fn add(&self, tree: MerkleTree) -> Result<(), MerkleError> {
        let mut trees = self
            .trees
            .write()
            .map_err(|_| MerkleError::LockError("Failed to acquire write lock".to_string()))?;

        let batch_id = tree.batch_id().to_string();
        if trees.contains_key(&batch_id) {
            return Err(MerkleError::AlreadyExists(batch_id));
        }

        trees.insert(batch_id, Arc::new(tree));
        Ok(())
    }

    /// 查询批次对应的树
    pub fn get(&self, batch_id: &str) -> Result<Arc<MerkleTree>, MerkleError> {
        let trees = self
            .trees
            .read()
            .map_err(|_| MerkleError::LockError("Failed to acquire read lock".to_string()))?;

        trees
            .get(batch_id)
            .cloned()
            .ok_or_else(|| MerkleError::TreeNotFound(batch_id.to_string()))
    }

    /// 查询批次当前承诺的根摘要
    pub fn root_digest(&self, batch_id: &str) -> Result<Digest, MerkleError> {
        Ok(self.get(batch_id)?.root_digest())
    }

    /// 整棵替换批次对应的树（原子发布）
    ///
    /// 批次尚未注册时直接插入；已注册时返回被替换的旧树。
    pub fn rebuild(&self, tree: MerkleTree) -> Result<Option<Arc<MerkleTree>>, MerkleError> {
        let mut trees = self
            .trees
            .write()
            .map_err(|_| MerkleError::LockError("Failed to acquire write lock".to_string()))?;

        let batch_id = tree.batch_id().to_string();
        let replaced = trees.insert(batch_id.clone(), Arc::new(tree));
        if replaced.is_some() {
            log::info!("Rebuilt tree for batch {}", batch_id);
        }
        Ok(replaced)
    }

    /// 注销批次，返回被移除的树（等待未完成的读取方释放后回收）
    pub fn remove(&self, batch_id: &str) -> Result<Arc<MerkleTree>, MerkleError> {
        let mut trees = self
            .trees
            .write()
            .map_err(|_| MerkleError::LockError("Failed to acquire write lock".to_string()))?;

        trees
            .remove(batch_id)
            .ok_or_else(|| MerkleError::TreeNotFound(batch_id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.trees.read().map(|trees| trees.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 当前已注册的全部批次标识
    pub fn batch_ids(&self) -> Vec<BatchId> {
        self.trees
            .read()
            .map(|trees| trees.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::hash_data;

    fn tree(batch_id: &str, content: &[&str]) -> MerkleTree {
        let leaves = content.iter().map(|c| hash_data(c.as_bytes())).collect();
        MerkleTree::build(batch_id, leaves).unwrap()
    }

    #[test]
    fn test_add_and_get() {
        let registry = TreeRegistry::new();
        let t = tree("batch-1", &["a", "b"]);
        let root = t.root_digest();

        registry.add(t).unwrap();
        assert_eq!(registry.get("batch-1").unwrap().root_digest(), root);
        assert_eq!(registry.root_digest("batch-1").unwrap(), root);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let registry = TreeRegistry::new();
        registry.add(tree("batch-1", &["a"])).unwrap();

        let result = registry.add(tree("batch-1", &["b"]));
        assert!(matches!(result, Err(MerkleError::AlreadyExists(_))));
    }

    #[test]
    fn test_get_missing_batch() {
        let registry = TreeRegistry::new();
        assert!(matches!(
            registry.get("nope"),
            Err(MerkleError::TreeNotFound(_))
        ));
    }

    #[test]
    fn test_rebuild_replaces_wholesale() {
        let registry = TreeRegistry::new();
        registry.add(tree("batch-1", &["a", "b"])).unwrap();
        let old_root = registry.root_digest("batch-1").unwrap();

        let replaced = registry.rebuild(tree("batch-1", &["a", "b", "c"])).unwrap();
        assert_eq!(replaced.map(|t| t.root_digest()), Some(old_root));
        assert_ne!(registry.root_digest("batch-1").unwrap(), old_root);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_rebuild_unregistered_batch_inserts() {
        let registry = TreeRegistry::new();
        let replaced = registry.rebuild(tree("batch-1", &["a"])).unwrap();
        assert!(replaced.is_none());
        assert!(registry.get("batch-1").is_ok());
    }

    #[test]
    fn test_remove() {
        let registry = TreeRegistry::new();
        registry.add(tree("batch-1", &["a"])).unwrap();

        // 已被读取方持有的树在注销后仍可用
        let held = registry.get("batch-1").unwrap();
        registry.remove("batch-1").unwrap();
        assert!(registry.is_empty());
        assert!(held.is_consistent());

        assert!(matches!(
            registry.remove("batch-1"),
            Err(MerkleError::TreeNotFound(_))
        ));
    }

    #[test]
    fn test_batch_ids() {
        let registry = TreeRegistry::new();
        registry.add(tree("batch-1", &["a"])).unwrap();
        registry.add(tree("batch-2", &["b"])).unwrap();

        let mut ids = registry.batch_ids();
        ids.sort();
        assert_eq!(ids, vec!["batch-1".to_string(), "batch-2".to_string()]);
    }
}
