//! System-level facade for the merkle-file-verification workspace.
//!
//! 把内容存储、树构建和注册表串成完整的提交流程：
//! - `commit_batch` / `recommit_batch` 把一个批次的文件哈希成
//!   有序叶子、建树并注册（或整棵替换）
//! - `new_batch_id` 生成批次标识
//! - `load_config` / `save_config` 读写 JSON 配置
//!
//! HTTP 传输、原始字节的持久化等协作方不在本库范围内。

pub mod fileutil;

use common::{BatchId, Digest, SystemConfig};
use merkle_tree::{batch_leaf_digests, ContentStore, MerkleError, MerkleTree, TreeRegistry};
use std::error::Error;

/// 生成一个新的批次标识（UUID v4）
pub fn new_batch_id() -> BatchId {
    uuid::Uuid::new_v4().to_string()
}

/// 提交一个批次：按规范顺序哈希批次内全部文件，
/// 构建 Merkle 树并注册，返回承诺的根摘要。
///
/// 批次已注册时返回 `AlreadyExists`；内容合法变化后用
/// `recommit_batch` 整棵替换。
pub fn commit_batch(
    store: &dyn ContentStore,
    registry: &TreeRegistry,
    batch_id: &str,
) -> Result<Digest, MerkleError> {
    let leaves = batch_leaf_digests(store, batch_id)?;
    let tree = MerkleTree::build(batch_id, leaves)?;
    let root = tree.root_digest();
    registry.add(tree)?;
    log::info!(
        "Committed batch {} ({})",
        batch_id,
        common::digest_to_hex(&root)
    );
    Ok(root)
}

/// 重新提交一个批次：用文件的当前内容重建整棵树并
/// 原子替换注册表里的旧树，返回新的根摘要。
///
/// 重建必须使用与首次提交相同的叶子顺序（存储的规范顺序），
/// 否则即使内容未变根也会不同。
pub fn recommit_batch(
    store: &dyn ContentStore,
    registry: &TreeRegistry,
    batch_id: &str,
) -> Result<Digest, MerkleError> {
    let leaves = batch_leaf_digests(store, batch_id)?;
    let tree = MerkleTree::build(batch_id, leaves)?;
    let root = tree.root_digest();
    registry.rebuild(tree)?;
    Ok(root)
}

/// Load system configuration from a file
pub fn load_config(path: &str) -> Result<SystemConfig, Box<dyn Error>> {
    let content = std::fs::read_to_string(path)?;
    let config: SystemConfig = serde_json::from_str(&content)?;
    Ok(config)
}

/// Save system configuration to a file
pub fn save_config(config: &SystemConfig, path: &str) -> Result<(), Box<dyn Error>> {
    let content = serde_json::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}
