use crate::error::MerkleError;
use crate::node::hash_data;
use crate::proof::MerkleProof;
use crate::store::ContentStore;
use crate::tree::MerkleTree;
use common::{digest_to_hex, BatchId, Digest, FileId};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// 一次检测到的摘要偏差：提交进树的叶子摘要与
/// 当前字节重算出的摘要不一致
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivergenceEvent {
    pub batch_id: BatchId,
    pub file_name: FileId,
    #[serde(with = "common::types::serde_hex")]
    pub committed: Digest,
    #[serde(with = "common::types::serde_hex")]
    pub recomputed: Digest,
    /// 检测时刻（Unix 秒）
    pub detected_at: u64,
}

/// 单个文件的完整性检查结果
#[derive(Debug, Clone)]
pub struct IntegrityCheck {
    /// 文件在批次规范顺序中的下标
    pub leaf_index: usize,
    /// 建树时提交的叶子摘要
    pub committed: Digest,
    /// 用当前字节重新计算的摘要
    pub recomputed: Digest,
    pub diverged: bool,
}

/// 完整性监视器
///
/// 树提交之后存储仍可能被改动而注册表未更新。监视器在响应
/// 证明请求前用文件的当前字节重算摘要，与提交的叶子摘要比较：
/// 不一致时记录偏差事件并告警，但绝不替验证方把旧摘要塞回
/// 验证路径——独立验证方用自己重算的摘要验证，照样会暴露篡改。
#[derive(Debug, Default)]
pub struct IntegrityMonitor {
    events: RwLock<Vec<DivergenceEvent>>,
}

impl IntegrityMonitor {
    pub fn new() -> Self {
        IntegrityMonitor {
            events: RwLock::new(Vec::new()),
        }
    }

    /// 检查单个文件的当前内容是否仍与树中提交的叶子一致
    ///
    /// 检测到偏差时记录 `DivergenceEvent` 并输出告警日志，
    /// 这是可观测性信号，不会让检查本身失败。
    pub fn check_file(
        &self,
        store: &dyn ContentStore,
        tree: &MerkleTree,
        name: &str,
    ) -> Result<IntegrityCheck, MerkleError> {
        let batch_id = tree.batch_id();
        let names = store.list_batch(batch_id)?;
        let leaf_index = names.iter().position(|n| n.as_str() == name).ok_or_else(|| {
            MerkleError::FileNotFound {
                batch_id: batch_id.to_string(),
                name: name.to_string(),
            }
        })?;

        let committed = tree
            .leaves()
            .get(leaf_index)
            .copied()
            .ok_or(MerkleError::LeafIndexOutOfRange(leaf_index))?;

        let data = store.read_file(batch_id, name)?;
        let recomputed = hash_data(&data);
        let diverged = recomputed != committed;

        if diverged {
            log::warn!(
                "Digest divergence for {}/{}: committed {} but current bytes hash to {}",
                batch_id,
                name,
                digest_to_hex(&committed),
                digest_to_hex(&recomputed)
            );
            self.record(DivergenceEvent {
                batch_id: batch_id.to_string(),
                file_name: name.to_string(),
                committed,
                recomputed,
                detected_at: unix_now(),
            })?;
        }

        Ok(IntegrityCheck {
            leaf_index,
            committed,
            recomputed,
            diverged,
        })
    }

    /// 诚实的证明路径：为文件当前字节的摘要生成证明
    ///
    /// 内容被篡改时当前摘要不在树里，返回 `LeafNotFound`，
    /// 而不是退回旧摘要去凑一个表面有效的证明。
    pub fn prove_current(
        &self,
        store: &dyn ContentStore,
        tree: &MerkleTree,
        name: &str,
    ) -> Result<MerkleProof, MerkleError> {
        let check = self.check_file(store, tree, name)?;
        tree.prove(&check.recomputed)
    }

    /// 检查整个批次，返回出现偏差的文件名
    pub fn check_batch(
        &self,
        store: &dyn ContentStore,
        tree: &MerkleTree,
    ) -> Result<Vec<FileId>, MerkleError> {
        let names = store.list_batch(tree.batch_id())?;
        let mut diverged = Vec::new();
        for name in names {
            if self.check_file(store, tree, &name)?.diverged {
                diverged.push(name);
            }
        }
        Ok(diverged)
    }

    /// 已记录的全部偏差事件
    pub fn events(&self) -> Result<Vec<DivergenceEvent>, MerkleError> {
        self.events
            .read()
            .map(|events| events.clone())
            .map_err(|_| MerkleError::LockError("Failed to acquire read lock".to_string()))
    }

    pub fn divergence_count(&self) -> usize {
        self.events.read().map(|events| events.len()).unwrap_or(0)
    }

    pub fn clear_events(&self) -> Result<(), MerkleError> {
        self.events
            .write()
            .map(|mut events| events.clear())
            .map_err(|_| MerkleError::LockError("Failed to acquire write lock".to_string()))
    }

    fn record(&self, event: DivergenceEvent) -> Result<(), MerkleError> {
        self.events
            .write()
            .map(|mut events| events.push(event))
            .map_err(|_| MerkleError::LockError("Failed to acquire write lock".to_string()))
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
