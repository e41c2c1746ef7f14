use crate::error::MerkleError;
use crate::node::hash_pair;
use common::{BatchId, Digest};
use serde::{Deserialize, Serialize};

/// 兄弟节点相对当前节点的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiblingPosition {
    Left,
    Right,
}

/// 证明路径中的一步：一个兄弟摘要及其所在侧
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofStep {
    #[serde(with = "common::types::serde_hex")]
    pub digest: Digest,
    pub position: SiblingPosition,
}

/// Merkle 包含性证明
///
/// `path` 按叶子→根的顺序排列；`leaf` 是建树时提交的叶子摘要，
/// `root` 是证明必须重现的根摘要。线格式为扁平 JSON，
/// 摘要一律十六进制编码。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    pub batch_id: BatchId,
    #[serde(with = "common::types::serde_hex")]
    pub leaf: Digest,
    #[serde(with = "common::types::serde_hex")]
    pub root: Digest,
    pub path: Vec<ProofStep>,
}

impl MerkleProof {
    /// 证明路径的层数（等于树高减一）
    pub fn levels(&self) -> usize {
        self.path.len()
    }

    /// 自检：按自带的叶子和路径重算根，与自带的根比较。
    /// 注意这不能代替独立验证——恶意服务端可以构造自洽的证明，
    /// 验证方仍须用自己重新哈希的叶子摘要调用 `verify_proof`。
    pub fn is_self_consistent(&self) -> bool {
        compute_merkle_root(&self.leaf, &self.path) == self.root
    }

    pub fn to_json(&self) -> Result<String, MerkleError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, MerkleError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// 从叶子摘要沿兄弟路径重算根摘要
///
/// 兄弟在左则 `running = H(sibling || running)`，
/// 在右则 `running = H(running || sibling)`。
pub fn compute_merkle_root(leaf: &Digest, path: &[ProofStep]) -> Digest {
    let mut running = *leaf;
    for step in path {
        running = match step.position {
            SiblingPosition::Left => hash_pair(&step.digest, &running),
            SiblingPosition::Right => hash_pair(&running, &step.digest),
        };
    }
    running
}

/// 验证包含性证明
///
/// 纯函数：只依赖三个显式输入，不查注册表、不读存储。
/// `trusted_root` 必须由调用方从独立可信渠道获得，
/// 验证失败是预期的布尔结果而不是错误。
pub fn verify_proof(claimed_leaf: &Digest, path: &[ProofStep], trusted_root: &Digest) -> bool {
    compute_merkle_root(claimed_leaf, path) == *trusted_root
}
