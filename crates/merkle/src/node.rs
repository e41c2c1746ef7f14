use common::Digest;
use sha2::{Digest as Sha2Digest, Sha256};

/// Merkle 树节点
///
/// 叶子节点只保存一个内容摘要，没有子节点；内部节点独占地持有
/// 左右两个子节点，其摘要满足不变式：
/// `digest == SHA-256(left.digest || right.digest)`，左右拼接顺序固定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub digest: Digest,
    pub left: Option<Box<Node>>,
    pub right: Option<Box<Node>>,
}

impl Node {
    /// 创建叶子节点
    pub fn leaf(digest: Digest) -> Self {
        Node {
            digest,
            left: None,
            right: None,
        }
    }

    /// 由左右两个子节点创建内部节点
    pub fn parent(left: Node, right: Node) -> Self {
        let digest = hash_pair(&left.digest, &right.digest);
        Node {
            digest,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// 以该节点为根的子树包含的叶子数量（含奇数层复制产生的重复叶子）
    pub fn leaf_count(&self) -> usize {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => left.leaf_count() + right.leaf_count(),
            _ => 1,
        }
    }

    /// 递归检查子树的哈希不变式
    pub fn is_consistent(&self) -> bool {
        match (&self.left, &self.right) {
            (None, None) => true,
            (Some(left), Some(right)) => {
                self.digest == hash_pair(&left.digest, &right.digest)
                    && left.is_consistent()
                    && right.is_consistent()
            }
            // 只有一个子节点的结构不合法
            _ => false,
        }
    }
}

/// 拼接左右摘要并计算 SHA-256，左在前右在后
pub fn hash_pair(left: &Digest, right: &Digest) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// 计算原始内容字节的 SHA-256 摘要
pub fn hash_data(data: &[u8]) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
