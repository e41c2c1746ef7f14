use crate::error::MerkleError;
use crate::node::{hash_pair, Node};
use crate::proof::{MerkleProof, ProofStep, SiblingPosition};
use common::{digest_to_hex, BatchId, Digest};

/// 一棵不可变的 Merkle 哈希树
///
/// 自底向上由有序叶子摘要折叠而成，构建完成后不再修改；
/// 批次内容合法变化时重建整棵新树并在注册表里整体替换，
/// 绝不原地修改节点。
///
/// 叶子顺序是承诺的一部分：构建器不做排序，调用方（内容存储的
/// 批次列表）负责给出固定的规范顺序，重建时必须使用同一顺序，
/// 否则旧证明将静默失效。
#[derive(Debug, Clone)]
pub struct MerkleTree {
    batch_id: BatchId,
    root: Node,
    leaves: Vec<Digest>,
}

impl MerkleTree {
    /// 从有序叶子摘要构建 Merkle 树
    ///
    /// - 空输入返回 `EmptyInput`
    /// - 单个叶子时根摘要就是该叶子摘要（递归折叠的终止情形）
    /// - 每一层节点数为奇数时复制最后一个节点与自身配对，
    ///   然后按 `(2i, 2i+1)` 相邻配对，父摘要 = `H(left || right)`
    pub fn build(batch_id: impl Into<BatchId>, leaves: Vec<Digest>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::EmptyInput);
        }

        let mut current: Vec<Node> = leaves.iter().copied().map(Node::leaf).collect();

        while current.len() > 1 {
            if current.len() % 2 != 0 {
                if let Some(last) = current.last().cloned() {
                    current.push(last);
                }
            }

            let mut next = Vec::with_capacity(current.len() / 2);
            let mut nodes = current.into_iter();
            while let (Some(left), Some(right)) = (nodes.next(), nodes.next()) {
                next.push(Node::parent(left, right));
            }
            current = next;
        }

        let root = current.pop().ok_or(MerkleError::EmptyInput)?;

        Ok(MerkleTree {
            batch_id: batch_id.into(),
            root,
            leaves,
        })
    }

    pub fn batch_id(&self) -> &str {
        &self.batch_id
    }

    /// 整棵树承诺的根摘要
    pub fn root_digest(&self) -> Digest {
        self.root.digest
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// 建树时提交的有序叶子摘要
    pub fn leaves(&self) -> &[Digest] {
        &self.leaves
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn contains_leaf(&self, digest: &Digest) -> bool {
        self.leaves.contains(digest)
    }

    /// 校验整棵树的结构不变式（每个内部节点的摘要等于子摘要拼接的哈希）
    pub fn is_consistent(&self) -> bool {
        self.root.is_consistent()
    }

    /// 为目标叶子摘要生成包含性证明
    ///
    /// 摘要相同的叶子可能有多个（文件内容重复），按最小叶子下标
    /// 取第一个匹配；需要精确定位时使用 `prove_by_index`。
    pub fn prove(&self, target: &Digest) -> Result<MerkleProof, MerkleError> {
        let index = self
            .leaves
            .iter()
            .position(|leaf| leaf == target)
            .ok_or_else(|| MerkleError::LeafNotFound(digest_to_hex(target)))?;
        self.prove_by_index(index)
    }

    /// 按叶子下标生成包含性证明
    ///
    /// 从叶子层开始逐层上行：每层先做与构建时相同的奇数复制，
    /// 再记录兄弟摘要及其所在侧，然后折叠到上一层。
    /// 返回的路径按叶子→根排列。
    pub fn prove_by_index(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        if index >= self.leaves.len() {
            return Err(MerkleError::LeafIndexOutOfRange(index));
        }

        let mut path = Vec::new();
        let mut level: Vec<Digest> = self.leaves.clone();
        let mut pos = index;

        while level.len() > 1 {
            if level.len() % 2 != 0 {
                if let Some(last) = level.last().copied() {
                    level.push(last);
                }
            }

            // 复制后每层节点数为偶数，兄弟下标必然在界内
            let sibling = pos ^ 1;
            let position = if sibling < pos {
                SiblingPosition::Left
            } else {
                SiblingPosition::Right
            };
            path.push(ProofStep {
                digest: level[sibling],
                position,
            });

            level = level
                .chunks(2)
                .map(|pair| hash_pair(&pair[0], &pair[1]))
                .collect();
            pos /= 2;
        }

        Ok(MerkleProof {
            batch_id: self.batch_id.clone(),
            leaf: self.leaves[index],
            root: self.root.digest,
            path,
        })
    }
}
