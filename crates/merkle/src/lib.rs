//! # Merkle Tree ADS
//!
//! 文件批次验证使用的 Merkle 哈希树引擎：
//! - `tree`：从有序叶子摘要确定性地构建哈希树
//! - `proof`：包含性证明的线格式与纯函数验证
//! - `registry`：批次 → 树的注册表，重建时整棵原子替换
//! - `store`：内容存储接口（核心只读取，不负责持久化）
//! - `monitor`：篡改检测，提交摘要与当前摘要出现偏差时记录信号
//!
//! 树一旦构建完成即不可变；批次内容合法变化时重建整棵树，
//! 不做增量更新。

pub mod error;
pub mod monitor;
pub mod node;
pub mod proof;
pub mod registry;
pub mod store;
pub mod tree;

pub use error::MerkleError;
pub use monitor::{DivergenceEvent, IntegrityCheck, IntegrityMonitor};
pub use node::{hash_data, hash_pair, Node};
pub use proof::{compute_merkle_root, verify_proof, MerkleProof, ProofStep, SiblingPosition};
pub use registry::TreeRegistry;
pub use store::{batch_leaf_digests, ContentStore, MemoryStore};
pub use tree::MerkleTree;
