//! 篡改检测演示
//!
//! 演示完整闭环：提交批次 → 诚实证明验证通过 → 存储被篡改 →
//! 监视器记录偏差 → 恶意服务端用旧摘要出的证明被独立验证方拒绝。
//!
//! # 使用方法
//! ```bash
//! # 默认 100 个示例文件
//! cargo run --bin merkle-file-verification
//!
//! # 指定文件数
//! cargo run --bin merkle-file-verification -- 1000
//! ```

use anyhow::Result;
use common::{digest_to_hex, SystemConfig};
use merkle_file_verification::{commit_batch, fileutil, new_batch_id};
use merkle_tree::{
    hash_data, verify_proof, ContentStore, IntegrityMonitor, MemoryStore, TreeRegistry,
};
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();

    // 第一个参数：示例文件数（默认 100）
    let args: Vec<String> = std::env::args().collect();
    let config = SystemConfig {
        data_dir: "files".to_string(),
        dummy_file_count: if args.len() > 1 {
            args[1].parse::<usize>().unwrap_or(100)
        } else {
            100
        },
    };

    // 1. 生成示例文件，装载进存储并提交批次
    let dir = Path::new(&config.data_dir);
    fileutil::write_dummy_files(dir, config.dummy_file_count)?;

    let store = MemoryStore::new();
    let batch_id = new_batch_id();
    let file_count = fileutil::load_dir_into_store(&store, &batch_id, dir)?;

    let registry = TreeRegistry::new();
    let trusted_root = commit_batch(&store, &registry, &batch_id)?;
    println!(
        "🌲 Committed batch {} ({} files), root = {}",
        batch_id,
        file_count,
        digest_to_hex(&trusted_root)
    );

    let tree = registry.get(&batch_id)?;
    let monitor = IntegrityMonitor::new();
    let target = "0.txt";

    // 2. 诚实路径：证明当前内容的成员资格
    let proof = monitor.prove_current(&store, &tree, target)?;
    let fresh = hash_data(&store.read_file(&batch_id, target)?);
    assert!(verify_proof(&fresh, &proof.path, &trusted_root));
    println!("✓ Honest proof for {} verified against the trusted root", target);
    println!("  wire format: {}", proof.to_json()?);

    // 3. 存储被篡改，注册表未更新
    store.corrupt_file(&batch_id, target, b"tampered bytes".to_vec())?;
    let check = monitor.check_file(&store, &tree, target)?;
    println!(
        "⚠ Divergence detected for {}: committed {} vs current {}",
        target,
        digest_to_hex(&check.committed),
        digest_to_hex(&check.recomputed)
    );

    // 4. 诚实服务端此时拒绝出证明
    match monitor.prove_current(&store, &tree, target) {
        Err(err) => println!("✓ Honest prover refuses tampered content: {}", err),
        Ok(_) => println!("✗ Unexpected proof for tampered content"),
    }

    // 5. 恶意服务端仍可为旧摘要出一份表面有效的证明……
    let stale_proof = tree.prove_by_index(check.leaf_index)?;
    assert!(stale_proof.is_self_consistent());

    // ……但独立验证方用自己重算的摘要验证，篡改即刻暴露
    let served_bytes = store.read_file(&batch_id, target)?;
    let claimed_leaf = hash_data(&served_bytes);
    if verify_proof(&claimed_leaf, &stale_proof.path, &trusted_root) {
        println!("✗ Tamper went undetected");
    } else {
        println!("✓ Independent verifier rejected the stale proof — tamper exposed");
    }

    println!(
        "📋 Monitor recorded {} divergence event(s)",
        monitor.divergence_count()
    );

    Ok(())
}
