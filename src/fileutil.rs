//! 测试数据工具
//!
//! 生成示例文件、计算单个文件的摘要、按文件名升序收集目录内
//! 全部文件的摘要（与批次的规范顺序一致），以及把目录装载进
//! 内存存储。

use common::{Digest, FileId};
use merkle_tree::{hash_data, MemoryStore, MerkleError};
use std::fs;
use std::io;
use std::path::Path;

/// 在目录下生成 `amount` 个示例文件（`0.txt`、`1.txt`…），
/// 目录已存在时先清空
pub fn write_dummy_files(dir: &Path, amount: usize) -> io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;

    for i in 0..amount {
        let name = format!("{}.txt", i);
        let content = format!("Hello {}", i);
        fs::write(dir.join(name), content)?;
    }
    Ok(())
}

/// 计算单个文件当前内容的摘要
pub fn file_digest(path: &Path) -> io::Result<Digest> {
    let data = fs::read(path)?;
    Ok(hash_data(&data))
}

/// 收集目录内全部普通文件的 `(文件名, 摘要)`，按文件名升序
pub fn collect_batch_digests(dir: &Path) -> io::Result<Vec<(FileId, Digest)>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            names.push(entry.file_name().to_string_lossy().to_string());
        }
    }
    names.sort();

    let mut digests = Vec::with_capacity(names.len());
    for name in names {
        let digest = file_digest(&dir.join(&name))?;
        digests.push((name, digest));
    }
    Ok(digests)
}

/// 把目录内全部普通文件装载进内存存储的一个批次，
/// 返回装载的文件数
pub fn load_dir_into_store(
    store: &MemoryStore,
    batch_id: &str,
    dir: &Path,
) -> Result<usize, MerkleError> {
    let mut count = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            let name = entry.file_name().to_string_lossy().to_string();
            let data = fs::read(entry.path())?;
            store.put_file(batch_id, &name, data)?;
            count += 1;
        }
    }
    Ok(count)
}
