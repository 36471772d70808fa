//! JSON document files
//!
//! 写入: 同目录临时文件 + rename，读者永远看不到半个文件。
//! 读取: 解析失败或文件缺失时用默认值重建文件。

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

use super::StorageError;

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()))
}

/// Atomically replace `path` with `bytes`
pub async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let tmp = temp_path(path);
    let result = async {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);
        tokio::fs::rename(&tmp, path).await
    }
    .await;

    if let Err(e) = result {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(StorageError::Io {
            path: path.to_path_buf(),
            source: e,
        });
    }
    Ok(())
}

/// Serialize a document the way it is stored on disk
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec_pretty(value)
}

/// Load a document, seeding the file with `default` when it is missing or unreadable
pub async fn load_or_seed<T, F>(path: &Path, default: F) -> Result<T, StorageError>
where
    T: DeserializeOwned + Serialize,
    F: FnOnce() -> T,
{
    match tokio::fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Document is corrupt, recreating with defaults");
                let backup = path.with_extension("json.corrupt");
                if let Err(e) = tokio::fs::rename(path, &backup).await {
                    tracing::warn!(path = %path.display(), error = %e, "Failed to keep corrupt document aside");
                }
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "Document missing, seeding defaults");
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Document unreadable, recreating with defaults");
        }
    }

    let value = default();
    write_atomic(path, &encode(&value)?).await?;
    Ok(value)
}
