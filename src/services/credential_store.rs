//! 凭据存储 - 业务能力层
//!
//! 单键的取/存：答案服务的凭据放在一个 TOML 文件里，核心自身不持久化凭据

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

/// 凭据文件里的键名
pub const API_KEY_NAME: &str = "openai_api_key";

/// 凭据存储
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 读取一个键，文件或键不存在时返回 None
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("无法读取凭据文件: {}", self.path.display()))?;
        let table: toml::Table = content
            .parse()
            .with_context(|| format!("无法解析凭据文件: {}", self.path.display()))?;

        Ok(table
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()))
    }

    /// 写入一个键，保留文件里已有的其他键
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut table = if self.path.exists() {
            std::fs::read_to_string(&self.path)
                .with_context(|| format!("无法读取凭据文件: {}", self.path.display()))?
                .parse::<toml::Table>()
                .with_context(|| format!("无法解析凭据文件: {}", self.path.display()))?
        } else {
            toml::Table::new()
        };

        table.insert(key.to_string(), toml::Value::String(value.to_string()));

        let serialized = toml::to_string(&table).context("无法序列化凭据")?;
        std::fs::write(&self.path, serialized)
            .with_context(|| format!("无法写入凭据文件: {}", self.path.display()))?;

        debug!("凭据已写入: {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> CredentialStore {
        let mut path = std::env::temp_dir();
        path.push(format!("form_genie_cred_{}_{}.toml", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        CredentialStore::new(path)
    }

    #[test]
    fn test_get_absent_file_returns_none() {
        let store = temp_store("absent");
        assert_eq!(store.get(API_KEY_NAME).unwrap(), None);
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let store = temp_store("roundtrip");
        store.set(API_KEY_NAME, "sk-test-123").unwrap();
        assert_eq!(
            store.get(API_KEY_NAME).unwrap(),
            Some("sk-test-123".to_string())
        );
        let _ = std::fs::remove_file(&store.path);
    }

    #[test]
    fn test_set_preserves_other_keys() {
        let store = temp_store("preserve");
        store.set("other_key", "other_value").unwrap();
        store.set(API_KEY_NAME, "sk-test-456").unwrap();

        assert_eq!(
            store.get("other_key").unwrap(),
            Some("other_value".to_string())
        );
        assert_eq!(
            store.get(API_KEY_NAME).unwrap(),
            Some("sk-test-456".to_string())
        );
        let _ = std::fs::remove_file(&store.path);
    }
}
