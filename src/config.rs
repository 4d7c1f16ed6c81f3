use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::history::storage::StorageBackend;
use crate::{RestdeskError, Result};

/// 运行时配置
///
/// The storage backend is an explicit value handed to the history store;
/// changing it means building a new store, not flipping shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub storage: StorageBackend,
}

impl AppConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            data_dir,
            storage: StorageBackend::default(),
        }
    }

    pub fn with_storage(mut self, storage: StorageBackend) -> Self {
        self.storage = storage;
        self
    }
}

/// On-disk form of `restdesk.toml`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub storage: StorageBackend,
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    pub const CONFIG_FILE: &'static str = "restdesk.toml";
    const APP_DIR: &'static str = "restdesk";

    /// 默认数据目录: 用户数据目录下的 restdesk/, 找不到时使用 ./data
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .map(|dir| dir.join(Self::APP_DIR))
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    pub fn config_path(data_dir: &Path) -> PathBuf {
        data_dir.join(Self::CONFIG_FILE)
    }

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<ConfigFile> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RestdeskError::Config(format!("Failed to read config file: {}", e))
        })?;

        toml::from_str(&content)
            .map_err(|e| RestdeskError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Load the config stored in `data_dir`; a missing file means defaults.
    pub fn load(data_dir: Option<PathBuf>) -> Result<AppConfig> {
        let data_dir = data_dir.unwrap_or_else(Self::default_data_dir);
        let path = Self::config_path(&data_dir);

        let file = if path.exists() {
            Self::load_from_path(&path)?
        } else {
            ConfigFile::default()
        };

        Ok(AppConfig::new(data_dir).with_storage(file.storage))
    }

    /// Persist the backend choice. Takes effect the next time a store is opened.
    pub fn save(config: &AppConfig) -> Result<PathBuf> {
        fs::create_dir_all(&config.data_dir)?;
        let path = Self::config_path(&config.data_dir);
        let file = ConfigFile {
            storage: config.storage,
        };
        let content = toml::to_string(&file)
            .map_err(|e| RestdeskError::Config(format!("Failed to write config file: {}", e)))?;
        fs::write(&path, content)?;
        Ok(path)
    }
}
