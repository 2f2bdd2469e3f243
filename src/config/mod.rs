use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::{NewsError, NewsResult};

/// 环境变量前缀，例如 `NEWSDIGEST__NEWS_API__API_KEY`
const ENV_PREFIX: &str = "NEWSDIGEST";
const DEFAULT_CONFIG_PATH: &str = "config/settings.toml";
const PLACEHOLDER_API_KEY: &str = "your-newsapi-key";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub news_api: NewsApiConfig,
    pub storage: StorageConfig,
    pub paging: PagingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewsApiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub database_path: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PagingConfig {
    pub default_page_size: i64,
}

impl AppConfig {
    pub fn load() -> NewsResult<Self> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// 按 默认值 -> TOML 文件 -> 环境变量 的顺序叠加配置，文件可以不存在
    pub fn load_from(path: impl AsRef<Path>) -> NewsResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default())?)
            .add_source(config::File::from(PathBuf::from(path.as_ref())).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> NewsResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| NewsError::Config(format!("无法序列化配置: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn database_url(&self) -> String {
        format!("sqlite:{}", self.storage.database_path)
    }
}

impl NewsApiConfig {
    /// 检查 API key 是否已配置
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty() && self.api_key != PLACEHOLDER_API_KEY
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            news_api: NewsApiConfig {
                api_key: PLACEHOLDER_API_KEY.to_string(),
                base_url: "https://newsapi.org/v2".to_string(),
                timeout_secs: 30,
                user_agent: "newsdigest/0.1".to_string(),
            },
            storage: StorageConfig {
                database_path: "./data/news.db".to_string(),
                max_connections: 5,
            },
            paging: PagingConfig {
                default_page_size: 20,
            },
        }
    }
}
