pub mod newsapi;

pub use newsapi::NewsApiClient;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::NewsResult;

/// 每次搜索请求的文章数量上限
pub const SEARCH_PAGE_SIZE: u32 = 100;
/// 搜索时间窗口：截至当前的最近天数
pub const SEARCH_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortBy {
    Popularity,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Popularity => "popularity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn last_days(days: i64, now: DateTime<Utc>) -> Self {
        Self {
            from: now - Duration::days(days),
            to: now,
        }
    }
}

/// "everything" 搜索请求
#[derive(Debug, Clone)]
pub struct EverythingRequest {
    pub query: String,
    pub window: TimeRange,
    pub sort_by: SortBy,
    pub language: Language,
    pub page_size: u32,
}

impl EverythingRequest {
    /// 入库流程使用的固定参数：按热度排序、英文、100 条、最近 7 天
    pub fn recent(query: &str, now: DateTime<Utc>) -> Self {
        Self {
            query: query.to_string(),
            window: TimeRange::last_days(SEARCH_WINDOW_DAYS, now),
            sort_by: SortBy::Popularity,
            language: Language::En,
            page_size: SEARCH_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// 新闻源返回的原始文章，任何字段都可能缺失
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawArticle {
    pub source: Option<RawSource>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlesResult {
    pub status: ResponseStatus,
    pub total_results: Option<u64>,
    pub articles: Option<Vec<RawArticle>>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

impl ArticlesResult {
    pub fn ok(articles: Vec<RawArticle>) -> Self {
        Self {
            status: ResponseStatus::Ok,
            total_results: Some(articles.len() as u64),
            articles: Some(articles),
            error_code: None,
            error_message: None,
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            status: ResponseStatus::Error,
            total_results: None,
            articles: None,
            error_code: Some(code.to_string()),
            error_message: Some(message.to_string()),
        }
    }

    /// 仅当状态为 ok 且带有文章列表时返回文章；其他情况都视为降级结果
    pub fn into_articles(self) -> Option<Vec<RawArticle>> {
        match self.status {
            ResponseStatus::Ok => self.articles,
            ResponseStatus::Error => None,
        }
    }
}

/// 外部新闻搜索源
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn name(&self) -> &str;

    async fn search_everything(&self, request: &EverythingRequest) -> NewsResult<ArticlesResult>;
}
