pub mod database;
pub mod memory;
pub mod models;

pub use database::Database;
pub use memory::MemoryStore;
pub use models::{Article, NewArticle, PagedResult};

use async_trait::async_trait;

use crate::utils::NewsResult;

/// 查询过滤条件。关键词过滤对标题、描述、正文做区分大小写的包含匹配
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub owner: Option<i64>,
    pub keyword: Option<String>,
}

impl ArticleFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn owned_by(user_id: i64) -> Self {
        Self {
            owner: Some(user_id),
            keyword: None,
        }
    }

    pub fn search(user_id: i64, keyword: &str) -> Self {
        Self {
            owner: Some(user_id),
            keyword: Some(keyword.to_string()),
        }
    }

    pub fn matches(&self, article: &Article) -> bool {
        if let Some(owner) = self.owner {
            if article.user_id != Some(owner) {
                return false;
            }
        }
        match &self.keyword {
            Some(keyword) => {
                article.title.contains(keyword.as_str())
                    || article.description.contains(keyword.as_str())
                    || article.content.contains(keyword.as_str())
            }
            None => true,
        }
    }
}

/// 文章存储。结果总是按发布时间降序排列
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// 任意用户名下是否已有该 url 的文章
    async fn exists(&self, url: &str) -> NewsResult<bool>;

    /// 在一个事务中写入全部记录，按输入顺序返回带 id 的文章
    async fn insert_batch(&self, records: Vec<NewArticle>) -> NewsResult<Vec<Article>>;

    async fn query(&self, filter: &ArticleFilter, skip: i64, take: i64) -> NewsResult<Vec<Article>>;

    async fn count(&self, filter: &ArticleFilter) -> NewsResult<i64>;

    /// 用户被删除时调用：其名下文章的 user_id 置空，返回受影响的行数
    async fn detach_owner(&self, user_id: i64) -> NewsResult<u64>;
}
