pub mod ingest;
pub mod query;

pub use ingest::IngestionPipeline;
pub use query::{PageRequest, QueryEngine, DEFAULT_PAGE_SIZE};

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::crawler::NewsSource;
use crate::storage::{Article, ArticleFilter, ArticleStore, PagedResult};
use crate::utils::{CancelSignal, Clock, NewsError, NewsResult, SystemClock};

/// 已认证的调用方
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: i64,
    /// 是否可以查看其他用户的文章
    pub may_view_others: bool,
}

impl Viewer {
    pub fn user(user_id: i64) -> Self {
        Self {
            user_id,
            may_view_others: false,
        }
    }

    pub fn admin(user_id: i64) -> Self {
        Self {
            user_id,
            may_view_others: true,
        }
    }
}

pub struct NewsService {
    pipeline: Option<IngestionPipeline>,
    query: QueryEngine,
}

impl NewsService {
    pub fn new(source: Arc<dyn NewsSource>, store: Arc<dyn ArticleStore>) -> Self {
        Self::with_clock(source, store, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn NewsSource>,
        store: Arc<dyn ArticleStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            pipeline: Some(IngestionPipeline::with_clock(source, store.clone(), clock)),
            query: QueryEngine::new(store),
        }
    }

    /// 没有新闻源，只能浏览已保存的文章
    pub fn read_only(store: Arc<dyn ArticleStore>) -> Self {
        Self {
            pipeline: None,
            query: QueryEngine::new(store),
        }
    }

    /// 搜索、保存新文章，再返回该用户名下包含关键词的文章。当前页为空时返回 NotFound
    pub async fn search(
        &self,
        keyword: &str,
        user_id: i64,
        page: PageRequest,
        cancel: &CancelSignal,
    ) -> NewsResult<PagedResult<Article>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(NewsError::Validation("关键词不能为空".to_string()));
        }

        let pipeline = self
            .pipeline
            .as_ref()
            .ok_or_else(|| NewsError::Config("未配置新闻源，无法搜索".to_string()))?;
        pipeline.ingest(keyword, user_id, cancel).await?;

        let result = self
            .query
            .page(page, &ArticleFilter::search(user_id, keyword), cancel)
            .await?;

        if result.is_empty() {
            return Err(NewsError::NotFound(format!("没有找到与 '{}' 相关的新闻", keyword)));
        }

        Ok(result)
    }

    /// 所有文章（公开）
    pub async fn list_all(&self, page: PageRequest, cancel: &CancelSignal) -> NewsResult<PagedResult<Article>> {
        self.query.page(page, &ArticleFilter::all(), cancel).await
    }

    pub async fn list_mine(&self, viewer: Viewer, page: PageRequest, cancel: &CancelSignal) -> NewsResult<PagedResult<Article>> {
        self.list_for_user(viewer, viewer.user_id, page, cancel).await
    }

    /// 指定用户的文章；查看他人文章需要 `may_view_others`
    pub async fn list_for_user(
        &self,
        viewer: Viewer,
        owner: i64,
        page: PageRequest,
        cancel: &CancelSignal,
    ) -> NewsResult<PagedResult<Article>> {
        if owner != viewer.user_id && !viewer.may_view_others {
            info!("用户 {} 尝试查看用户 {} 的文章，已拒绝", viewer.user_id, owner);
            return Err(NewsError::Forbidden(format!("不能查看用户 {} 的文章", owner)));
        }

        self.query.page(page, &ArticleFilter::owned_by(owner), cancel).await
    }
}

/// 带成功标记和消息的结果，供外层输出
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView<T> {
    pub is_success: bool,
    pub message: String,
    pub data: Option<T>,
}

impl<T> ResultView<T> {
    pub fn success(data: T) -> Self {
        Self {
            is_success: true,
            message: String::new(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            is_success: false,
            message: message.into(),
            data: None,
        }
    }
}

impl<T> From<NewsResult<T>> for ResultView<T> {
    fn from(result: NewsResult<T>) -> Self {
        match result {
            Ok(data) => ResultView::success(data),
            Err(e) => ResultView::error(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_view_tags_outcomes() {
        let ok = ResultView::from(Ok::<i32, NewsError>(5));
        assert!(ok.is_success);
        assert_eq!(ok.data, Some(5));

        let err = ResultView::from(Err::<i32, _>(NewsError::NotFound("没有找到".to_string())));
        assert!(!err.is_success);
        assert_eq!(err.message, "没有找到");
        assert!(err.data.is_none());
    }

    #[test]
    fn result_view_serializes_camel_case() {
        let view = ResultView::success(PagedResult::<i32>::new(vec![1], 1, 1, 20));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["isSuccess"], true);
        assert_eq!(json["data"]["totalPages"], 1);
        assert_eq!(json["data"]["pageSize"], 20);
    }
}
