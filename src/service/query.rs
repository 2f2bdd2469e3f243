use std::sync::Arc;

use crate::storage::{Article, ArticleFilter, ArticleStore, PagedResult};
use crate::utils::{CancelSignal, NewsResult};

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// 页码和页大小。非正数会被修正而不是拒绝
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: if page <= 0 { 1 } else { page },
            page_size: if page_size <= 0 { DEFAULT_PAGE_SIZE } else { page_size },
        }
    }

    pub fn skip(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

pub struct QueryEngine {
    store: Arc<dyn ArticleStore>,
}

impl QueryEngine {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// 总数按过滤后、分页前的结果计算
    pub async fn page(
        &self,
        request: PageRequest,
        filter: &ArticleFilter,
        cancel: &CancelSignal,
    ) -> NewsResult<PagedResult<Article>> {
        let total = cancel.guard(self.store.count(filter)).await?;
        let data = cancel
            .guard(self.store.query(filter, request.skip(), request.page_size))
            .await?;

        Ok(PagedResult::new(data, total, request.page, request.page_size))
    }
}
