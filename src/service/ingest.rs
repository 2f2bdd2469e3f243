use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::crawler::{EverythingRequest, NewsSource};
use crate::parser::KeywordExtractor;
use crate::storage::{Article, ArticleStore, NewArticle};
use crate::utils::{CancelSignal, Clock, NewsError, NewsResult};

/// 入库管道：搜索 -> 去重 -> 提取关键词 -> 批量写入
pub struct IngestionPipeline {
    source: Arc<dyn NewsSource>,
    store: Arc<dyn ArticleStore>,
    clock: Arc<dyn Clock>,
    extractor: KeywordExtractor,
}

impl IngestionPipeline {
    pub fn with_clock(
        source: Arc<dyn NewsSource>,
        store: Arc<dyn ArticleStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            store,
            clock,
            extractor: KeywordExtractor::new(),
        }
    }

    /// 返回本次新保存的文章。
    ///
    /// 空关键词什么都不做；新闻源失败或返回降级结果时返回空列表而不是错误；
    /// 写入失败和取消会返回给调用方。
    pub async fn ingest(&self, keyword: &str, user_id: i64, cancel: &CancelSignal) -> NewsResult<Vec<Article>> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Ok(Vec::new());
        }

        info!("开始获取新闻: keyword='{}', user_id={}", keyword, user_id);

        let now = self.clock.now();
        let request = EverythingRequest::recent(keyword, now);

        let result = match cancel.guard(self.source.search_everything(&request)).await {
            Ok(result) => result,
            Err(NewsError::Cancelled) => return Err(NewsError::Cancelled),
            Err(e) => {
                warn!("{} 请求失败, keyword='{}': {}", self.source.name(), keyword, e);
                return Ok(Vec::new());
            }
        };

        let raw_articles = match result.into_articles() {
            Some(articles) => articles,
            None => {
                warn!("{} 返回空结果或错误, keyword='{}'", self.source.name(), keyword);
                return Ok(Vec::new());
            }
        };

        let language = request.language.code();
        let mut seen: HashSet<String> = HashSet::new();
        let mut staged: Vec<NewArticle> = Vec::new();

        for raw in raw_articles {
            let url = match raw.url.as_deref() {
                Some(url) if !url.trim().is_empty() => url.to_string(),
                _ => continue,
            };

            // 同一批次中已暂存的 url 也算已存在
            if seen.contains(&url) {
                debug!("跳过重复 url: {}", url);
                continue;
            }
            if cancel.guard(self.store.exists(&url)).await? {
                debug!("文章已存在，跳过: {}", url);
                seen.insert(url);
                continue;
            }

            let article = NewArticle::from_raw(raw, language, user_id, now);
            let keywords = self.extractor.extract(&article.keyword_source());
            seen.insert(url);
            staged.push(article.with_keywords(keywords));
        }

        if staged.is_empty() {
            info!("用户 {} 没有需要保存的新文章", user_id);
            return Ok(Vec::new());
        }

        let saved = cancel.guard(self.store.insert_batch(staged)).await?;
        info!("已为用户 {} 保存 {} 篇新文章", user_id, saved.len());

        Ok(saved)
    }
}
