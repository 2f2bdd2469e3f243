use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Article, ArticleFilter, ArticleStore, NewArticle};
use crate::utils::NewsResult;

#[derive(Default)]
struct MemoryState {
    articles: Vec<Article>,
    next_id: i64,
}

/// 内存存储，行为与 SQLite 实现一致，用于测试和临时运行
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.articles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn matching<'a>(articles: &'a [Article], filter: &'a ArticleFilter) -> impl Iterator<Item = &'a Article> {
        articles.iter().filter(move |article| filter.matches(article))
    }
}

#[async_trait]
impl ArticleStore for MemoryStore {
    async fn exists(&self, url: &str) -> NewsResult<bool> {
        let state = self.state.read().await;
        Ok(state.articles.iter().any(|a| a.url == url))
    }

    async fn insert_batch(&self, records: Vec<NewArticle>) -> NewsResult<Vec<Article>> {
        let mut state = self.state.write().await;
        let mut saved = Vec::with_capacity(records.len());

        for record in records {
            state.next_id += 1;
            let article = record.into_article(state.next_id);
            state.articles.push(article.clone());
            saved.push(article);
        }

        Ok(saved)
    }

    async fn query(&self, filter: &ArticleFilter, skip: i64, take: i64) -> NewsResult<Vec<Article>> {
        let state = self.state.read().await;
        let mut rows: Vec<Article> = Self::matching(&state.articles, filter).cloned().collect();
        rows.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        Ok(rows
            .into_iter()
            .skip(skip.max(0) as usize)
            .take(take.max(0) as usize)
            .collect())
    }

    async fn count(&self, filter: &ArticleFilter) -> NewsResult<i64> {
        let state = self.state.read().await;
        Ok(Self::matching(&state.articles, filter).count() as i64)
    }

    async fn detach_owner(&self, user_id: i64) -> NewsResult<u64> {
        let mut state = self.state.write().await;
        let mut detached = 0;
        for article in state.articles.iter_mut().filter(|a| a.user_id == Some(user_id)) {
            article.user_id = None;
            detached += 1;
        }
        Ok(detached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::RawArticle;
    use chrono::{Duration, Utc};

    fn record(url: &str, title: &str, user_id: i64, minutes_ago: i64) -> NewArticle {
        let now = Utc::now();
        let raw = RawArticle {
            title: Some(title.to_string()),
            url: Some(url.to_string()),
            published_at: Some(now - Duration::minutes(minutes_ago)),
            ..RawArticle::default()
        };
        NewArticle::from_raw(raw, "en", user_id, now)
    }

    #[tokio::test]
    async fn test_memory_storage() {
        let store = MemoryStore::new();
        assert!(store.is_empty().await);

        let saved = store
            .insert_batch(vec![
                record("http://old", "Old news", 1, 30),
                record("http://new", "New news", 1, 5),
                record("http://other", "Other news", 2, 10),
            ])
            .await
            .unwrap();
        assert_eq!(saved.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        assert!(store.exists("http://old").await.unwrap());
        assert!(!store.exists("http://missing").await.unwrap());

        let mine = store.query(&ArticleFilter::owned_by(1), 0, 10).await.unwrap();
        assert_eq!(mine[0].url, "http://new");
        assert_eq!(mine[1].url, "http://old");

        assert_eq!(store.count(&ArticleFilter::search(1, "Old")).await.unwrap(), 1);
        assert_eq!(store.count(&ArticleFilter::search(1, "old")).await.unwrap(), 0);

        assert_eq!(store.detach_owner(2).await.unwrap(), 1);
        assert_eq!(store.count(&ArticleFilter::all()).await.unwrap(), 3);
        assert_eq!(store.count(&ArticleFilter::owned_by(2)).await.unwrap(), 0);
    }
}
