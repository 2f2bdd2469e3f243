#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use newsdigest::crawler::{ArticlesResult, EverythingRequest, NewsSource, RawArticle, RawSource};
use newsdigest::storage::{Article, ArticleFilter, ArticleStore, MemoryStore, NewArticle};
use newsdigest::{NewsError, NewsResult};

pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap()
}

pub fn raw(url: &str, title: &str, content: &str) -> RawArticle {
    RawArticle {
        source: Some(RawSource {
            id: Some("test-source".to_string()),
            name: Some("Test Source".to_string()),
        }),
        author: Some("Reporter".to_string()),
        title: Some(title.to_string()),
        description: Some("Desc".to_string()),
        url: Some(url.to_string()),
        url_to_image: Some("http://img".to_string()),
        published_at: Some(fixed_now() - Duration::hours(1)),
        content: Some(content.to_string()),
    }
}

#[derive(Clone)]
pub enum Reply {
    Result(ArticlesResult),
    Fail,
    Hang,
}

/// 按顺序返回预设结果的新闻源，最后一个结果重复使用
pub struct ScriptedSource {
    replies: Mutex<Vec<Reply>>,
    pub requests: Mutex<Vec<EverythingRequest>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn returning(articles: Vec<RawArticle>) -> Self {
        Self::new(vec![Reply::Result(ArticlesResult::ok(articles))])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn search_everything(&self, request: &EverythingRequest) -> NewsResult<ArticlesResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let reply = {
            let mut replies = self.replies.lock().unwrap();
            if replies.len() > 1 {
                replies.remove(0)
            } else {
                replies.first().cloned().expect("no scripted reply")
            }
        };

        match reply {
            Reply::Result(result) => Ok(result),
            Reply::Fail => Err(NewsError::Upstream("HTTP 503 Service Unavailable".to_string())),
            Reply::Hang => {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                Err(NewsError::Upstream("unreachable".to_string()))
            }
        }
    }
}

/// 记录调用次数的存储包装
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    exists_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

impl CountingStore {
    pub fn exists_calls(&self) -> usize {
        self.exists_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleStore for CountingStore {
    async fn exists(&self, url: &str) -> NewsResult<bool> {
        self.exists_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(url).await
    }

    async fn insert_batch(&self, records: Vec<NewArticle>) -> NewsResult<Vec<Article>> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_batch(records).await
    }

    async fn query(&self, filter: &ArticleFilter, skip: i64, take: i64) -> NewsResult<Vec<Article>> {
        self.inner.query(filter, skip, take).await
    }

    async fn count(&self, filter: &ArticleFilter) -> NewsResult<i64> {
        self.inner.count(filter).await
    }

    async fn detach_owner(&self, user_id: i64) -> NewsResult<u64> {
        self.inner.detach_owner(user_id).await
    }
}

/// 写入总是失败的存储
#[derive(Default)]
pub struct FailingStore {
    pub inner: MemoryStore,
}

#[async_trait]
impl ArticleStore for FailingStore {
    async fn exists(&self, url: &str) -> NewsResult<bool> {
        self.inner.exists(url).await
    }

    async fn insert_batch(&self, _records: Vec<NewArticle>) -> NewsResult<Vec<Article>> {
        Err(NewsError::Database(sqlx::Error::PoolClosed))
    }

    async fn query(&self, filter: &ArticleFilter, skip: i64, take: i64) -> NewsResult<Vec<Article>> {
        self.inner.query(filter, skip, take).await
    }

    async fn count(&self, filter: &ArticleFilter) -> NewsResult<i64> {
        self.inner.count(filter).await
    }

    async fn detach_owner(&self, user_id: i64) -> NewsResult<u64> {
        self.inner.detach_owner(user_id).await
    }
}
