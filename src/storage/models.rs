use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crawler::RawArticle;

/// 已入库的文章，入库后只读
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) description: String,
    pub(crate) url: String,
    pub(crate) url_to_image: String,
    pub(crate) content: String,
    pub(crate) published_at: DateTime<Utc>,
    pub(crate) source_id: String,
    pub(crate) source_name: String,
    pub(crate) language: String,
    pub(crate) keywords: String,
    pub(crate) user_id: Option<i64>,
}

impl Article {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn url_to_image(&self) -> &str {
        &self.url_to_image
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// 逗号分隔的关键词
    pub fn keywords(&self) -> &str {
        &self.keywords
    }

    /// 所属用户；用户被删除后为 None
    pub fn user_id(&self) -> Option<i64> {
        self.user_id
    }
}

/// 待入库的文章。关键词只能通过 `with_keywords` 在入库前设置一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub title: String,
    pub author: String,
    pub description: String,
    pub url: String,
    pub url_to_image: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
    pub source_id: String,
    pub source_name: String,
    pub language: String,
    pub user_id: Option<i64>,
    keywords: String,
}

impl NewArticle {
    /// 缺失的文本字段用空字符串代替，缺失的发布时间用 `now`
    pub fn from_raw(raw: RawArticle, language: &str, user_id: i64, now: DateTime<Utc>) -> Self {
        let source = raw.source.unwrap_or_default();
        Self {
            title: raw.title.unwrap_or_default(),
            author: raw.author.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            url: raw.url.unwrap_or_default(),
            url_to_image: raw.url_to_image.unwrap_or_default(),
            content: raw.content.unwrap_or_default(),
            published_at: raw.published_at.unwrap_or(now),
            source_id: source.id.unwrap_or_default(),
            source_name: source.name.unwrap_or_default(),
            language: language.to_string(),
            user_id: Some(user_id),
            keywords: String::new(),
        }
    }

    /// 关键词提取的输入：标题、描述、正文以空格连接
    pub fn keyword_source(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.content)
    }

    pub fn with_keywords(self, keywords: String) -> Self {
        Self { keywords, ..self }
    }

    pub fn keywords(&self) -> &str {
        &self.keywords
    }

    /// 由存储层在分配 id 后调用
    pub fn into_article(self, id: i64) -> Article {
        Article {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            url: self.url,
            url_to_image: self.url_to_image,
            content: self.content,
            published_at: self.published_at,
            source_id: self.source_id,
            source_name: self.source_name,
            language: self.language,
            keywords: self.keywords,
            user_id: self.user_id,
        }
    }
}

/// 分页结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedResult<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> PagedResult<T> {
    pub fn new(data: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            total / page_size + i64::from(total % page_size != 0)
        } else {
            0
        };
        Self {
            data,
            total,
            page,
            page_size,
            total_pages,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
