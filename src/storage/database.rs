use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{sqlite::SqlitePoolOptions, FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::info;

use super::{Article, ArticleFilter, ArticleStore, NewArticle};
use crate::utils::{NewsError, NewsResult};

const ARTICLE_COLUMNS: &str = "id, title, author, description, url, url_to_image, content, \
    published_at, source_id, source_name, language, keywords, user_id";

#[derive(Debug, FromRow)]
struct ArticleRow {
    id: i64,
    title: String,
    author: String,
    description: String,
    url: String,
    url_to_image: String,
    content: String,
    published_at: String,
    source_id: String,
    source_name: String,
    language: String,
    keywords: String,
    user_id: Option<i64>,
}

impl TryFrom<ArticleRow> for Article {
    type Error = NewsError;

    fn try_from(row: ArticleRow) -> NewsResult<Self> {
        let published_at = DateTime::parse_from_rfc3339(&row.published_at)
            .map_err(|e| NewsError::Parse(format!("无效的发布时间 '{}': {}", row.published_at, e)))?
            .with_timezone(&Utc);

        Ok(Article {
            id: row.id,
            title: row.title,
            author: row.author,
            description: row.description,
            url: row.url,
            url_to_image: row.url_to_image,
            content: row.content,
            published_at,
            source_id: row.source_id,
            source_name: row.source_name,
            language: row.language,
            keywords: row.keywords,
            user_id: row.user_id,
        })
    }
}

/// 固定宽度的 UTC 时间文本，字典序即时间顺序
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &ArticleFilter) {
    let mut has_where = false;

    if let Some(owner) = filter.owner {
        builder.push(" WHERE user_id = ").push_bind(owner);
        has_where = true;
    }

    if let Some(keyword) = &filter.keyword {
        builder.push(if has_where { " AND " } else { " WHERE " });
        // instr 区分大小写，LIKE 不区分
        builder
            .push("(instr(title, ")
            .push_bind(keyword.clone())
            .push(") > 0 OR instr(description, ")
            .push_bind(keyword.clone())
            .push(") > 0 OR instr(content, ")
            .push_bind(keyword.clone())
            .push(") > 0)");
    }
}

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> NewsResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(
                database_url
                    .parse::<sqlx::sqlite::SqliteConnectOptions>()?
                    .create_if_missing(true),
            )
            .await?;

        info!("数据库连接成功: {}", database_url);
        Ok(Self { pool })
    }

    pub async fn init_schema(&self) -> NewsResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL DEFAULT '',
                author TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                url TEXT NOT NULL,
                url_to_image TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL DEFAULT '',
                published_at TEXT NOT NULL,
                source_id TEXT NOT NULL DEFAULT '',
                source_name TEXT NOT NULL DEFAULT '',
                language TEXT NOT NULL DEFAULT '',
                keywords TEXT NOT NULL DEFAULT '',
                user_id INTEGER,
                created_at TEXT DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // url 不做唯一约束，去重由入库流程负责
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_articles_url ON articles(url)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_articles_user_published ON articles(user_id, published_at)",
        )
        .execute(&self.pool)
        .await?;

        info!("数据库表结构初始化完成");
        Ok(())
    }

    /// 清空文章表
    pub async fn clear_articles(&self) -> NewsResult<u64> {
        let result = sqlx::query("DELETE FROM articles").execute(&self.pool).await?;
        info!("已清空文章表: {} 行", result.rows_affected());
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ArticleStore for Database {
    async fn exists(&self, url: &str) -> NewsResult<bool> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM articles WHERE url = ?")
            .bind(url)
            .fetch_one(&self.pool)
            .await?;

        Ok(count > 0)
    }

    async fn insert_batch(&self, records: Vec<NewArticle>) -> NewsResult<Vec<Article>> {
        let mut tx = self.pool.begin().await?;
        let mut saved = Vec::with_capacity(records.len());

        for record in records {
            let result = sqlx::query(
                r#"
                INSERT INTO articles (title, author, description, url, url_to_image, content,
                                      published_at, source_id, source_name, language, keywords, user_id)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&record.title)
            .bind(&record.author)
            .bind(&record.description)
            .bind(&record.url)
            .bind(&record.url_to_image)
            .bind(&record.content)
            .bind(format_timestamp(&record.published_at))
            .bind(&record.source_id)
            .bind(&record.source_name)
            .bind(&record.language)
            .bind(record.keywords())
            .bind(record.user_id)
            .execute(&mut *tx)
            .await?;

            saved.push(record.into_article(result.last_insert_rowid()));
        }

        tx.commit().await?;
        Ok(saved)
    }

    async fn query(&self, filter: &ArticleFilter, skip: i64, take: i64) -> NewsResult<Vec<Article>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT {} FROM articles", ARTICLE_COLUMNS));
        push_filter(&mut builder, filter);
        builder
            .push(" ORDER BY published_at DESC LIMIT ")
            .push_bind(take)
            .push(" OFFSET ")
            .push_bind(skip);

        let rows = builder
            .build_query_as::<ArticleRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Article::try_from).collect()
    }

    async fn count(&self, filter: &ArticleFilter) -> NewsResult<i64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM articles");
        push_filter(&mut builder, filter);

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn detach_owner(&self, user_id: i64) -> NewsResult<u64> {
        let result = sqlx::query("UPDATE articles SET user_id = NULL WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        info!("用户 {} 的 {} 篇文章已解除归属", user_id, result.rows_affected());
        Ok(result.rows_affected())
    }
}
