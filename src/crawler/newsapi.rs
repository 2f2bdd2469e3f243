use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

use super::{ArticlesResult, EverythingRequest, NewsSource, RawArticle, RawSource, ResponseStatus};
use crate::config::NewsApiConfig;
use crate::utils::{NewsError, NewsResult};

/// NewsAPI 响应体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EverythingResponse {
    status: Option<String>,
    total_results: Option<u64>,
    articles: Option<Vec<ApiArticle>>,
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiArticle {
    source: Option<ApiSource>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiSource {
    id: Option<String>,
    name: Option<String>,
}

impl From<ApiArticle> for RawArticle {
    fn from(article: ApiArticle) -> Self {
        let published_at = article.published_at.as_deref().and_then(|value| {
            DateTime::parse_from_rfc3339(value)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
        });

        RawArticle {
            source: article.source.map(|s| RawSource { id: s.id, name: s.name }),
            author: article.author,
            title: article.title,
            description: article.description,
            url: article.url,
            url_to_image: article.url_to_image,
            published_at,
            content: article.content,
        }
    }
}

pub struct NewsApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    /// API key 缺失属于配置错误，直接失败
    pub fn new(config: &NewsApiConfig) -> NewsResult<Self> {
        if !config.is_configured() {
            return Err(NewsError::Config(
                "news_api.api_key 未配置，请在 config/settings.toml 或 NEWSDIGEST__NEWS_API__API_KEY 中设置".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn query_params(request: &EverythingRequest) -> Vec<(&'static str, String)> {
        vec![
            ("q", request.query.clone()),
            ("sortBy", request.sort_by.as_str().to_string()),
            ("language", request.language.code().to_string()),
            ("pageSize", request.page_size.to_string()),
            ("from", request.window.from.to_rfc3339_opts(SecondsFormat::Secs, true)),
            ("to", request.window.to.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ]
    }
}

/// 解析 everything 接口的响应体；错误响应同样是 JSON，状态为 "error"
pub(crate) fn parse_everything(body: &str) -> NewsResult<ArticlesResult> {
    let response: EverythingResponse = serde_json::from_str(body)?;

    let status = match response.status.as_deref() {
        Some("ok") => ResponseStatus::Ok,
        _ => ResponseStatus::Error,
    };

    Ok(ArticlesResult {
        status,
        total_results: response.total_results,
        articles: response
            .articles
            .map(|articles| articles.into_iter().map(RawArticle::from).collect()),
        error_code: response.code,
        error_message: response.message,
    })
}

#[async_trait]
impl NewsSource for NewsApiClient {
    fn name(&self) -> &str {
        "newsapi"
    }

    async fn search_everything(&self, request: &EverythingRequest) -> NewsResult<ArticlesResult> {
        let url = format!("{}/everything", self.base_url);
        info!("正在搜索 NewsAPI: q={}", request.query);

        let response = self
            .client
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(&Self::query_params(request))
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        info!("NewsAPI 响应状态: {}, 内容长度: {} 字节", status, text.len());

        let result = match parse_everything(&text) {
            Ok(result) => result,
            Err(e) if !status.is_success() => {
                warn!("NewsAPI 返回 {} 且响应无法解析: {}", status, e);
                return Err(NewsError::Upstream(format!("HTTP {}", status)));
            }
            Err(e) => return Err(e),
        };

        if result.status == ResponseStatus::Error {
            warn!(
                "NewsAPI 返回错误: {} {}",
                result.error_code.as_deref().unwrap_or("unknown"),
                result.error_message.as_deref().unwrap_or("")
            );
        }

        Ok(result)
    }
}
