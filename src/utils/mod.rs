pub mod cancel;
pub mod clock;
pub mod logger;

use thiserror::Error;

pub use cancel::{CancelHandle, CancelSignal};
pub use clock::{Clock, FixedClock, SystemClock};

#[derive(Error, Debug)]
pub enum NewsError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("参数错误: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("无权访问: {0}")]
    Forbidden(String),

    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("网络请求错误: {0}")]
    Network(#[from] reqwest::Error),

    #[error("新闻源返回错误: {0}")]
    Upstream(String),

    #[error("解析错误: {0}")]
    Parse(String),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("操作已取消")]
    Cancelled,
}

impl From<config::ConfigError> for NewsError {
    fn from(err: config::ConfigError) -> Self {
        NewsError::Config(err.to_string())
    }
}

/// 面向调用方的错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Forbidden,
    Cancelled,
    Fatal,
}

impl NewsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            NewsError::Validation(_) => ErrorKind::BadRequest,
            NewsError::NotFound(_) => ErrorKind::NotFound,
            NewsError::Forbidden(_) => ErrorKind::Forbidden,
            NewsError::Cancelled => ErrorKind::Cancelled,
            _ => ErrorKind::Fatal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::Fatal
    }
}

pub type NewsResult<T> = Result<T, NewsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors_for_callers() {
        assert_eq!(NewsError::Validation("x".into()).kind(), ErrorKind::BadRequest);
        assert_eq!(NewsError::NotFound("x".into()).kind(), ErrorKind::NotFound);
        assert_eq!(NewsError::Cancelled.kind(), ErrorKind::Cancelled);
        assert!(NewsError::Config("missing key".into()).is_fatal());
        assert!(NewsError::Database(sqlx::Error::RowNotFound).is_fatal());
    }
}
