use thiserror::Error;

/// Input rejected before any network activity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing URL")]
    MissingUrl,

    #[error("invalid headers: {0}")]
    InvalidHeaders(String),

    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
}

#[derive(Error, Debug)]
pub enum RestdeskError {
    #[error("请求校验失败: {0}")]
    Validation(#[from] ValidationError),

    #[error("HTTP 请求失败: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("历史记录存储错误: {0}")]
    Storage(String),

    #[error("SQLite 错误: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 解析错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("没有可导出的响应内容")]
    NothingToExport,

    #[error("历史记录不存在: {0}")]
    HistoryNotFound(String),

    #[error("交互已取消: {0}")]
    Interaction(String),
}

/// Result type for restdesk crate
pub type Result<T> = std::result::Result<T, RestdeskError>;
