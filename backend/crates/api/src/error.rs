use thiserror::Error;

/// 上游抓取/解析失败的统一分类。
///
/// 所有失败都在调用点被捕获并转成这个类型；不重试，也不会让进程退出。
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("无效代码: {0}")]
    InvalidCode(String),

    #[error("无效参数: {0}")]
    InvalidInput(String),

    #[error("网络请求出错: {0}")]
    Network(#[from] reqwest::Error),

    #[error("无法解析数据: {0}")]
    Malformed(String),

    #[error("字段缺失或为零: {0}")]
    MissingField(&'static str),
}

impl FetchError {
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed(detail.into())
    }

    /// 面向用户的简短分类名（用于 JSON 中的 `kind` 字段）。
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCode(_) => "invalid_code",
            Self::InvalidInput(_) => "invalid_input",
            Self::Network(_) => "network",
            Self::Malformed(_) => "malformed",
            Self::MissingField(_) => "missing_field",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidCode(_) | Self::InvalidInput(_))
    }
}
