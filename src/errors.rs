use std::fmt;

use actix_web::http::StatusCode;

/// 基础设施错误（存储、配置、序列化）
#[derive(Debug, Clone)]
pub enum NotelinkError {
    StoreConnection(String),
    StoreOperation(String),
    StorePluginNotFound(String),
    Config(String),
    Validation(String),
    NotFound(String),
    Serialization(String),
    FileOperation(String),
}

impl NotelinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            NotelinkError::StoreConnection(_) => "E001",
            NotelinkError::StoreOperation(_) => "E002",
            NotelinkError::StorePluginNotFound(_) => "E003",
            NotelinkError::Config(_) => "E004",
            NotelinkError::Validation(_) => "E005",
            NotelinkError::NotFound(_) => "E006",
            NotelinkError::Serialization(_) => "E007",
            NotelinkError::FileOperation(_) => "E008",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            NotelinkError::StoreConnection(_) => "Store Connection Error",
            NotelinkError::StoreOperation(_) => "Store Operation Error",
            NotelinkError::StorePluginNotFound(_) => "Store Plugin Not Found",
            NotelinkError::Config(_) => "Configuration Error",
            NotelinkError::Validation(_) => "Validation Error",
            NotelinkError::NotFound(_) => "Resource Not Found",
            NotelinkError::Serialization(_) => "Serialization Error",
            NotelinkError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            NotelinkError::StoreConnection(msg)
            | NotelinkError::StoreOperation(msg)
            | NotelinkError::StorePluginNotFound(msg)
            | NotelinkError::Config(msg)
            | NotelinkError::Validation(msg)
            | NotelinkError::NotFound(msg)
            | NotelinkError::Serialization(msg)
            | NotelinkError::FileOperation(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于启动失败时的终端输出）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for NotelinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for NotelinkError {}

// 便捷的构造函数
impl NotelinkError {
    pub fn store_connection<T: Into<String>>(msg: T) -> Self {
        NotelinkError::StoreConnection(msg.into())
    }

    pub fn store_operation<T: Into<String>>(msg: T) -> Self {
        NotelinkError::StoreOperation(msg.into())
    }

    pub fn store_plugin_not_found<T: Into<String>>(msg: T) -> Self {
        NotelinkError::StorePluginNotFound(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        NotelinkError::Config(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        NotelinkError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        NotelinkError::NotFound(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        NotelinkError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        NotelinkError::FileOperation(msg.into())
    }
}

impl From<redis::RedisError> for NotelinkError {
    fn from(err: redis::RedisError) -> Self {
        NotelinkError::StoreOperation(err.to_string())
    }
}

impl From<std::io::Error> for NotelinkError {
    fn from(err: std::io::Error) -> Self {
        NotelinkError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for NotelinkError {
    fn from(err: serde_json::Error) -> Self {
        NotelinkError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for NotelinkError {
    fn from(err: config::ConfigError) -> Self {
        NotelinkError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, NotelinkError>;

/// Caller-facing failure of a share (issuance) request.
///
/// Every variant maps onto exactly one wire code: `EMPTY_CONTENT`,
/// `CONTENT_TOO_LARGE`, `RATE_LIMITED` or `SERVER_ERROR`.
#[derive(Debug, Clone)]
pub enum ShareError {
    /// Body was not valid JSON of the expected shape
    InvalidBody(String),
    EmptyContent,
    ContentTooLarge { limit: usize },
    RateLimited,
    /// Every slug attempt collided with an occupied key
    SlugExhausted,
    Internal(String),
}

impl ShareError {
    /// Wire code reported in the `code` field
    pub fn code(&self) -> &'static str {
        match self {
            ShareError::EmptyContent => "EMPTY_CONTENT",
            ShareError::ContentTooLarge { .. } => "CONTENT_TOO_LARGE",
            ShareError::RateLimited => "RATE_LIMITED",
            ShareError::InvalidBody(_) | ShareError::SlugExhausted | ShareError::Internal(_) => {
                "SERVER_ERROR"
            }
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            ShareError::InvalidBody(_) | ShareError::EmptyContent => StatusCode::BAD_REQUEST,
            ShareError::ContentTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ShareError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ShareError::SlugExhausted | ShareError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Human readable message; never echoes internal error details
    pub fn message(&self) -> String {
        match self {
            ShareError::InvalidBody(_) => "Invalid JSON body".to_string(),
            ShareError::EmptyContent => "Content cannot be empty".to_string(),
            ShareError::ContentTooLarge { limit } => {
                format!("Content exceeds maximum size of {}KB", limit / 1024)
            }
            ShareError::RateLimited => "Rate limit exceeded. Please try again later.".to_string(),
            ShareError::SlugExhausted => {
                "Failed to generate unique link. Please try again.".to_string()
            }
            ShareError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl fmt::Display for ShareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShareError::InvalidBody(detail) | ShareError::Internal(detail) => {
                write!(f, "{} ({}): {}", self.code(), self.message(), detail)
            }
            _ => write!(f, "{}: {}", self.code(), self.message()),
        }
    }
}

impl std::error::Error for ShareError {}

impl From<NotelinkError> for ShareError {
    fn from(err: NotelinkError) -> Self {
        ShareError::Internal(err.to_string())
    }
}

/// Failure of a resolution request
#[derive(Debug, Clone)]
pub enum ResolveError {
    /// No slug supplied; rejected before touching the store
    EmptySlug,
    /// Never issued, expired, or unreadable
    NotFound,
    Store(NotelinkError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::EmptySlug => write!(f, "Slug is required"),
            ResolveError::NotFound => write!(f, "Note not found or has expired"),
            ResolveError::Store(e) => write!(f, "Store failure: {}", e),
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<NotelinkError> for ResolveError {
    fn from(err: NotelinkError) -> Self {
        ResolveError::Store(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_share_error_codes_and_statuses() {
        let cases = [
            (ShareError::EmptyContent, "EMPTY_CONTENT", 400),
            (
                ShareError::ContentTooLarge { limit: 51200 },
                "CONTENT_TOO_LARGE",
                413,
            ),
            (ShareError::RateLimited, "RATE_LIMITED", 429),
            (ShareError::SlugExhausted, "SERVER_ERROR", 500),
            (ShareError::Internal("boom".into()), "SERVER_ERROR", 500),
            (ShareError::InvalidBody("eof".into()), "SERVER_ERROR", 400),
        ];

        for (err, code, status) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.http_status().as_u16(), status);
        }
    }

    #[test]
    fn test_content_too_large_message_reports_limit() {
        let err = ShareError::ContentTooLarge { limit: 50 * 1024 };
        assert_eq!(err.message(), "Content exceeds maximum size of 50KB");
    }

    #[test]
    fn test_internal_message_hides_detail() {
        let err = ShareError::Internal("connection refused at 10.0.0.3".into());
        assert_eq!(err.message(), "Internal server error");
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_notelink_error_format() {
        let err = NotelinkError::store_operation("SET failed");
        assert_eq!(err.code(), "E002");
        assert_eq!(err.to_string(), "Store Operation Error: SET failed");
        assert!(err.format_colored().contains("SET failed"));
    }

    #[test]
    fn test_store_error_converts_to_internal() {
        let err: ShareError = NotelinkError::store_connection("down").into();
        assert!(matches!(err, ShareError::Internal(_)));
        assert_eq!(err.code(), "SERVER_ERROR");
    }
}
