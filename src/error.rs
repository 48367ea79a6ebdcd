//! Trivia API 统一错误类型
//!
//! 所有错误在 HTTP 边界统一转换为 `{success: false, error, message}`。
//! 格式错误的请求（缺少必填字段、无法解析的 JSON）沿用历史行为映射为 404，
//! 而不是单独的 400。

use serde::Serialize;
use thiserror::Error;

/// 统一结果类型
pub type TriviaResult<T> = Result<T, TriviaError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriviaError {
    /// 资源不存在 / 必需列表为空
    #[error("{0}")]
    NotFound(String),

    /// 写入时必填字段缺失或无效
    #[error("{0}")]
    Unprocessable(String),

    /// 请求格式错误，对外表现为 404
    #[error("{0}")]
    BadRequest(String),

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// 存储层错误（连接池、SQL）
    #[error("Storage error: {0}")]
    Storage(String),

    /// 其他内部错误（序列化、任务调度等）
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TriviaError {
    pub fn not_found(message: impl Into<String>) -> Self {
        TriviaError::NotFound(message.into())
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        TriviaError::Unprocessable(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        TriviaError::BadRequest(message.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        TriviaError::Storage(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        TriviaError::Internal(message.into())
    }

    /// HTTP 状态码
    pub fn status_code(&self) -> u16 {
        match self {
            TriviaError::NotFound(_) | TriviaError::BadRequest(_) => 404,
            TriviaError::Unprocessable(_) => 422,
            TriviaError::MethodNotAllowed => 405,
            TriviaError::PayloadTooLarge { .. } => 413,
            TriviaError::Storage(_) | TriviaError::Internal(_) => 500,
        }
    }

    /// 对外消息：存储层细节不暴露给调用方
    pub fn public_message(&self) -> String {
        match self {
            TriviaError::Storage(_) | TriviaError::Internal(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            success: false,
            error: self.status_code(),
            message: self.public_message(),
        }
    }
}

/// 统一错误响应体
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: u16,
    pub message: String,
}

impl From<rusqlite::Error> for TriviaError {
    fn from(e: rusqlite::Error) -> Self {
        TriviaError::Storage(format!("{:#}", e))
    }
}

impl From<serde_json::Error> for TriviaError {
    fn from(e: serde_json::Error) -> Self {
        TriviaError::Internal(format!("JSON serialization: {}", e))
    }
}

impl From<r2d2::Error> for TriviaError {
    fn from(e: r2d2::Error) -> Self {
        TriviaError::Storage(format!("connection pool: {}", e))
    }
}
