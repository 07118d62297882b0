use std::fmt;

// =========================================================
// 错误类型枚举
// =========================================================

/// 错误类型枚举
///
/// 对用户而言，除了 `Validation` 与 `Busy`，其余类型都会被折叠成同一条
/// 通用的 "操作失败" 提示；区分它们只为日志与调试。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 客户端校验失败，请求未发出
    Validation,
    /// 另一项网络操作仍在进行
    Busy,
    /// 401: 会话缺失或令牌无效
    Unauthorized,
    /// 403: 后端拒绝访问
    Forbidden,
    /// 404: 资源未找到
    NotFound,
    /// 其他非 2xx 响应
    Server,
    /// 网络层失败（请求未得到 HTTP 响应）
    Transport,
    /// 请求或响应 JSON 编解码失败
    Serialization,
    /// 运行时配置缺失或非法
    Config,
}

impl ErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "INVALID_INPUT",
            ErrorKind::Busy => "OPERATION_IN_FLIGHT",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "RESOURCE_NOT_FOUND",
            ErrorKind::Server => "SERVER_ERROR",
            ErrorKind::Transport => "TRANSPORT_ERROR",
            ErrorKind::Serialization => "JSON_ERROR",
            ErrorKind::Config => "CONFIG_ERROR",
        }
    }

    /// 根据 HTTP 状态码归类后端拒绝
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => ErrorKind::Unauthorized,
            403 => ErrorKind::Forbidden,
            404 => ErrorKind::NotFound,
            _ => ErrorKind::Server,
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 记录错误发生时的操作和相关细节，如 `api.update(65a1)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorSpan {
    pub operation: String,
    pub detail: Option<String>,
}

// =========================================================
// 核心错误类型
// =========================================================

#[derive(Debug)]
pub struct PortalError {
    kind: ErrorKind,
    message: String,
    /// 后端返回的 HTTP 状态码（若有）
    status: Option<u16>,
    source: Option<Box<dyn std::error::Error + 'static>>,
    spans: Vec<ErrorSpan>,
}

impl PortalError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            source: None,
            spans: Vec::new(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn busy(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Busy, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unauthorized, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Serialization, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// 后端返回非 2xx 状态
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        let mut err = Self::new(ErrorKind::from_status(status), body);
        err.status = Some(status);
        err
    }

    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: None,
        });
        self
    }

    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan {
            operation: operation.into(),
            detail: Some(detail.into()),
        });
        self
    }

    pub fn with_source<E: std::error::Error + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {})", status)?;
        }

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for PortalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_deref()
    }
}

pub type PortalResult<T> = std::result::Result<T, PortalError>;

// =========================================================
// 类型转换实现
// =========================================================

impl From<crate::request::HttpError> for PortalError {
    fn from(e: crate::request::HttpError) -> Self {
        PortalError::transport(e.to_string()).with_source(e)
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(e: serde_json::Error) -> Self {
        PortalError::serialization(e.to_string()).with_source(e)
    }
}

impl From<crate::validation::ValidationError> for PortalError {
    fn from(e: crate::validation::ValidationError) -> Self {
        PortalError::validation(e.to_string()).with_source(e)
    }
}

impl From<crate::config::ConfigError> for PortalError {
    fn from(e: crate::config::ConfigError) -> Self {
        PortalError::config(e.to_string()).with_source(e)
    }
}
