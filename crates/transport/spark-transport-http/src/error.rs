use thiserror::Error;

use crate::{header::HeaderLine, option::OptionId};

/// 描述一类失败对应的稳定错误码与默认文案。
#[derive(Clone, Copy, Debug)]
pub(crate) struct OperationKind {
    pub code: &'static str,
    pub message: &'static str,
}

pub(crate) const CONFIGURE: OperationKind = OperationKind {
    code: "spark.transport.http.configure_failed",
    message: "http configure",
};
pub(crate) const FLUSH: OperationKind = OperationKind {
    code: "spark.transport.http.flush_failed",
    message: "http flush",
};
pub(crate) const STATUS: OperationKind = OperationKind {
    code: "spark.transport.http.unexpected_status",
    message: "http status",
};

/// HTTP 传输对外暴露的唯一错误类型。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 调用方只需面对一种错误类型即可处理 `flush` 的全部失败路径，同时仍能按类别决定是否重试；
/// - 稳定错误码便于日志聚合与告警规则匹配，不必解析底层引擎的文案。
///
/// ## 契约 (What)
/// - `Config`：配置无法被接受，例如选项编号不属于任何类别、取值无法解码、引擎不认识该选项、
///   头部行格式错误；可能在注册时或创建句柄时抛出；
/// - `Network`：交换未能完成（解析、建连、TLS、连接中断等），`detail` 为引擎诊断文本；
/// - `Status`：交换完成但状态码不是 `200`；
/// - `Network`/`Status` 的文案均为 `flush to <url> failed: ...`，保证日志中同时出现目标 URL 与原因。
///
/// ## 注意事项 (Trade-offs)
/// - 失败后读缓冲内容不作保证，调用方不应尝试读取“部分响应”；
/// - `is_retryable` 只是分类提示，适配器自身从不重试。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportError {
    /// 配置错误。
    #[error("http configure: {detail}")]
    Config { detail: String },

    /// 网络层失败。
    #[error("flush to {url} failed: {detail}")]
    Network { url: String, detail: String },

    /// 非 200 状态码。
    #[error("flush to {url} failed: {status}")]
    Status { url: String, status: u16 },
}

impl TransportError {
    fn kind(&self) -> OperationKind {
        match self {
            TransportError::Config { .. } => CONFIGURE,
            TransportError::Network { .. } => FLUSH,
            TransportError::Status { .. } => STATUS,
        }
    }

    /// 返回稳定错误码。
    pub fn code(&self) -> &'static str {
        self.kind().code
    }

    /// 返回失败所属的操作名，供日志字段使用。
    pub fn operation(&self) -> &'static str {
        self.kind().message
    }

    /// 网络层失败被视为可由调用方重试；配置错误与状态码错误重试无益。
    pub fn is_retryable(&self) -> bool {
        matches!(self, TransportError::Network { .. })
    }

    /// 若为状态码错误，返回服务端给出的状态码。
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// 构造配置错误。
pub(crate) fn configure(detail: impl Into<String>) -> TransportError {
    TransportError::Config {
        detail: detail.into(),
    }
}

/// 选项编号不属于任何已知类别。
pub(crate) fn unsupported_category(id: OptionId) -> TransportError {
    configure(format!(
        "engine option {} does not belong to a supported category",
        id.raw()
    ))
}

/// 引擎不认识该选项。
pub(crate) fn unknown_option(id: OptionId) -> TransportError {
    configure(format!(
        "engine option {} is not recognized by the engine",
        id.raw()
    ))
}

/// 头部行无法拆分为名称与值，或名称/值包含非法字符。
pub(crate) fn malformed_header(line: &HeaderLine) -> TransportError {
    configure(format!("malformed header line `{line}`"))
}

pub(crate) fn network(url: &str, detail: impl Into<String>) -> TransportError {
    TransportError::Network {
        url: url.to_owned(),
        detail: detail.into(),
    }
}

pub(crate) fn unexpected_status(url: &str, status: u16) -> TransportError {
    TransportError::Status {
        url: url.to_owned(),
        status,
    }
}
