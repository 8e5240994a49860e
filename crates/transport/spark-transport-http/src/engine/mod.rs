//! HTTP 引擎接缝。
//!
//! # 设计动机（Why）
//! - 建连、TLS、分块编码、连接复用等线路细节属于引擎职责，传输层只需要“创建句柄”和
//!   “执行一次交换”两个动作；以 trait 描述这条接缝，使默认引擎可以替换，测试也能注入记录型引擎。
//!
//! # 契约（What）
//! - [`HttpEngine::create_handle`]：依据 [`HandleSetup`] 构造句柄；配置无法被接受时返回
//!   [`TransportError::Config`](crate::TransportError::Config)；
//! - [`EngineHandle::perform`]：以 POST 方法执行一次交换，经出站垫片读取请求体、经入站垫片交付
//!   响应体，返回状态码；交换无法完成时返回 [`ExchangeFailure`]；
//! - 句柄在 `Drop` 时释放全部资源（连接、头部列表）。

mod blocking;
#[cfg(test)]
pub(crate) mod recording;

use std::{error::Error as StdError, fmt};

pub use blocking::{ReqwestEngine, ReqwestHandle};

use crate::{
    error::TransportError,
    header::HeaderLine,
    option::{OptionId, OptionValue},
    shim::{InboundShim, OutboundShim},
};

/// 创建一个引擎句柄所需的全部配置。
#[derive(Clone, Debug)]
pub struct HandleSetup {
    /// 目标 URL。
    pub url: String,
    /// User-Agent 标识。
    pub user_agent: String,
    /// `user:password` 形式的基本认证凭据。
    pub credentials: Option<String>,
    /// 固定声明与调用方头部，已按最终顺序排列。
    pub headers: Vec<HeaderLine>,
    /// 调用方注册的引擎选项，编号升序。
    pub options: Vec<(OptionId, OptionValue)>,
    /// 请求体来源。
    pub outbound: OutboundShim,
    /// 响应体去向。
    pub inbound: InboundShim,
}

impl HandleSetup {
    /// 按第一个冒号拆分凭据；没有冒号时整个字符串视为用户名。
    pub fn basic_auth(&self) -> Option<(&str, Option<&str>)> {
        let credentials = self.credentials.as_deref()?;
        Some(match credentials.split_once(':') {
            Some((user, password)) => (user, Some(password)),
            None => (credentials, None),
        })
    }
}

/// 请求体的分帧方式。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BodyFraming {
    /// 不预先声明长度，使用分块编码。
    Chunked,
    /// 预先声明 `Content-Length`。
    Sized(u64),
}

/// 引擎无法完成交换时给出的诊断。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExchangeFailure {
    detail: String,
}

impl ExchangeFailure {
    const UNKNOWN: &'static str = "unknown engine failure";

    pub fn new(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        if detail.is_empty() {
            return Self {
                detail: Self::UNKNOWN.to_owned(),
            };
        }
        Self { detail }
    }

    /// 沿 `source()` 链拼接完整的诊断文本，跳过与已有文本重复的层级。
    pub fn from_error(error: &(dyn StdError + 'static)) -> Self {
        let mut detail = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            if !text.is_empty() && !detail.contains(&text) {
                if !detail.is_empty() {
                    detail.push_str(": ");
                }
                detail.push_str(&text);
            }
            source = cause.source();
        }
        Self::new(detail)
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn into_detail(self) -> String {
        self.detail
    }
}

impl fmt::Display for ExchangeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.detail)
    }
}

/// HTTP 引擎：句柄工厂。
pub trait HttpEngine {
    /// 引擎句柄类型。
    type Handle: EngineHandle;

    /// 按配置创建句柄。
    fn create_handle(&self, setup: HandleSetup) -> Result<Self::Handle, TransportError>;
}

/// 一个已配置的引擎句柄。
pub trait EngineHandle {
    /// 同步执行一次 POST 交换，返回响应状态码。
    fn perform(&mut self, framing: BodyFraming) -> Result<u16, ExchangeFailure>;
}
