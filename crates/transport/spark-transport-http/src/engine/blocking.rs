use std::time::Duration;

use reqwest::{
    Proxy,
    blocking::{Body, Client, ClientBuilder},
    header::{HeaderMap, HeaderName, HeaderValue},
    redirect::Policy,
};
use tracing::trace;

use super::{BodyFraming, EngineHandle, ExchangeFailure, HandleSetup, HttpEngine};
use crate::{
    error::{self, TransportError},
    header::HeaderLine,
    option::{OptionId, OptionValue},
    shim::{InboundShim, OutboundShim},
};

/// 基于 `reqwest` 阻塞客户端的默认引擎。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 为传输层提供开箱即用的引擎：TLS 由 rustls 提供，连接池由底层客户端维护；
/// - 一个句柄对应一个 [`Client`]，长连接模式下句柄跨多次 `flush` 复用，连接随之复用；
///   逐请求模式下句柄在交换后被丢弃，连接也随之关闭。
///
/// ## 逻辑 (How)
/// - 创建句柄时关闭重定向跟随、清除客户端默认的 30 秒超时，再按编号升序应用调用方选项；
/// - 头部列表解析为 [`HeaderMap`]，其中 `Transfer-Encoding` 行不直接写入请求，
///   而是由 [`BodyFraming`] 决定请求体是分块发送还是携带 `Content-Length`；
///   值为空的行（如 `Expect:`）表示不发送该头部；
/// - 执行交换时以出站垫片构造请求体，以 `copy_to` 把响应体灌入入站垫片。
///
/// ## 契约 (What)
/// - 不认识的选项编号、类别不符的取值、格式错误的头部行、无法构造的代理地址都会在
///   `create_handle` 返回配置错误；
/// - URL 格式错误不在创建时拦截，而是在 `perform` 时作为交换失败返回，保证错误信息附带 URL。
///
/// ## 注意事项 (Trade-offs)
/// - 阻塞客户端内部自带运行时线程，不可在异步运行时的工作线程上直接调用 `flush`。
#[derive(Clone, Debug, Default)]
pub struct ReqwestEngine;

impl ReqwestEngine {
    pub fn new() -> Self {
        Self
    }
}

impl HttpEngine for ReqwestEngine {
    type Handle = ReqwestHandle;

    fn create_handle(&self, setup: HandleSetup) -> Result<ReqwestHandle, TransportError> {
        let mut builder = Client::builder()
            .user_agent(setup.user_agent.as_str())
            .redirect(Policy::none())
            .timeout(None::<Duration>);
        for (id, value) in &setup.options {
            builder = apply_option(builder, *id, value)?;
        }
        let client = builder.build().map_err(|err| {
            error::configure(format!(
                "engine rejected handle setup: {}",
                ExchangeFailure::from_error(&err)
            ))
        })?;

        let headers = header_map(&setup.headers)?;
        let credentials = setup
            .basic_auth()
            .map(|(user, password)| (user.to_owned(), password.map(str::to_owned)));

        Ok(ReqwestHandle {
            client,
            url: setup.url,
            headers,
            credentials,
            outbound: setup.outbound,
            inbound: setup.inbound,
        })
    }
}

/// [`ReqwestEngine`] 创建的句柄。
#[derive(Debug)]
pub struct ReqwestHandle {
    client: Client,
    url: String,
    headers: HeaderMap,
    credentials: Option<(String, Option<String>)>,
    outbound: OutboundShim,
    inbound: InboundShim,
}

impl EngineHandle for ReqwestHandle {
    fn perform(&mut self, framing: BodyFraming) -> Result<u16, ExchangeFailure> {
        let body = match framing {
            BodyFraming::Chunked => Body::new(self.outbound.clone()),
            BodyFraming::Sized(len) => Body::sized(self.outbound.clone(), len),
        };
        let mut request = self
            .client
            .post(self.url.as_str())
            .headers(self.headers.clone())
            .body(body);
        if let Some((user, password)) = &self.credentials {
            request = request.basic_auth(user, password.as_deref());
        }

        let mut response = request
            .send()
            .map_err(|err| ExchangeFailure::from_error(&err))?;
        let status = response.status().as_u16();
        let received = response
            .copy_to(&mut self.inbound)
            .map_err(|err| ExchangeFailure::from_error(&err))?;
        trace!(status, received, "engine exchange finished");
        Ok(status)
    }
}

fn header_map(lines: &[HeaderLine]) -> Result<HeaderMap, TransportError> {
    let mut headers = HeaderMap::with_capacity(lines.len());
    for line in lines {
        if line.is_named("transfer-encoding") {
            continue;
        }
        let (name, value) = line.split().ok_or_else(|| error::malformed_header(line))?;
        // `Name:` 空值行表示抑制该头部。
        if value.is_empty() {
            continue;
        }
        let name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| error::malformed_header(line))?;
        let value = HeaderValue::from_str(value).map_err(|_| error::malformed_header(line))?;
        headers.append(name, value);
    }
    Ok(headers)
}

fn apply_option(
    builder: ClientBuilder,
    id: OptionId,
    value: &OptionValue,
) -> Result<ClientBuilder, TransportError> {
    let builder = match id {
        OptionId::TIMEOUT => builder.timeout(positive(id, value)?.map(Duration::from_secs)),
        OptionId::TIMEOUT_MS => builder.timeout(positive(id, value)?.map(Duration::from_millis)),
        OptionId::CONNECTTIMEOUT => {
            builder.connect_timeout(positive(id, value)?.map(Duration::from_secs))
        }
        OptionId::CONNECTTIMEOUT_MS => {
            builder.connect_timeout(positive(id, value)?.map(Duration::from_millis))
        }
        OptionId::TCP_KEEPIDLE => {
            builder.tcp_keepalive(positive(id, value)?.map(Duration::from_secs))
        }
        OptionId::VERBOSE => builder.connection_verbose(flag(id, value)?),
        OptionId::TCP_NODELAY => builder.tcp_nodelay(flag(id, value)?),
        OptionId::SSL_VERIFYPEER => builder.danger_accept_invalid_certs(!flag(id, value)?),
        OptionId::PROXY => {
            let proxy = Proxy::all(text(id, value)?).map_err(|err| {
                error::configure(format!(
                    "engine option {id} rejected: {}",
                    ExchangeFailure::from_error(&err)
                ))
            })?;
            builder.proxy(proxy)
        }
        OptionId::USERAGENT => builder.user_agent(text(id, value)?),
        _ => return Err(error::unknown_option(id)),
    };
    Ok(builder)
}

/// 非正数表示“不限”。
fn positive(id: OptionId, value: &OptionValue) -> Result<Option<u64>, TransportError> {
    let raw = value.as_integer().ok_or_else(|| mismatched(id, value))?;
    Ok(u64::try_from(raw).ok().filter(|secs| *secs > 0))
}

fn flag(id: OptionId, value: &OptionValue) -> Result<bool, TransportError> {
    value.as_flag().ok_or_else(|| mismatched(id, value))
}

fn text<'a>(id: OptionId, value: &'a OptionValue) -> Result<&'a str, TransportError> {
    value.as_text().ok_or_else(|| mismatched(id, value))
}

fn mismatched(id: OptionId, value: &OptionValue) -> TransportError {
    error::configure(format!("engine option {id} cannot take `{value}`"))
}
