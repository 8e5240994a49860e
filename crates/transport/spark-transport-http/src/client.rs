use std::fmt;

use spark_transport::StreamTransport;
use tracing::{debug, debug_span, warn};

use crate::{
    config::HttpClientConfig,
    engine::{BodyFraming, EngineHandle, HandleSetup, HttpEngine, ReqwestEngine},
    error::{self, TransportError},
    header::{self, HeaderLine},
    option::{OptionId, OptionSet, OptionValue},
    shim::{self, InboundShim, OutboundShim, SharedBuffer},
};

/// 以 HTTP POST 承载 RPC 字节流的客户端传输。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - RPC 序列化层以任意次数、任意粒度写入字节，且不知道 HTTP 分帧；本类型把两次 `flush`
///   之间累计的字节变成**恰好一次** POST 的请求体，并把响应体整体放入读缓冲供顺序读取；
/// - 凭据、额外头部与引擎选项在每次创建引擎句柄时统一应用，保证多次请求之间配置一致。
///
/// ## 逻辑 (How)
/// - 写缓冲与读缓冲均为 [`SharedBuffer`]，创建句柄时把指向它们的出站/入站垫片注册给引擎；
/// - `keep_alive == true`：句柄在 `open` 时创建（或在首次 `flush` 时惰性创建），跨多次 `flush` 复用，
///   `close`/`Drop` 时释放；
/// - `keep_alive == false`：`open` 不做任何事，每次 `flush` 自建句柄、交换、立即释放，
///   无论交换成败；
/// - `flush` 先取出状态码再释放句柄，随后按“交换失败 → 网络错误，非 200 → 状态码错误”的顺序判定结果。
///
/// ## 契约 (What)
/// - `write` 只追加缓冲，从不触发 I/O；`read` 从不阻塞，缓冲耗尽后返回 0；
/// - `read_end` 清空读缓冲，为下一轮 写入 → 冲刷 → 读取 做准备；
/// - `peek` 恒为 `true`，不表示一定有待读数据；
/// - `is_open` 仅在长连接模式下有意义；
/// - 配置变更只影响下一次创建的句柄，不影响已存在的句柄。
///
/// ## 注意事项 (Trade-offs)
/// - 交换失败时写缓冲中未被引擎读取的字节会保留，调用方重新 `flush` 即重发同一请求；
///   读缓冲内容则不作保证；
/// - 所有可变操作均需 `&mut self`，单实例不支持并发使用。
pub struct HttpClientTransport<E: HttpEngine = ReqwestEngine> {
    url: String,
    keep_alive: bool,
    chunked: bool,
    expect_continue: bool,
    user_agent: String,
    credentials: Option<String>,
    headers: Vec<HeaderLine>,
    options: OptionSet,
    write_buffer: SharedBuffer,
    read_buffer: SharedBuffer,
    engine: E,
    handle: Option<E::Handle>,
}

impl HttpClientTransport<ReqwestEngine> {
    /// 以默认配置和默认引擎创建传输；URL 可以为空，但发起请求前必须是有效地址。
    pub fn new(url: impl Into<String>) -> Self {
        Self::assemble(HttpClientConfig::new(url), OptionSet::new(), ReqwestEngine::new())
    }

    /// 以给定配置和默认引擎创建传输。
    pub fn with_config(config: HttpClientConfig) -> Result<Self, TransportError> {
        Self::with_engine(config, ReqwestEngine::new())
    }
}

impl<E: HttpEngine> HttpClientTransport<E> {
    /// 以给定配置和引擎创建传输；配置中的选项在此解码并校验。
    pub fn with_engine(config: HttpClientConfig, engine: E) -> Result<Self, TransportError> {
        let mut options = OptionSet::new();
        for option in &config.options {
            options.insert_raw(option.id, &option.value)?;
        }
        Ok(Self::assemble(config, options, engine))
    }

    fn assemble(config: HttpClientConfig, options: OptionSet, engine: E) -> Self {
        Self {
            url: config.url,
            keep_alive: config.keep_alive,
            chunked: config.chunked,
            expect_continue: config.expect_continue,
            user_agent: config.user_agent,
            credentials: config.credentials,
            headers: config.headers.into_iter().map(HeaderLine::from).collect(),
            options,
            write_buffer: shim::shared_buffer(),
            read_buffer: shim::shared_buffer(),
            engine,
            handle: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_keep_alive(&self) -> bool {
        self.keep_alive
    }

    pub fn is_chunked(&self) -> bool {
        self.chunked
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn headers(&self) -> &[HeaderLine] {
        &self.headers
    }

    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    /// 写缓冲中等待下一次 `flush` 的字节数。
    pub fn pending_write(&self) -> usize {
        self.write_buffer.lock().available()
    }

    /// 读缓冲中尚未读取的字节数。
    pub fn pending_read(&self) -> usize {
        self.read_buffer.lock().available()
    }

    /// 设置 `user:password` 形式的基本认证凭据。
    pub fn set_credentials(&mut self, credentials: impl Into<String>) {
        self.credentials = Some(credentials.into());
    }

    /// 注册带类型的引擎选项；编号类别不受支持或取值类别不符时立即报错。
    pub fn set_option(&mut self, id: OptionId, value: OptionValue) -> Result<(), TransportError> {
        if let Some(previous) = self.options.insert(id, value)? {
            debug!(option = %id, %previous, "engine option replaced");
        }
        Ok(())
    }

    /// 注册字符串形式的引擎选项，按编号类别解码。
    pub fn set_raw_option(&mut self, id: u32, value: &str) -> Result<(), TransportError> {
        if let Some(previous) = self.options.insert_raw(id, value)? {
            debug!(option = id, %previous, "engine option replaced");
        }
        Ok(())
    }

    /// 追加一行原样发送的请求头。
    pub fn add_header(&mut self, line: impl Into<HeaderLine>) {
        self.headers.push(line.into());
    }

    fn handle_setup(&self) -> HandleSetup {
        HandleSetup {
            url: self.url.clone(),
            user_agent: self.user_agent.clone(),
            credentials: self.credentials.clone(),
            headers: header::build_header_list(self.chunked, self.expect_continue, &self.headers),
            options: self.options.to_vec(),
            outbound: OutboundShim::new(self.write_buffer.clone()),
            inbound: InboundShim::new(self.read_buffer.clone()),
        }
    }

    fn create_handle(&self) -> Result<E::Handle, TransportError> {
        let setup = self.handle_setup();
        debug!(
            url = %self.url,
            headers = setup.headers.len(),
            options = setup.options.len(),
            "creating engine handle"
        );
        self.engine.create_handle(setup)
    }

    /// 释放旧句柄后创建新句柄，保证同一时刻至多一个句柄存活。
    fn init(&mut self) -> Result<(), TransportError> {
        self.cleanup();
        let handle = self.create_handle()?;
        self.handle = Some(handle);
        Ok(())
    }

    /// 释放句柄及其头部列表；没有句柄时无动作。
    fn cleanup(&mut self) {
        if self.handle.take().is_some() {
            debug!(url = %self.url, "engine handle released");
        }
    }

    /// 取出（或新建）句柄执行一次交换；逐请求模式下交换结束即释放句柄。
    fn exchange(&mut self, body_len: usize) -> Result<(), TransportError> {
        let mut handle = match self.handle.take() {
            Some(handle) => handle,
            None => self.create_handle()?,
        };
        let outcome = handle.perform(self.body_framing(body_len));
        if self.keep_alive {
            self.handle = Some(handle);
        } else {
            drop(handle);
        }

        match outcome {
            Ok(200) => Ok(()),
            Ok(status) => Err(error::unexpected_status(&self.url, status)),
            Err(failure) => Err(error::network(&self.url, failure.into_detail())),
        }
    }

    fn body_framing(&self, body_len: usize) -> BodyFraming {
        if self.chunked {
            BodyFraming::Chunked
        } else {
            BodyFraming::Sized(body_len as u64)
        }
    }
}

impl<E: HttpEngine> StreamTransport for HttpClientTransport<E> {
    type Error = TransportError;

    fn open(&mut self) -> Result<(), TransportError> {
        if self.keep_alive {
            self.init()?;
        }
        Ok(())
    }

    fn close(&mut self) {
        self.cleanup();
    }

    fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    fn peek(&self) -> bool {
        true
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        Ok(self.read_buffer.lock().read(buf))
    }

    fn read_end(&mut self) {
        self.read_buffer.lock().reset();
    }

    fn write(&mut self, buf: &[u8]) -> Result<(), TransportError> {
        self.write_buffer.lock().write(buf);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), TransportError> {
        let body_len = self.pending_write();
        let span = debug_span!(
            "http.flush",
            url = %self.url,
            body_len,
            chunked = self.chunked,
            keep_alive = self.keep_alive
        );
        let _entered = span.enter();

        let result = self.exchange(body_len);
        match &result {
            Ok(()) => debug!(response_len = self.pending_read(), "flush completed"),
            Err(err) => warn!(code = err.code(), error = %err, "flush failed"),
        }
        result
    }
}

impl<E: HttpEngine> Drop for HttpClientTransport<E> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl<E: HttpEngine> fmt::Debug for HttpClientTransport<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientTransport")
            .field("url", &self.url)
            .field("keep_alive", &self.keep_alive)
            .field("chunked", &self.chunked)
            .field("open", &self.handle.is_some())
            .field("headers", &self.headers.len())
            .field("options", &self.options.len())
            .field("pending_write", &self.pending_write())
            .field("pending_read", &self.pending_read())
            .finish_non_exhaustive()
    }
}
