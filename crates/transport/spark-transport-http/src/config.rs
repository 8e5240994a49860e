use serde::Deserialize;

use crate::error::{self, TransportError};

/// 默认 User-Agent。
pub const DEFAULT_USER_AGENT: &str = concat!("spark-transport-http/", env!("CARGO_PKG_VERSION"));

/// 字符串形式的引擎选项，解码规则见 [`OptionSet::insert_raw`](crate::OptionSet::insert_raw)。
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RawOption {
    pub id: u32,
    pub value: String,
}

/// HTTP 传输的构造配置。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 把“目标 URL + 句柄模式 + 分帧方式 + 凭据/头部/选项”集中为一个可序列化的值，
///   宿主既可以在代码中以 Builder 方式组装，也可以从 TOML 片段加载；
/// - 选项保持字符串形式，直到交给 [`HttpClientTransport`](crate::HttpClientTransport)
///   时才按编号类别解码并校验，从而与运行期 `set_raw_option` 走同一条校验路径。
///
/// ## 契约（What）
/// - `keep_alive`：`true` 时句柄在 `open` 创建并跨 `flush` 复用，`false` 时每次 `flush` 自建自毁；
/// - `chunked`：`true` 时请求体分块发送，`false` 时预先声明 `Content-Length`；
/// - `expect_continue`：`false` 时在头部列表中加入空的 `Expect:` 行；
/// - 未出现在 TOML 中的字段取 [`Default`] 值，未知字段视为配置错误。
///
/// ## 注意事项（Trade-offs）
/// - URL 在此不做解析，格式错误会在第一次 `flush` 时以网络错误的形式暴露并附带 URL。
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HttpClientConfig {
    pub url: String,
    pub keep_alive: bool,
    pub chunked: bool,
    pub expect_continue: bool,
    pub user_agent: String,
    pub credentials: Option<String>,
    pub headers: Vec<String>,
    pub options: Vec<RawOption>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            keep_alive: true,
            chunked: true,
            expect_continue: true,
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            credentials: None,
            headers: Vec::new(),
            options: Vec::new(),
        }
    }
}

impl HttpClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// 从 TOML 文本加载配置。
    pub fn from_toml_str(text: &str) -> Result<Self, TransportError> {
        toml::from_str(text)
            .map_err(|err| error::configure(format!("invalid transport configuration: {err}")))
    }

    pub fn with_keep_alive(mut self, keep_alive: bool) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn with_chunked(mut self, chunked: bool) -> Self {
        self.chunked = chunked;
        self
    }

    pub fn with_expect_continue(mut self, expect_continue: bool) -> Self {
        self.expect_continue = expect_continue;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_credentials(mut self, credentials: impl Into<String>) -> Self {
        self.credentials = Some(credentials.into());
        self
    }

    pub fn with_header(mut self, line: impl Into<String>) -> Self {
        self.headers.push(line.into());
        self
    }

    pub fn with_raw_option(mut self, id: u32, value: impl Into<String>) -> Self {
        self.options.push(RawOption {
            id,
            value: value.into(),
        });
        self
    }
}
