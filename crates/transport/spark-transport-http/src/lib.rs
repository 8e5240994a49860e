#![deny(unsafe_code)]
#![doc = r#"
# spark-transport-http

## 设计动机（Why）
- **定位**：让只懂字节流读写的 RPC 序列化层，经由 HTTP POST 而非裸套接字与服务端通信。
- **架构角色**：实现 [`spark_transport::StreamTransport`] 契约，位于序列化层与 HTTP 引擎之间；
  引擎（建连、TLS、分块/长连接细节）被视为黑盒，每次 `flush` 调用一次。
- **设计理念**：写入只进缓冲，`flush` 把累计字节作为**恰好一次** POST 的请求体发出，
  响应体完整落入读缓冲后再交给调用方顺序读取。

## 核心契约（What）
- **写入**：[`HttpClientTransport::write`](spark_transport::StreamTransport::write) 仅追加到写缓冲，不触发 I/O；
- **冲刷**：一次 POST，请求头为
  `Transfer-Encoding: chunked`（分块模式）、`Content-Type: application/x-thrift`、
  `Accept: application/x-thrift`，随后按注册顺序追加调用方头部；
- **状态码**：只有 `200` 视为成功，其余一律映射为 [`TransportError::Status`]；
  建连/TLS/传输中断映射为 [`TransportError::Network`]；
- **配置**：凭据、额外头部与引擎选项只在下一次创建引擎句柄时生效。

## 实现策略（How）
- [`engine`] 模块定义引擎接缝 [`HttpEngine`]/[`EngineHandle`]，默认实现
  [`ReqwestEngine`] 基于 `reqwest` 阻塞客户端；
- [`shim`] 模块提供出站/入站两个数据垫片，持有传输实例缓冲的共享引用，在句柄配置时注册给引擎；
- [`option`] 模块以带标签的 [`OptionValue`] 表达引擎选项，注册时即按编号区间校验类别；
- 长连接与逐请求句柄两种模式由运行期配置 [`HttpClientConfig::keep_alive`] 切换。

## 风险与考量（Trade-offs）
- **阻塞**：`flush` 阻塞调用线程直至交换完成，适配器本身不设超时，需通过
  [`OptionId::TIMEOUT_MS`] 等选项交给引擎；
- **无重试**：任何失败都立即上抛，重试策略归调用方；失败后读缓冲内容不作保证；
- **重定向**：3xx 不跟随，按非 200 处理。
"#]

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod header;
pub mod option;
pub mod shim;

pub use client::HttpClientTransport;
pub use config::{HttpClientConfig, RawOption};
pub use engine::{
    BodyFraming, EngineHandle, ExchangeFailure, HandleSetup, HttpEngine, ReqwestEngine,
};
pub use error::TransportError;
pub use header::HeaderLine;
pub use option::{OptionCategory, OptionId, OptionSet, OptionValue};
pub use shim::{InboundShim, OutboundShim, SharedBuffer};
