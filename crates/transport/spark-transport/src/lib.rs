#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![doc = "spark-transport: RPC 字节流传输契约。"]
#![doc = ""]
#![doc = "== 使命概述 =="]
#![doc = "- **Why**：RPC 序列化层只理解“读/写/冲刷”三种动作，本 crate 为其提供与具体承载协议无关的统一契约。"]
#![doc = "- **What**：定义 [`StreamTransport`] trait 与先进先出的 [`MemoryBuffer`]，HTTP 等实现 crate 只需依赖本 crate。"]
#![doc = "- **How**：契约保持同步、单线程语义，缓冲基于 `bytes::BytesMut`，面向 `no_std + alloc` 环境同样可用。"]

extern crate alloc;

pub mod buffer;
pub mod stream;

pub use buffer::MemoryBuffer;
pub use stream::StreamTransport;
