//! 引擎回调与传输缓冲之间的数据垫片。
//!
//! # 设计动机（Why）
//! - 引擎按“给我至多 N 字节请求体”“这里有 N 字节响应体”的回调节奏工作，
//!   而传输实例持有的是两块内存缓冲；垫片负责在两者之间搬运字节；
//! - 垫片在句柄配置时注册给引擎，并携带指向所属传输实例缓冲的共享引用，
//!   因此不需要任何全局状态即可定位到正确的缓冲。
//!
//! # 契约（What）
//! - [`OutboundShim::fill`]：返回 `min(dst.len(), available)` 字节并从写缓冲头部移除，`0` 表示请求体结束；
//! - [`InboundShim::deliver`]：无条件追加到读缓冲，并返回与输入完全相等的字节数；
//! - 两者都不阻塞、不 panic，失败只通过返回值表达；同时实现 `std::io::Read`/`Write`，
//!   可直接交给以读写器为接口的引擎。
//!
//! # 注意事项（Trade-offs）
//! - 缓冲以 `parking_lot::Mutex` 保护，传输实例在引擎执行期间不会持有锁，因此垫片加锁不会竞争。

use std::{io, sync::Arc};

use parking_lot::Mutex;
use spark_transport::MemoryBuffer;

/// 传输实例与垫片共享的缓冲。
pub type SharedBuffer = Arc<Mutex<MemoryBuffer>>;

/// 创建空的共享缓冲。
pub fn shared_buffer() -> SharedBuffer {
    Arc::new(Mutex::new(MemoryBuffer::new()))
}

/// 出站垫片：为引擎提供请求体。
#[derive(Clone, Debug)]
pub struct OutboundShim {
    buffer: SharedBuffer,
}

impl OutboundShim {
    pub fn new(buffer: SharedBuffer) -> Self {
        Self { buffer }
    }

    /// 从写缓冲头部取出至多 `dst.len()` 字节。
    pub fn fill(&self, dst: &mut [u8]) -> usize {
        let mut buffer = self.buffer.lock();
        let len = dst.len().min(buffer.available());
        buffer.read(&mut dst[..len])
    }

    /// 写缓冲中尚未发送的字节数。
    pub fn available(&self) -> usize {
        self.buffer.lock().available()
    }
}

impl io::Read for OutboundShim {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.fill(buf))
    }
}

/// 入站垫片：接收引擎交付的响应体。
#[derive(Clone, Debug)]
pub struct InboundShim {
    buffer: SharedBuffer,
}

impl InboundShim {
    pub fn new(buffer: SharedBuffer) -> Self {
        Self { buffer }
    }

    /// 追加响应字节，返回值恒等于 `src.len()`。
    pub fn deliver(&self, src: &[u8]) -> usize {
        self.buffer.lock().write(src);
        src.len()
    }
}

impl io::Write for InboundShim {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.deliver(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
