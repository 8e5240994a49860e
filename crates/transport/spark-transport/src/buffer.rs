use bytes::{Buf, Bytes, BytesMut};
use core::cmp;

/// 尾部追加、头部消费的内存字节缓冲。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 为“写入若干次 → 一次性冲刷”以及“一次性接收 → 分多次读取”两种节奏提供同一种承载结构；
/// - 屏蔽 `BytesMut` 的游标细节，让传输实现只关心“追加”“读取”“剩余量”“清空”四个动作。
///
/// ## 契约（What）
/// - `write`：把输入切片追加到尾部，容量按需增长，无上限；
/// - `read`：从头部取走 `min(dst.len(), available())` 字节，返回实际拷贝数；缓冲耗尽时返回 0；
/// - `available`：尚未被读取的字节数，始终与已写入且未读取的数据严格一致；
/// - `reset`：丢弃所有未读数据，保留已分配容量供下一轮复用。
///
/// ## 注意事项（Trade-offs）
/// - 长度以 `usize` 表达，不存在“负剩余量”这一非法状态；
/// - `reset` 不归还内存，长连接场景下峰值容量会被保留。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryBuffer {
    data: BytesMut,
}

impl MemoryBuffer {
    /// 创建空缓冲。
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建预留指定容量的空缓冲。
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: BytesMut::with_capacity(capacity),
        }
    }

    /// 追加字节到尾部。
    pub fn write(&mut self, src: &[u8]) {
        self.data.extend_from_slice(src);
    }

    /// 从头部读取并移除至多 `dst.len()` 字节。
    pub fn read(&mut self, dst: &mut [u8]) -> usize {
        let len = cmp::min(dst.len(), self.data.len());
        self.data.copy_to_slice(&mut dst[..len]);
        len
    }

    /// 返回尚未读取的字节数。
    pub fn available(&self) -> usize {
        self.data.len()
    }

    /// 缓冲是否已无可读数据。
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 以只读视图查看未读数据，不移动读游标。
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// 取走全部未读数据并冻结为 [`Bytes`]。
    pub fn take_all(&mut self) -> Bytes {
        self.data.split().freeze()
    }

    /// 丢弃全部未读数据。
    pub fn reset(&mut self) {
        self.data.clear();
    }
}
