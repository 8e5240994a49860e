/// RPC 序列化层所依赖的同步字节流传输接口。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 序列化层只需要“写入字节 → 冲刷 → 读取字节”的节奏，不关心承载介质是套接字、HTTP
///   还是内存；本 trait 把这组动作收敛为唯一依赖面；
/// - 实现方可以自由决定何时真正触发 I/O（例如 HTTP 实现只在 `flush` 时发起请求）。
///
/// ## 契约说明（What）
/// - `open`/`close`：准备与释放底层资源；`close` 必须幂等；
/// - `is_open`：是否持有底层资源；
/// - `peek`：是否“可能”还有待读数据，实现可以保守地恒返回 `true`；
/// - `read`：读取至多 `buf.len()` 字节，返回实际读取数，`0` 表示当前无数据；
/// - `read_end`：一次响应消费完毕的信号；
/// - `write`：追加待发送字节；`write_end`：一次请求写入完毕的信号；
/// - `flush`：把已写入字节真正发出，并等待对端响应（若实现为请求/响应式）。
///
/// ## 风险提示（Trade-offs）
/// - 所有方法都接收 `&mut self`，单实例的并发访问由借用检查器直接拒绝；
/// - `flush` 为阻塞调用，调用方需要自行规划线程或超时策略。
pub trait StreamTransport {
    /// 实现相关的错误类型。
    type Error: core::fmt::Debug;

    /// 准备底层资源。
    fn open(&mut self) -> Result<(), Self::Error>;

    /// 释放底层资源，重复调用无副作用。
    fn close(&mut self);

    /// 是否持有底层资源。
    fn is_open(&self) -> bool;

    /// 是否可能仍有数据可读。
    fn peek(&self) -> bool;

    /// 读取至多 `buf.len()` 字节。
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// 标记一次读取周期结束。
    fn read_end(&mut self);

    /// 追加待发送字节。
    fn write(&mut self, buf: &[u8]) -> Result<(), Self::Error>;

    /// 标记一次写入周期结束，默认无动作。
    fn write_end(&mut self) {}

    /// 发送已写入的数据。
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// 循环读取直到 `buf` 被填满或某次读取返回 0，返回累计读取的字节数。
    fn read_all(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }
}
