use std::fmt;

/// RPC 负载的媒体类型。
pub const CONTENT_TYPE: &str = "application/x-thrift";

/// 一行原样保存的请求头，形如 `Name: Value`。
///
/// 传输层不解析、不去重，只保证按注册顺序交给引擎；由引擎在创建句柄时决定能否接受。
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HeaderLine(String);

impl HeaderLine {
    pub fn new(line: impl Into<String>) -> Self {
        Self(line.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 以第一个冒号拆分为 `(名称, 值)`，两侧空白被去除；无冒号或名称为空时返回 `None`。
    ///
    /// `"Expect:"` 这类空值行合法，表示向引擎声明“不要发送该头部的默认值”。
    pub fn split(&self) -> Option<(&str, &str)> {
        let (name, value) = self.0.split_once(':')?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name, value.trim()))
    }

    /// 名称是否与给定名称相同（忽略大小写）。
    pub fn is_named(&self, expected: &str) -> bool {
        self.split()
            .is_some_and(|(name, _)| name.eq_ignore_ascii_case(expected))
    }
}

impl fmt::Display for HeaderLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HeaderLine {
    fn from(line: &str) -> Self {
        Self::new(line)
    }
}

impl From<String> for HeaderLine {
    fn from(line: String) -> Self {
        Self(line)
    }
}

/// 组装一次句柄配置使用的完整头部列表。
///
/// # 教案级注释
///
/// ## 契约（What）
/// - 顺序固定为：`Transfer-Encoding: chunked`（仅分块模式）→ `Expect:`（仅关闭
///   `expect_continue` 时）→ `Content-Type` → `Accept` → 调用方头部（注册顺序，允许重复）；
/// - 输入切片不被修改，返回新的列表。
///
/// ## 逻辑（How）
/// - 先写入固定声明，再整体追加调用方头部，保证调用方无法插队到固定声明之前。
pub(crate) fn build_header_list(
    chunked: bool,
    expect_continue: bool,
    extra: &[HeaderLine],
) -> Vec<HeaderLine> {
    let mut headers = Vec::with_capacity(extra.len() + 4);
    if chunked {
        headers.push(HeaderLine::new("Transfer-Encoding: chunked"));
    }
    if !expect_continue {
        headers.push(HeaderLine::new("Expect:"));
    }
    headers.push(HeaderLine::new(format!("Content-Type: {CONTENT_TYPE}")));
    headers.push(HeaderLine::new(format!("Accept: {CONTENT_TYPE}")));
    headers.extend(extra.iter().cloned());
    headers
}
