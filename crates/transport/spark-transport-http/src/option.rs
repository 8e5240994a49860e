//! 引擎选项：编号、类别与带类型的取值。
//!
//! # 设计动机（Why）
//! - 引擎选项以整数编号标识，编号所在区间决定取值类别（长整型/布尔、字符串、其他）。
//!   本模块在**注册时**完成类别判定与取值解码，避免到创建句柄时才发现配置非法；
//! - 不属于任何受支持类别的编号直接返回配置错误，不再静默丢弃。
//!
//! # 契约（What）
//! - [`OptionId`]：编号新类型，内置常用选项常量，编号与引擎的 `CURLOPT_*` 约定一致；
//! - [`OptionValue`]：`Flag`/`Integer`/`Text` 三种带类型取值；
//! - [`OptionSet`]：按编号去重的选项表，同一编号后写覆盖先写。

use std::{collections::BTreeMap, fmt};

use crate::error::{self, TransportError};

const LONG_BASE: u32 = 0;
const TEXT_BASE: u32 = 10_000;
const FUNCTION_BASE: u32 = 20_000;

/// 引擎选项编号。
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OptionId(u32);

impl OptionId {
    /// 整个请求的超时时间（秒），`0` 表示不限。
    pub const TIMEOUT: Self = Self(13);
    /// 连接级别的详细日志。
    pub const VERBOSE: Self = Self(41);
    /// 是否校验对端证书。
    pub const SSL_VERIFYPEER: Self = Self(64);
    /// 建连超时（秒），`0` 表示不限。
    pub const CONNECTTIMEOUT: Self = Self(78);
    /// 是否启用 `TCP_NODELAY`。
    pub const TCP_NODELAY: Self = Self(121);
    /// 整个请求的超时时间（毫秒）。
    pub const TIMEOUT_MS: Self = Self(155);
    /// 建连超时（毫秒）。
    pub const CONNECTTIMEOUT_MS: Self = Self(156);
    /// TCP keepalive 空闲探测间隔（秒）。
    pub const TCP_KEEPIDLE: Self = Self(214);
    /// 代理地址。
    pub const PROXY: Self = Self(10_004);
    /// 覆盖默认的 User-Agent。
    pub const USERAGENT: Self = Self(10_018);

    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    /// 按编号区间判定取值类别，不属于任何受支持类别时返回 `None`。
    pub const fn category(self) -> Option<OptionCategory> {
        match self.0 {
            LONG_BASE..TEXT_BASE => Some(OptionCategory::Long),
            TEXT_BASE..FUNCTION_BASE => Some(OptionCategory::Text),
            _ => None,
        }
    }

    /// 已知选项的名称，用于日志。
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::TIMEOUT => "TIMEOUT",
            Self::VERBOSE => "VERBOSE",
            Self::SSL_VERIFYPEER => "SSL_VERIFYPEER",
            Self::CONNECTTIMEOUT => "CONNECTTIMEOUT",
            Self::TCP_NODELAY => "TCP_NODELAY",
            Self::TIMEOUT_MS => "TIMEOUT_MS",
            Self::CONNECTTIMEOUT_MS => "CONNECTTIMEOUT_MS",
            Self::TCP_KEEPIDLE => "TCP_KEEPIDLE",
            Self::PROXY => "PROXY",
            Self::USERAGENT => "USERAGENT",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}({})", self.0),
            None => write!(f, "{}", self.0),
        }
    }
}

/// 选项取值类别。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionCategory {
    /// 布尔或整数。
    Long,
    /// 字符串，原样传递。
    Text,
}

/// 带类型的选项取值。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionValue {
    Flag(bool),
    Integer(i64),
    Text(String),
}

impl OptionValue {
    /// 按类别解码字符串形式的取值。
    ///
    /// - `Long`：`"true"`/`"false"` 解码为 `Flag`，其余按十进制解码为 `Integer`，无法解码时报错；
    /// - `Text`：原样保存。
    pub fn decode(category: OptionCategory, raw: &str) -> Result<Self, TransportError> {
        match category {
            OptionCategory::Long => match raw {
                "true" => Ok(Self::Flag(true)),
                "false" => Ok(Self::Flag(false)),
                other => other.trim().parse::<i64>().map(Self::Integer).map_err(|err| {
                    error::configure(format!("`{raw}` is not a boolean or decimal integer: {err}"))
                }),
            },
            OptionCategory::Text => Ok(Self::Text(raw.to_owned())),
        }
    }

    /// 取值是否与类别相符。
    pub fn fits(&self, category: OptionCategory) -> bool {
        match self {
            Self::Flag(_) | Self::Integer(_) => category == OptionCategory::Long,
            Self::Text(_) => category == OptionCategory::Text,
        }
    }

    /// 以整数视角读取，`Flag` 映射为 `0`/`1`。
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Flag(flag) => Some(i64::from(*flag)),
            Self::Integer(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    /// 以布尔视角读取，非零整数视为 `true`。
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(flag) => Some(*flag),
            Self::Integer(value) => Some(*value != 0),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flag(flag) => write!(f, "{flag}"),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// 按编号去重的选项表。
///
/// 以有序映射保存，应用顺序稳定为编号升序；同一编号重复注册时仅保留最后一次的取值。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionSet {
    entries: BTreeMap<OptionId, OptionValue>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册带类型的选项，返回被覆盖的旧值。
    pub fn insert(
        &mut self,
        id: OptionId,
        value: OptionValue,
    ) -> Result<Option<OptionValue>, TransportError> {
        let category = id.category().ok_or_else(|| error::unsupported_category(id))?;
        if !value.fits(category) {
            return Err(error::configure(format!(
                "engine option {id} expects a {category:?} value, got `{value}`"
            )));
        }
        Ok(self.entries.insert(id, value))
    }

    /// 注册字符串形式的选项，按编号类别解码后保存。
    pub fn insert_raw(
        &mut self,
        id: u32,
        raw: &str,
    ) -> Result<Option<OptionValue>, TransportError> {
        let id = OptionId::new(id);
        let category = id.category().ok_or_else(|| error::unsupported_category(id))?;
        let value = OptionValue::decode(category, raw)?;
        Ok(self.entries.insert(id, value))
    }

    pub fn get(&self, id: OptionId) -> Option<&OptionValue> {
        self.entries.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionId, &OptionValue)> {
        self.entries.iter().map(|(id, value)| (*id, value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 导出为 `(编号, 取值)` 列表，供句柄配置使用。
    pub fn to_vec(&self) -> Vec<(OptionId, OptionValue)> {
        self.entries
            .iter()
            .map(|(id, value)| (*id, value.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_follows_numeric_range() {
        assert_eq!(OptionId::new(0).category(), Some(OptionCategory::Long));
        assert_eq!(OptionId::TIMEOUT_MS.category(), Some(OptionCategory::Long));
        assert_eq!(OptionId::new(9_999).category(), Some(OptionCategory::Long));
        assert_eq!(OptionId::PROXY.category(), Some(OptionCategory::Text));
        assert_eq!(OptionId::new(19_999).category(), Some(OptionCategory::Text));
        assert_eq!(OptionId::new(20_000).category(), None);
        assert_eq!(OptionId::new(30_145).category(), None);
    }

    #[test]
    fn long_values_decode_booleans_and_decimals() {
        let decode = |raw| OptionValue::decode(OptionCategory::Long, raw);
        assert_eq!(decode("true"), Ok(OptionValue::Flag(true)));
        assert_eq!(decode("false"), Ok(OptionValue::Flag(false)));
        assert_eq!(decode("2500"), Ok(OptionValue::Integer(2500)));
        assert_eq!(decode("-1"), Ok(OptionValue::Integer(-1)));
        assert!(decode("fast").is_err());
        assert!(decode("TRUE").is_err());
    }

    #[test]
    fn text_values_pass_through_verbatim() {
        let value = OptionValue::decode(OptionCategory::Text, " http://proxy:3128 ").unwrap();
        assert_eq!(value.as_text(), Some(" http://proxy:3128 "));
        assert_eq!(value.as_integer(), None);
    }

    #[test]
    fn last_registration_wins() {
        let mut options = OptionSet::new();
        assert_eq!(options.insert_raw(155, "1000").unwrap(), None);
        let replaced = options
            .insert(OptionId::TIMEOUT_MS, OptionValue::Integer(2000))
            .unwrap();
        assert_eq!(replaced, Some(OptionValue::Integer(1000)));
        assert_eq!(options.len(), 1);
        assert_eq!(
            options.get(OptionId::TIMEOUT_MS),
            Some(&OptionValue::Integer(2000))
        );
    }

    #[test]
    fn iteration_is_in_ascending_id_order() {
        let mut options = OptionSet::new();
        options.insert_raw(10_018, "svc/1.0").unwrap();
        options.insert_raw(155, "2500").unwrap();
        options.insert_raw(13, "true").unwrap();

        let ids: Vec<u32> = options.iter().map(|(id, _)| id.raw()).collect();
        assert_eq!(ids, [13, 155, 10_018]);
        let (_, agent) = options.iter().last().unwrap();
        assert_eq!(agent.as_text(), Some("svc/1.0"));
    }

    #[test]
    fn registration_rejects_unsupported_category_and_mismatched_value() {
        let mut options = OptionSet::new();
        let err = options.insert_raw(20_011, "anything").unwrap_err();
        assert_eq!(err.code(), "spark.transport.http.configure_failed");

        let err = options
            .insert(OptionId::PROXY, OptionValue::Flag(true))
            .unwrap_err();
        assert!(err.to_string().contains("PROXY(10004)"));
        assert!(options.is_empty());
    }

    #[test]
    fn flags_and_integers_convert_between_views() {
        assert_eq!(OptionValue::Flag(true).as_integer(), Some(1));
        assert_eq!(OptionValue::Integer(0).as_flag(), Some(false));
        assert_eq!(OptionValue::Integer(7).as_flag(), Some(true));
        assert_eq!(OptionValue::Flag(false).to_string(), "false");
    }
}
