//! 总线寻址
//!
//! - [`SlaveId`]: 多点总线上单个驱动器的从站地址（1..=247）
//! - [`RegisterAddress`]: 厂商文档中的寄存器编号（1 起始）
//!
//! 文档地址与线上地址始终相差 1：`wire = documented - 1`。
//! 这一换算只在 [`RegisterAddress::wire`] 中出现一次。

use crate::ProtocolError;
use std::fmt;

/// Modbus 从站地址
///
/// 取值范围 1..=247（0 为广播地址，248..=255 为保留地址）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u8"))]
pub struct SlaveId(u8);

impl SlaveId {
    /// 最小从站地址
    pub const MIN: u8 = 1;
    /// 最大从站地址
    pub const MAX: u8 = 247;

    /// 创建从站地址（校验范围）
    pub fn new(value: u8) -> Result<Self, ProtocolError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ProtocolError::InvalidSlaveId {
                value: value as u32,
            })
        }
    }

    /// 获取原始值
    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for SlaveId {
    type Error = ProtocolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| ProtocolError::InvalidSlaveId { value })
            .and_then(Self::new)
    }
}

impl TryFrom<u8> for SlaveId {
    type Error = ProtocolError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SlaveId> for u8 {
    fn from(id: SlaveId) -> Self {
        id.0
    }
}

impl fmt::Display for SlaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 寄存器文档地址（1 起始）
///
/// 保存的是厂商手册中的编号（如命令字寄存器 125，手册中写作 `40125` / `400125`），
/// 通过 [`wire`](Self::wire) 得到传给传输层的 0 起始地址。
///
/// # 示例
///
/// ```rust
/// use amp_protocol::RegisterAddress;
///
/// let cmd = RegisterAddress::documented(125);
/// assert_eq!(cmd.wire(), 124);
/// assert_eq!(cmd.to_string(), "400125");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u16"))]
pub struct RegisterAddress(u16);

impl RegisterAddress {
    /// 编译期构造文档地址
    ///
    /// 用于常量表与测试；运行期输入请使用 [`new`](Self::new)。
    ///
    /// # Panics
    ///
    /// `value` 为 0 时 panic（在 const 上下文中则是编译失败）。
    pub const fn documented(value: u16) -> Self {
        assert!(value >= 1, "documented register addresses are 1-based");
        Self(value)
    }

    /// 运行期构造文档地址（校验 1 起始与 16 位范围）
    pub fn new(value: u32) -> Result<Self, ProtocolError> {
        match u16::try_from(value) {
            Ok(v) if v >= 1 => Ok(Self(v)),
            _ => Err(ProtocolError::InvalidAddress { value }),
        }
    }

    /// 文档地址（1 起始）
    #[inline]
    pub const fn number(self) -> u16 {
        self.0
    }

    /// 线上地址（0 起始），即 `documented - 1`
    #[inline]
    pub const fn wire(self) -> u16 {
        self.0 - 1
    }
}

impl TryFrom<u32> for RegisterAddress {
    type Error = ProtocolError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RegisterAddress> for u16 {
    fn from(addr: RegisterAddress) -> Self {
        addr.0
    }
}

impl fmt::Display for RegisterAddress {
    /// 以 6 位 Modbus 保持寄存器编号显示（`4` + 5 位补零）
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "4{:05}", self.0)
    }
}
