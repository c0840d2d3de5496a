//! 控制模式（CM 寄存器）
//!
//! 驱动器当前的控制模式以 32 位整数保存在 CM 寄存器中。
//! 这里只做编码/解码，是否需要切换模式由客户端层的模式控制器每次重新读取后决定。

use std::fmt;

/// 控制模式
///
/// 未列出的模式码保存在 [`OperatingMode::Other`] 中，原样往返。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "i32", into = "i32"))]
pub enum OperatingMode {
    /// 指令力矩模式（力矩由 GC 寄存器给定）
    Torque,
    /// 点到点位置模式（SCL 运动指令 / DI 目标）
    Position,
    /// 速度模式
    Velocity,
    /// 其他模式码
    Other(i32),
}

impl OperatingMode {
    /// 指令力矩模式码
    pub const TORQUE_CODE: i32 = 1;
    /// 位置模式码
    pub const POSITION_CODE: i32 = 21;
    /// 速度模式码
    pub const VELOCITY_CODE: i32 = 33;

    /// 模式码
    pub const fn code(self) -> i32 {
        match self {
            OperatingMode::Torque => Self::TORQUE_CODE,
            OperatingMode::Position => Self::POSITION_CODE,
            OperatingMode::Velocity => Self::VELOCITY_CODE,
            OperatingMode::Other(code) => code,
        }
    }

    /// 从模式码解析
    pub const fn from_code(code: i32) -> Self {
        match code {
            Self::TORQUE_CODE => OperatingMode::Torque,
            Self::POSITION_CODE => OperatingMode::Position,
            Self::VELOCITY_CODE => OperatingMode::Velocity,
            other => OperatingMode::Other(other),
        }
    }
}

impl From<i32> for OperatingMode {
    fn from(code: i32) -> Self {
        Self::from_code(code)
    }
}

impl From<OperatingMode> for i32 {
    fn from(mode: OperatingMode) -> Self {
        mode.code()
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingMode::Torque => write!(f, "Torque(CM{})", Self::TORQUE_CODE),
            OperatingMode::Position => write!(f, "Position(CM{})", Self::POSITION_CODE),
            OperatingMode::Velocity => write!(f, "Velocity(CM{})", Self::VELOCITY_CODE),
            OperatingMode::Other(code) => write!(f, "Other(CM{code})"),
        }
    }
}
