//! 模式切换策略与结果

use amp_protocol::{Opcode, OperatingMode};
use std::fmt;

/// 模式切换策略
///
/// 默认在写入新模式前发送 SK（停止并清空缓冲），清除上一个模式残留的目标。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct ModeSwitchPolicy {
    /// 切换前是否先发送复位命令
    pub reset_before_switch: bool,
    /// 复位命令操作码
    pub reset_opcode: Opcode,
}

impl ModeSwitchPolicy {
    /// 直接写入模式寄存器，不发送复位命令
    pub const fn without_reset() -> Self {
        Self {
            reset_before_switch: false,
            reset_opcode: Opcode::StopKill,
        }
    }
}

impl Default for ModeSwitchPolicy {
    fn default() -> Self {
        Self {
            reset_before_switch: true,
            reset_opcode: Opcode::StopKill,
        }
    }
}

/// `ensure_*` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeTransition {
    /// 驱动器已处于目标模式，没有写入
    AlreadyActive(OperatingMode),
    /// 已写入目标模式
    ///
    /// `acknowledged` 只表示模式寄存器写入得到应答，不代表驱动器已完成切换。
    Switched {
        from: OperatingMode,
        to: OperatingMode,
        acknowledged: bool,
    },
}

impl ModeTransition {
    /// 是否发生了模式写入
    pub fn switched(&self) -> bool {
        matches!(self, ModeTransition::Switched { .. })
    }
}

impl fmt::Display for ModeTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeTransition::AlreadyActive(mode) => write!(f, "already in {mode}"),
            ModeTransition::Switched {
                from,
                to,
                acknowledged,
            } => write!(f, "{from} -> {to} (acknowledged: {acknowledged})"),
        }
    }
}
