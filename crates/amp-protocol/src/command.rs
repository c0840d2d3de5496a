//! SCL 命令描述
//!
//! 驱动器的命令协议是"暂存参数 + 操作码"：先把可选参数写入参数寄存器
//! （Param1 → Param4，跳过未设置的参数），最后写入命令字寄存器。
//! 驱动器只在观察到命令字写入的瞬间锁存参数，因此参数必须严格先于操作码写入。
//!
//! 本模块只负责描述命令，写入顺序由驱动层的分发器保证。

use crate::{ProtocolError, Register};
use std::fmt;
use std::str::FromStr;

/// SCL 操作码
///
/// 写入命令字寄存器即触发对应动作。未列出的操作码可以直接用 `u16` 构造
/// [`CommandDescriptor`]。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    num_enum::TryFromPrimitive,
    num_enum::IntoPrimitive,
)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
#[repr(u16)]
pub enum Opcode {
    /// 进给指定长度（FL）
    FeedToLength = 0x66,
    /// 进给到位置（FP）
    FeedToPosition = 0x67,
    /// 回原点（SH）
    SeekHome = 0x6E,
    /// 设置输出（SO），Param1 = 输出编号字符，Param2 = 'H' / 'L'
    SetOutput = 0x8B,
    /// 开始点动（CJ）
    StartJogging = 0x96,
    /// 电机失能（MD）
    MotorDisable = 0x9E,
    /// 电机使能（ME）
    MotorEnable = 0x9F,
    /// 设置当前位置（SP）
    SetPosition = 0xA5,
    /// 报警复位（AX）
    AlarmReset = 0xBA,
    /// 停止点动（SJ）
    StopJogging = 0xD8,
    /// 停止运动并清空缓冲（SK）
    StopKill = 0xE1,
    /// 按减速度停止运动并清空缓冲（SKD）
    StopKillDecel = 0xE2,
}

impl Opcode {
    /// 全部已命名操作码
    pub const ALL: [Opcode; 12] = [
        Opcode::FeedToLength,
        Opcode::FeedToPosition,
        Opcode::SeekHome,
        Opcode::SetOutput,
        Opcode::StartJogging,
        Opcode::MotorDisable,
        Opcode::MotorEnable,
        Opcode::SetPosition,
        Opcode::AlarmReset,
        Opcode::StopJogging,
        Opcode::StopKill,
        Opcode::StopKillDecel,
    ];

    /// 操作码数值
    #[inline]
    pub fn code(self) -> u16 {
        self.into()
    }

    /// SCL 助记符
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::FeedToLength => "FL",
            Opcode::FeedToPosition => "FP",
            Opcode::SeekHome => "SH",
            Opcode::SetOutput => "SO",
            Opcode::StartJogging => "CJ",
            Opcode::MotorDisable => "MD",
            Opcode::MotorEnable => "ME",
            Opcode::SetPosition => "SP",
            Opcode::AlarmReset => "AX",
            Opcode::StopJogging => "SJ",
            Opcode::StopKill => "SK",
            Opcode::StopKillDecel => "SKD",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (0x{:02X})", self.mnemonic(), self.code())
    }
}

impl FromStr for Opcode {
    type Err = ProtocolError;

    /// 接受助记符（大小写不敏感）或 `0x` 前缀的十六进制操作码
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(op) = Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic().eq_ignore_ascii_case(s))
        {
            return Ok(op);
        }

        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| ProtocolError::InvalidValue {
                field: format!("Opcode({s})"),
                value: 0,
            })?;
        let code = u16::from_str_radix(hex, 16).map_err(|_| ProtocolError::InvalidValue {
            field: format!("Opcode({s})"),
            value: 0,
        })?;
        Opcode::try_from(code).map_err(|_| ProtocolError::InvalidValue {
            field: "Opcode".to_string(),
            value: code as i64,
        })
    }
}

impl TryFrom<String> for Opcode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Opcode> for String {
    fn from(op: Opcode) -> Self {
        op.mnemonic().to_string()
    }
}

/// 暂存参数槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamSlot {
    P1,
    P2,
    P3,
    P4,
}

impl ParamSlot {
    /// 写入顺序
    pub const ORDER: [ParamSlot; 4] = [ParamSlot::P1, ParamSlot::P2, ParamSlot::P3, ParamSlot::P4];

    /// 槽位对应的参数寄存器
    pub const fn register(self) -> Register {
        match self {
            ParamSlot::P1 => Register::Param1,
            ParamSlot::P2 => Register::Param2,
            ParamSlot::P3 => Register::Param3,
            ParamSlot::P4 => Register::Param4,
        }
    }

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

/// 命令描述：操作码 + 最多 4 个可选参数
///
/// 每个参数槽位是 `Option<u16>`，"未设置即不写" 由类型保证。
///
/// # 示例
///
/// ```rust
/// use amp_protocol::{CommandDescriptor, Opcode, ParamSlot};
///
/// let cmd = CommandDescriptor::new(Opcode::SetOutput)
///     .with_param(ParamSlot::P1, b'2' as u16)
///     .with_param(ParamSlot::P3, 7);
///
/// let staged: Vec<_> = cmd.staged().collect();
/// assert_eq!(staged, vec![(ParamSlot::P1, 0x32), (ParamSlot::P3, 7)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandDescriptor {
    opcode: u16,
    params: [Option<u16>; 4],
}

impl CommandDescriptor {
    /// 创建不带参数的命令
    pub fn new(opcode: impl Into<u16>) -> Self {
        Self {
            opcode: opcode.into(),
            params: [None; 4],
        }
    }

    /// 设置参数（重复设置同一槽位时后者覆盖前者）
    pub fn with_param(mut self, slot: ParamSlot, value: u16) -> Self {
        self.params[slot.index()] = Some(value);
        self
    }

    /// 设置输出命令（SO）
    ///
    /// `output` 为输出编号字符（如 `'2'`），电平以 `'H'` / `'L'` 的 ASCII 码传入参数 2。
    pub fn set_output(output: char, high: bool) -> Self {
        let level = if high { b'H' } else { b'L' };
        Self::new(Opcode::SetOutput)
            .with_param(ParamSlot::P1, output as u16)
            .with_param(ParamSlot::P2, level as u16)
    }

    /// 操作码数值
    #[inline]
    pub fn opcode(&self) -> u16 {
        self.opcode
    }

    /// 已命名操作码（未知操作码返回 `None`）
    pub fn named_opcode(&self) -> Option<Opcode> {
        Opcode::try_from(self.opcode).ok()
    }

    /// 读取某个槽位
    #[inline]
    pub fn param(&self, slot: ParamSlot) -> Option<u16> {
        self.params[slot.index()]
    }

    /// 按 Param1 → Param4 顺序返回已设置的参数
    pub fn staged(&self) -> impl Iterator<Item = (ParamSlot, u16)> + '_ {
        ParamSlot::ORDER
            .iter()
            .filter_map(move |&slot| self.param(slot).map(|value| (slot, value)))
    }
}

impl From<Opcode> for CommandDescriptor {
    fn from(op: Opcode) -> Self {
        Self::new(op)
    }
}
