//! 寄存器符号表与寄存器映射
//!
//! [`Register`] 是与固件无关的符号名，[`RegisterMap`] 把符号名映射到某一固件版本的
//! 文档地址。映射表在编译期构建（重复项会导致编译失败），运行期只读；
//! 厂商表中没有给出地址的寄存器保持未映射。
//!
//! 不同固件使用不同的映射表，映射表在配置阶段通过 [`Firmware`] 选择，不做运行期探测。

use crate::{ProtocolError, RegisterAddress};
use std::fmt;
use std::str::FromStr;

/// 寄存器宽度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterWidth {
    /// 单个 16 位保持寄存器
    Single,
    /// 两个连续的 16 位保持寄存器（32 位数值，高字在前）
    Double,
}

impl RegisterWidth {
    /// 占用的寄存器字数
    #[inline]
    pub const fn words(self) -> u16 {
        match self {
            RegisterWidth::Single => 1,
            RegisterWidth::Double => 2,
        }
    }
}

/// 寄存器符号名
///
/// 括号中为 SCL 助记符。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
#[repr(u8)]
pub enum Register {
    // ==================== 命令协议 ====================
    /// 命令字（操作码写入即触发命令）
    CommandWord,
    /// 暂存参数 1
    Param1,
    /// 暂存参数 2
    Param2,
    /// 暂存参数 3
    Param3,
    /// 暂存参数 4
    Param4,

    // ==================== 遥测 ====================
    /// 报警码（AL）
    AlarmCode,
    /// 状态码（SC）
    StatusCode,
    /// 即时绝对位置（IP，32 位）
    ImmediatePosition,
    /// 编码器位置（EP，32 位）
    EncoderPosition,
    /// 即时实际速度（IV）
    ImmediateVelocity,
    /// 驱动器温度（IT，0.1 °C）
    DriveTemperature,
    /// 母线电压（IU，0.1 V）
    BusVoltage,
    /// 即时电流指令（IC，0.01 A）
    ImmediateCurrent,

    // ==================== 运动参数（均为 32 位） ====================
    /// 控制模式（CM）
    ControlMode,
    /// 力矩控制模式下的力矩指令（GC）
    TorqueCommand,
    /// 第一力矩限制（CC）
    TorqueLimit,
    /// 最大速度（VM）
    MaxVelocity,
    /// 点动速度（JS）
    JogSpeed,
    /// 点动加速度（JA）
    JogAcceleration,
    /// 点动减速度（JL）
    JogDeceleration,
    /// 点到点加速度（AC）
    Acceleration,
    /// 点到点减速度（DE）
    Deceleration,
    /// 点到点距离 / 目标位置（DI）
    PointToPointDistance,
    /// 最大加速度，同时作为急停减速度（AM）
    MaxAcceleration,
}

impl Register {
    /// 寄存器符号总数
    pub const COUNT: usize = 24;

    /// 全部寄存器（按判别值顺序）
    pub const ALL: [Register; Register::COUNT] = [
        Register::CommandWord,
        Register::Param1,
        Register::Param2,
        Register::Param3,
        Register::Param4,
        Register::AlarmCode,
        Register::StatusCode,
        Register::ImmediatePosition,
        Register::EncoderPosition,
        Register::ImmediateVelocity,
        Register::DriveTemperature,
        Register::BusVoltage,
        Register::ImmediateCurrent,
        Register::ControlMode,
        Register::TorqueCommand,
        Register::TorqueLimit,
        Register::MaxVelocity,
        Register::JogSpeed,
        Register::JogAcceleration,
        Register::JogDeceleration,
        Register::Acceleration,
        Register::Deceleration,
        Register::PointToPointDistance,
        Register::MaxAcceleration,
    ];

    /// 寄存器宽度
    pub const fn width(self) -> RegisterWidth {
        match self {
            Register::CommandWord
            | Register::Param1
            | Register::Param2
            | Register::Param3
            | Register::Param4
            | Register::AlarmCode
            | Register::StatusCode
            | Register::ImmediateVelocity
            | Register::DriveTemperature
            | Register::BusVoltage
            | Register::ImmediateCurrent => RegisterWidth::Single,
            Register::ImmediatePosition
            | Register::EncoderPosition
            | Register::ControlMode
            | Register::TorqueCommand
            | Register::TorqueLimit
            | Register::MaxVelocity
            | Register::JogSpeed
            | Register::JogAcceleration
            | Register::JogDeceleration
            | Register::Acceleration
            | Register::Deceleration
            | Register::PointToPointDistance
            | Register::MaxAcceleration => RegisterWidth::Double,
        }
    }

    /// SCL 助记符
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Register::CommandWord => "CMD",
            Register::Param1 => "P1",
            Register::Param2 => "P2",
            Register::Param3 => "P3",
            Register::Param4 => "P4",
            Register::AlarmCode => "AL",
            Register::StatusCode => "SC",
            Register::ImmediatePosition => "IP",
            Register::EncoderPosition => "EP",
            Register::ImmediateVelocity => "IV",
            Register::DriveTemperature => "IT",
            Register::BusVoltage => "IU",
            Register::ImmediateCurrent => "IC",
            Register::ControlMode => "CM",
            Register::TorqueCommand => "GC",
            Register::TorqueLimit => "CC",
            Register::MaxVelocity => "VM",
            Register::JogSpeed => "JS",
            Register::JogAcceleration => "JA",
            Register::JogDeceleration => "JL",
            Register::Acceleration => "AC",
            Register::Deceleration => "DE",
            Register::PointToPointDistance => "DI",
            Register::MaxAcceleration => "AM",
        }
    }

    /// snake_case 名称（与配置文件中的键一致）
    pub const fn name(self) -> &'static str {
        match self {
            Register::CommandWord => "command_word",
            Register::Param1 => "param1",
            Register::Param2 => "param2",
            Register::Param3 => "param3",
            Register::Param4 => "param4",
            Register::AlarmCode => "alarm_code",
            Register::StatusCode => "status_code",
            Register::ImmediatePosition => "immediate_position",
            Register::EncoderPosition => "encoder_position",
            Register::ImmediateVelocity => "immediate_velocity",
            Register::DriveTemperature => "drive_temperature",
            Register::BusVoltage => "bus_voltage",
            Register::ImmediateCurrent => "immediate_current",
            Register::ControlMode => "control_mode",
            Register::TorqueCommand => "torque_command",
            Register::TorqueLimit => "torque_limit",
            Register::MaxVelocity => "max_velocity",
            Register::JogSpeed => "jog_speed",
            Register::JogAcceleration => "jog_acceleration",
            Register::JogDeceleration => "jog_deceleration",
            Register::Acceleration => "acceleration",
            Register::Deceleration => "deceleration",
            Register::PointToPointDistance => "point_to_point_distance",
            Register::MaxAcceleration => "max_acceleration",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.mnemonic())
    }
}

impl FromStr for Register {
    type Err = ProtocolError;

    /// 同时接受 snake_case 名称与 SCL 助记符（大小写不敏感）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Register::ALL
            .iter()
            .copied()
            .find(|reg| {
                reg.name().eq_ignore_ascii_case(s) || reg.mnemonic().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| ProtocolError::UnknownRegister(s.to_string()))
    }
}

impl TryFrom<String> for Register {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Register> for String {
    fn from(reg: Register) -> Self {
        reg.name().to_string()
    }
}

/// 固件版本（决定寄存器映射表）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Firmware {
    /// MDX+ 系列（MDXT / MDXR）集成伺服
    #[default]
    Mdxt,
}

impl Firmware {
    /// 该固件对应的寄存器映射
    pub const fn register_map(self) -> RegisterMap {
        match self {
            Firmware::Mdxt => MDXT_REGISTER_MAP,
        }
    }
}

/// 寄存器映射（符号名 → 文档地址）
///
/// 按 `Register` 判别值索引的定长表，`Copy` 且只读。
/// 厂商寄存器表未给出地址的寄存器保持未映射（`None`），访问时返回
/// [`ProtocolError::UnmappedRegister`]，不会落到猜测的地址上。
/// 部署时使用 [`with_override`](Self::with_override) 补充或调整个别地址。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMap {
    firmware: Firmware,
    addresses: [Option<RegisterAddress>; Register::COUNT],
}

impl RegisterMap {
    /// 从 `(寄存器, 文档地址)` 列表构建映射表，未列出的寄存器保持未映射
    ///
    /// 只用于 const 映射表：重复项或地址 0 会导致编译失败。
    pub(crate) const fn from_table(firmware: Firmware, entries: &[(Register, u16)]) -> Self {
        let mut addresses: [Option<RegisterAddress>; Register::COUNT] = [None; Register::COUNT];
        let mut i = 0;
        while i < entries.len() {
            let (reg, addr) = entries[i];
            assert!(addresses[reg as usize].is_none(), "register listed twice");
            addresses[reg as usize] = Some(RegisterAddress::documented(addr));
            i += 1;
        }
        Self {
            firmware,
            addresses,
        }
    }

    /// 映射表所属固件
    #[inline]
    pub fn firmware(&self) -> Firmware {
        self.firmware
    }

    /// 查询寄存器的文档地址（未映射时为 `None`）
    #[inline]
    pub fn address(&self, register: Register) -> Option<RegisterAddress> {
        self.addresses[register as usize]
    }

    /// 查询寄存器的文档地址，未映射时返回错误
    pub fn require(&self, register: Register) -> Result<RegisterAddress, ProtocolError> {
        self.address(register)
            .ok_or(ProtocolError::UnmappedRegister(register))
    }

    /// 寄存器是否有地址
    #[inline]
    pub fn is_mapped(&self, register: Register) -> bool {
        self.address(register).is_some()
    }

    /// 设置单个寄存器地址，返回新表
    pub fn with_override(mut self, register: Register, address: RegisterAddress) -> Self {
        self.addresses[register as usize] = Some(address);
        self
    }

    /// 遍历已映射的 `(寄存器, 地址)`
    pub fn iter(&self) -> impl Iterator<Item = (Register, RegisterAddress)> + '_ {
        Register::ALL
            .iter()
            .filter_map(move |&reg| self.address(reg).map(|addr| (reg, addr)))
    }

    /// 未映射的寄存器
    pub fn unmapped(&self) -> impl Iterator<Item = Register> + '_ {
        Register::ALL
            .iter()
            .copied()
            .filter(move |&reg| !self.is_mapped(reg))
    }

    /// 检查寄存器占用区间是否重叠（32 位寄存器占用 `[a, a + 1]`）
    ///
    /// 返回第一对重叠的寄存器。
    pub fn find_overlap(&self) -> Option<(Register, Register)> {
        let mut spans: Vec<(u32, u32, Register)> = self
            .iter()
            .map(|(reg, addr)| {
                let start = addr.number() as u32;
                (start, start + reg.width().words() as u32 - 1, reg)
            })
            .collect();
        spans.sort_unstable();

        spans
            .windows(2)
            .find(|pair| pair[1].0 <= pair[0].1)
            .map(|pair| (pair[0].2, pair[1].2))
    }

    /// 校验命令协议的布局约束
    ///
    /// - 命令字与 Param1..Param4 必须有地址
    /// - Param1..Param4 是连续的四个寄存器
    /// - 任意两个已映射寄存器的占用区间不重叠
    pub fn validate(&self) -> Result<(), ProtocolError> {
        self.require(Register::CommandWord)?;
        let mut expected = None;
        for slot in [
            Register::Param1,
            Register::Param2,
            Register::Param3,
            Register::Param4,
        ] {
            let number = self.require(slot)?.number();
            if let Some(want) = expected {
                if number != want {
                    return Err(ProtocolError::InvalidRegisterMap(format!(
                        "parameter registers must be contiguous: {slot} is at {number}, expected {want}"
                    )));
                }
            }
            expected = number.checked_add(1);
        }
        if let Some((a, b)) = self.find_overlap() {
            return Err(ProtocolError::InvalidRegisterMap(format!(
                "registers {a} and {b} overlap"
            )));
        }
        Ok(())
    }
}

impl Default for RegisterMap {
    fn default() -> Self {
        MDXT_REGISTER_MAP
    }
}

/// MDX+ 系列寄存器映射
///
/// 只收录厂商 Modbus 寄存器表中给出的地址：命令协议、位置/速度/电流遥测与运动参数。
/// 点动参数（JS / JA / JL）、温度（IT）、母线电压（IU）、报警码（AL）与状态码（SC）
/// 在表中没有地址，保持未映射，需要在部署配置中按驱动器手册补充。
pub const MDXT_REGISTER_MAP: RegisterMap = RegisterMap::from_table(
    Firmware::Mdxt,
    &[
        (Register::CommandWord, 125),
        (Register::Param1, 126),
        (Register::Param2, 127),
        (Register::Param3, 128),
        (Register::Param4, 129),
        (Register::ImmediatePosition, 7),
        (Register::EncoderPosition, 11),
        (Register::ImmediateVelocity, 17),
        (Register::ImmediateCurrent, 31),
        (Register::ControlMode, 263),
        (Register::TorqueCommand, 273),
        (Register::TorqueLimit, 275),
        (Register::MaxVelocity, 337),
        (Register::Acceleration, 345),
        (Register::Deceleration, 347),
        (Register::PointToPointDistance, 351),
        (Register::MaxAcceleration, 353),
    ],
);
