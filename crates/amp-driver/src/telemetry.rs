//! 遥测快照

use amp_protocol::OperatingMode;
use amp_units::{Pulses, SpeedUnits};
use std::fmt;

/// 一次完整遥测读取的只读快照
///
/// 各字段均为设备原始整数，工程单位换算由调用方按需进行。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TelemetrySample {
    /// 即时绝对位置（IP）
    pub position: Pulses,
    /// 编码器位置（EP）
    pub encoder_position: Pulses,
    /// 即时实际速度（IV）
    pub speed: SpeedUnits,
    /// 即时电流（0.01 A）
    pub current: i16,
    /// 驱动器温度（0.1 °C），未配置 IT 地址时为 `None`
    pub temperature: Option<i16>,
    /// 母线电压（0.1 V），未配置 IU 地址时为 `None`
    pub bus_voltage: Option<u16>,
    pub alarm_code: Option<u16>,
    pub status_code: Option<u16>,
    pub mode: OperatingMode,
}

impl fmt::Display for TelemetrySample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pos={} enc={} speed={} current={}",
            self.position.0, self.encoder_position.0, self.speed.0, self.current
        )?;
        if let Some(temp) = self.temperature {
            write!(f, " temp={temp}")?;
        }
        if let Some(vbus) = self.bus_voltage {
            write!(f, " vbus={vbus}")?;
        }
        if let Some(alarm) = self.alarm_code {
            write!(f, " alarm=0x{alarm:04X}")?;
        }
        if let Some(status) = self.status_code {
            write!(f, " status=0x{status:04X}")?;
        }
        write!(f, " mode={}", self.mode)
    }
}
