//! # AMP Units
//!
//! 工程单位（角度、RPM、rev/s²、毫米）与驱动器设备单位之间的换算。
//!
//! ## 换算规则
//!
//! 所有换算先做完整的浮点运算，最后向负无穷取整（floor），中间不做整数截断。
//! 因此往返换算有损：`decode(encode(x))` 与 `x` 相差不超过一个单位。
//!
//! | 换算 | 正向 | 反向 |
//! |---|---|---|
//! | 角度 ↔ 脉冲 | `floor(deg / 360 * s * g)` | `floor(p / (s * g) * 360)` |
//! | RPM ↔ 速度单位 | `floor(rpm / 60 * 240 * g)` | `floor(u * 60 / (240 * g))` |
//! | rev/s² ↔ 加速度单位 | `floor(a * 6 * g)` | `floor(u / (6 * g))` |
//! | 毫米 ↔ 脉冲 | `floor(mm / (d * π) * s * g)` | `floor(p / (s * g) * d * π)` |
//!
//! 其中 `g` 为减速比倍数，`s` 为每转步数，`d` 为轮毂直径（毫米）。
//!
//! ## 示例
//!
//! ```rust
//! use amp_units::{MotionProfile, Pulses};
//!
//! let profile = MotionProfile::new(1, 20_000).unwrap();
//! assert_eq!(profile.degrees_to_pulses(180.0).unwrap(), Pulses(10_000));
//! assert_eq!(profile.pulses_to_degrees(Pulses(10_000)), 180);
//! ```

mod convert;
mod profile;
mod types;

pub use profile::MotionProfile;
pub use types::{AccelUnits, Pulses, SpeedUnits};

use thiserror::Error;

/// 单位换算错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConversionError {
    /// 直线换算需要轮毂直径
    #[error("Linear conversion requires a hub diameter in the motion profile")]
    MissingHubDiameter,

    /// 运动参数不合法（减速比/步数必须为正，轮毂直径必须为有限正数）
    #[error("Invalid motion profile: {0}")]
    InvalidProfile(String),

    /// 换算结果超出寄存器可表示范围（或输入不是有限数）
    #[error("{quantity} out of register range: {value}")]
    OutOfRange { quantity: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert!(
            ConversionError::MissingHubDiameter
                .to_string()
                .contains("hub diameter")
        );
        let err = ConversionError::OutOfRange {
            quantity: "pulses",
            value: 1e12,
        };
        assert_eq!(err.to_string(), "pulses out of register range: 1000000000000");
    }
}
