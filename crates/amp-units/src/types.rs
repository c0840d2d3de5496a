//! 设备单位（NewType）
//!
//! 驱动器寄存器只接受整数。三种设备单位分别包装成独立类型，
//! 防止把速度单位写进位置寄存器之类的混用。

use std::fmt;

/// 位置脉冲数（IP / EP / DI 寄存器单位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Pulses(pub i32);

/// 速度设备单位（每转 240 单位/秒）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SpeedUnits(pub i32);

/// 加速度设备单位（AC / DE / AM 寄存器单位，1 rev/s² = 6 单位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AccelUnits(pub i32);

macro_rules! device_unit {
    ($ty:ident, $suffix:literal) => {
        impl $ty {
            pub const ZERO: Self = $ty(0);

            /// 获取原始寄存器值
            #[inline]
            pub const fn value(self) -> i32 {
                self.0
            }
        }

        impl From<i32> for $ty {
            #[inline]
            fn from(value: i32) -> Self {
                $ty(value)
            }
        }

        impl From<$ty> for i32 {
            #[inline]
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!("{} ", $suffix), self.0)
            }
        }
    };
}

device_unit!(Pulses, "pulses");
device_unit!(SpeedUnits, "speed units");
device_unit!(AccelUnits, "accel units");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Pulses(10_000).to_string(), "10000 pulses");
        assert_eq!(SpeedUnits(-960).to_string(), "-960 speed units");
        assert_eq!(AccelUnits(600).to_string(), "600 accel units");
    }

    #[test]
    fn test_conversions() {
        assert_eq!(i32::from(Pulses::from(7)), 7);
        assert_eq!(SpeedUnits::default(), SpeedUnits::ZERO);
        assert_eq!(AccelUnits(3).value(), 3);
    }
}
