//! 换算实现
//!
//! 运算顺序与模块文档中的公式逐项一致，浮点结果只在最后 floor 一次。

use crate::{AccelUnits, ConversionError, MotionProfile, Pulses, SpeedUnits};
use std::f64::consts::PI;

/// 速度设备单位：每转 240 单位
const SPEED_UNITS_PER_REV: f64 = 240.0;
/// 加速度设备单位：每 rev/s² 6 单位
const ACCEL_UNITS_PER_REV_S2: f64 = 6.0;

fn floor_i32(quantity: &'static str, value: f64) -> Result<i32, ConversionError> {
    let floored = value.floor();
    if !floored.is_finite() || floored < i32::MIN as f64 || floored > i32::MAX as f64 {
        return Err(ConversionError::OutOfRange { quantity, value });
    }
    Ok(floored as i32)
}

#[inline]
fn floor_i64(value: f64) -> i64 {
    value.floor() as i64
}

impl MotionProfile {
    /// 角度 → 脉冲：`floor(deg / 360 * s * g)`
    pub fn degrees_to_pulses(&self, degrees: f64) -> Result<Pulses, ConversionError> {
        let pulses = degrees / 360.0 * self.steps_per_rev() as f64 * self.gear();
        floor_i32("pulses", pulses).map(Pulses)
    }

    /// 脉冲 → 角度：`floor(p / (s * g) * 360)`
    pub fn pulses_to_degrees(&self, pulses: Pulses) -> i64 {
        floor_i64(pulses.0 as f64 / self.pulses_per_rev() * 360.0)
    }

    /// RPM → 速度单位：`floor(rpm / 60 * 240 * g)`
    pub fn rpm_to_speed_units(&self, rpm: f64) -> Result<SpeedUnits, ConversionError> {
        let units = rpm / 60.0 * SPEED_UNITS_PER_REV * self.gear();
        floor_i32("speed units", units).map(SpeedUnits)
    }

    /// 速度单位 → RPM：`floor(u * 60 / (240 * g))`
    pub fn speed_units_to_rpm(&self, units: SpeedUnits) -> i64 {
        floor_i64(60.0 * units.0 as f64 / (SPEED_UNITS_PER_REV * self.gear()))
    }

    /// rev/s² → 加速度单位：`floor(a * 6 * g)`
    pub fn rev_per_s2_to_accel_units(&self, accel: f64) -> Result<AccelUnits, ConversionError> {
        let units = accel * ACCEL_UNITS_PER_REV_S2 * self.gear();
        floor_i32("accel units", units).map(AccelUnits)
    }

    /// 加速度单位 → rev/s²：`floor(u / (6 * g))`
    pub fn accel_units_to_rev_per_s2(&self, units: AccelUnits) -> i64 {
        floor_i64(units.0 as f64 / (ACCEL_UNITS_PER_REV_S2 * self.gear()))
    }

    /// 毫米 → 脉冲：`floor(mm / (d * π) * s * g)`
    ///
    /// 运动参数没有轮毂直径时返回 [`ConversionError::MissingHubDiameter`]。
    pub fn millimeters_to_pulses(&self, millimeters: f64) -> Result<Pulses, ConversionError> {
        let circumference = self.require_hub()? * PI;
        let hub_rotations = millimeters / circumference;
        let pulses = hub_rotations * self.steps_per_rev() as f64 * self.gear();
        floor_i32("pulses", pulses).map(Pulses)
    }

    /// 脉冲 → 毫米：`floor(p / (s * g) * d * π)`
    pub fn pulses_to_millimeters(&self, pulses: Pulses) -> Result<i64, ConversionError> {
        let diameter = self.require_hub()?;
        let revolutions = pulses.0 as f64 / self.pulses_per_rev();
        Ok(floor_i64(PI * diameter * revolutions))
    }
}
