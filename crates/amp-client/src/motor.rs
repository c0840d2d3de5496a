//! 模式守护的运动控制
//!
//! 速度/位置参数只在对应控制模式下有意义，因此每个运动操作都先确认模式：
//! 读取 CM 寄存器（从不使用缓存），不一致时按 [`ModeSwitchPolicy`] 切换，
//! 然后按固定顺序写入运动参数，最后一次写入触发运动。
//!
//! 本层不做写后回读校验：模式写入得到应答不代表驱动器已经完成切换。

use crate::{ClientError, ModeSwitchPolicy, ModeTransition};
use amp_bus::RegisterTransport;
use amp_driver::AmpDrive;
use amp_protocol::OperatingMode;
use amp_units::{AccelUnits, MotionProfile, Pulses, SpeedUnits};
use tracing::{debug, info, warn};

/// 带模式状态机的电机句柄
pub struct Motor<T> {
    drive: AmpDrive<T>,
    policy: ModeSwitchPolicy,
    profile: Option<MotionProfile>,
}

impl<T: RegisterTransport> Motor<T> {
    /// 使用默认切换策略包装驱动器句柄
    pub fn new(drive: AmpDrive<T>) -> Self {
        Self {
            drive,
            policy: ModeSwitchPolicy::default(),
            profile: None,
        }
    }

    pub fn with_policy(mut self, policy: ModeSwitchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// 附加运动参数，启用工程单位操作
    pub fn with_profile(mut self, profile: MotionProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    // ==================== 模式状态机 ====================

    /// 确保驱动器处于目标模式
    ///
    /// 1. 读取 CM 寄存器（读取失败直接返回错误，不做任何写入）
    /// 2. 已是目标模式：不写入，返回 [`ModeTransition::AlreadyActive`]
    /// 3. 否则按策略发送复位命令（未被确认时返回 [`ClientError::ResetRejected`]），
    ///    再写入一次目标模式码
    pub fn ensure_mode(&mut self, target: OperatingMode) -> Result<ModeTransition, ClientError> {
        let current = self.drive.get_mode()?;
        if current == target {
            debug!(drive = %self.drive.identifier(), mode = %current, "mode already active");
            return Ok(ModeTransition::AlreadyActive(current));
        }

        if self.policy.reset_before_switch {
            debug!(
                drive = %self.drive.identifier(),
                opcode = %self.policy.reset_opcode,
                "resetting before mode switch"
            );
            if !self.drive.send_opcode(self.policy.reset_opcode) {
                return Err(ClientError::ResetRejected {
                    identifier: self.drive.identifier().to_string(),
                    target,
                });
            }
        }

        let acknowledged = self.drive.set_control_mode(target);
        if acknowledged {
            info!(drive = %self.drive.identifier(), from = %current, to = %target, "mode switched");
        } else {
            warn!(
                drive = %self.drive.identifier(),
                from = %current,
                to = %target,
                "mode write not acknowledged"
            );
        }
        Ok(ModeTransition::Switched {
            from: current,
            to: target,
            acknowledged,
        })
    }

    /// 确保处于速度模式（CM 33）
    pub fn ensure_speed_mode(&mut self) -> Result<ModeTransition, ClientError> {
        self.ensure_mode(OperatingMode::Velocity)
    }

    /// 确保处于位置模式（CM 21）
    pub fn ensure_position_mode(&mut self) -> Result<ModeTransition, ClientError> {
        self.ensure_mode(OperatingMode::Position)
    }

    // ==================== 运动（设备单位） ====================

    /// 以目标速度运行
    ///
    /// 顺序：确认速度模式 → 最大加速度（AM） → 目标速度（JS）。
    /// 返回最后一次速度写入是否得到应答。
    pub fn go_with_speed(
        &mut self,
        speed: SpeedUnits,
        accel: AccelUnits,
    ) -> Result<bool, ClientError> {
        self.ensure_speed_mode()?;
        // 加速度写入失败时仍然下发速度，结果只反映速度写入
        let _ = self.drive.set_max_acceleration(accel);
        Ok(self.drive.set_jog_speed(speed))
    }

    /// 运动到目标位置
    ///
    /// 顺序：确认位置模式 → 最大速度（VM） → 最大加速度（AM） → 目标位置（DI）。
    /// 返回最后一次目标写入是否得到应答。
    pub fn go_to_position(
        &mut self,
        target: Pulses,
        speed: SpeedUnits,
        accel: AccelUnits,
    ) -> Result<bool, ClientError> {
        self.ensure_position_mode()?;
        // 速度与加速度写入失败时仍然下发目标，结果只反映目标写入
        let _ = self.drive.set_max_velocity(speed);
        let _ = self.drive.set_max_acceleration(accel);
        Ok(self.drive.set_target_position(target))
    }

    // ==================== 运动（工程单位） ====================

    /// 以 RPM 运行，加速度单位 rev/s²
    pub fn run_at_rpm(&mut self, rpm: f64, accel_rev_s2: f64) -> Result<bool, ClientError> {
        let profile = self.require_profile()?;
        let speed = profile.rpm_to_speed_units(rpm)?;
        let accel = profile.rev_per_s2_to_accel_units(accel_rev_s2)?;
        self.go_with_speed(speed, accel)
    }

    /// 运动到输出轴角度
    pub fn go_to_degrees(
        &mut self,
        degrees: f64,
        rpm: f64,
        accel_rev_s2: f64,
    ) -> Result<bool, ClientError> {
        let profile = self.require_profile()?;
        let target = profile.degrees_to_pulses(degrees)?;
        let speed = profile.rpm_to_speed_units(rpm)?;
        let accel = profile.rev_per_s2_to_accel_units(accel_rev_s2)?;
        self.go_to_position(target, speed, accel)
    }

    /// 运动到直线位置（需要轮毂直径）
    pub fn go_to_millimeters(
        &mut self,
        millimeters: f64,
        rpm: f64,
        accel_rev_s2: f64,
    ) -> Result<bool, ClientError> {
        let profile = self.require_profile()?;
        let target = profile.millimeters_to_pulses(millimeters)?;
        let speed = profile.rpm_to_speed_units(rpm)?;
        let accel = profile.rev_per_s2_to_accel_units(accel_rev_s2)?;
        self.go_to_position(target, speed, accel)
    }

    /// 当前位置（度，向下取整）
    pub fn position_degrees(&mut self) -> Result<i64, ClientError> {
        let profile = self.require_profile()?;
        let pulses = self.drive.get_position()?;
        Ok(profile.pulses_to_degrees(pulses))
    }

    /// 当前直线位置（毫米，向下取整）
    pub fn position_millimeters(&mut self) -> Result<i64, ClientError> {
        let profile = self.require_profile()?;
        let pulses = self.drive.get_position()?;
        Ok(profile.pulses_to_millimeters(pulses)?)
    }

    /// 当前速度（RPM，向下取整）
    pub fn speed_rpm(&mut self) -> Result<i64, ClientError> {
        let profile = self.require_profile()?;
        let speed = self.drive.get_speed()?;
        Ok(profile.speed_units_to_rpm(speed))
    }

    fn require_profile(&self) -> Result<MotionProfile, ClientError> {
        self.profile
            .ok_or_else(|| ClientError::MissingProfile(self.drive.identifier().to_string()))
    }
}

impl<T> Motor<T> {
    pub fn drive(&self) -> &AmpDrive<T> {
        &self.drive
    }

    /// 直接访问驱动器（发送命令、读写单个寄存器）
    pub fn drive_mut(&mut self) -> &mut AmpDrive<T> {
        &mut self.drive
    }

    pub fn into_drive(self) -> AmpDrive<T> {
        self.drive
    }

    pub fn policy(&self) -> &ModeSwitchPolicy {
        &self.policy
    }

    pub fn profile(&self) -> Option<&MotionProfile> {
        self.profile.as_ref()
    }
}
