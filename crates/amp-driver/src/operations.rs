//! 驱动器操作：设定值、命令与遥测读取
//!
//! 设定值都是 32 位寄存器写入，命令都是不带参数（或带固定参数）的 SCL 操作码。

use crate::{AmpDrive, DriverError, TelemetrySample};
use amp_bus::RegisterTransport;
use amp_protocol::{CommandDescriptor, Opcode, OperatingMode, Register};
use amp_units::{AccelUnits, Pulses, SpeedUnits};

impl<T: RegisterTransport> AmpDrive<T> {
    // ==================== 设定值 ====================

    /// 最大速度（VM）
    #[must_use]
    pub fn set_max_velocity(&mut self, speed: SpeedUnits) -> bool {
        self.write_i32(Register::MaxVelocity, speed.0)
    }

    /// 力矩限制（CC，单位 mNm）
    #[must_use]
    pub fn set_max_torque(&mut self, torque_mnm: i32) -> bool {
        self.write_i32(Register::TorqueLimit, torque_mnm)
    }

    /// 最大加速度（AM）
    #[must_use]
    pub fn set_max_acceleration(&mut self, accel: AccelUnits) -> bool {
        self.write_i32(Register::MaxAcceleration, accel.0)
    }

    /// 点到点加速度（AC）
    #[must_use]
    pub fn set_acceleration(&mut self, accel: AccelUnits) -> bool {
        self.write_i32(Register::Acceleration, accel.0)
    }

    /// 点到点减速度（DE）
    #[must_use]
    pub fn set_deceleration(&mut self, decel: AccelUnits) -> bool {
        self.write_i32(Register::Deceleration, decel.0)
    }

    /// 点动速度（JS）
    #[must_use]
    pub fn set_jog_speed(&mut self, speed: SpeedUnits) -> bool {
        self.write_i32(Register::JogSpeed, speed.0)
    }

    /// 点动加速度（JA）
    #[must_use]
    pub fn set_jog_acceleration(&mut self, accel: AccelUnits) -> bool {
        self.write_i32(Register::JogAcceleration, accel.0)
    }

    /// 点动减速度（JL）
    #[must_use]
    pub fn set_jog_deceleration(&mut self, decel: AccelUnits) -> bool {
        self.write_i32(Register::JogDeceleration, decel.0)
    }

    /// 控制模式（CM）
    #[must_use]
    pub fn set_control_mode(&mut self, mode: OperatingMode) -> bool {
        self.write_i32(Register::ControlMode, mode.code())
    }

    /// 点到点目标（DI）
    #[must_use]
    pub fn set_target_position(&mut self, target: Pulses) -> bool {
        self.write_i32(Register::PointToPointDistance, target.0)
    }

    /// 力矩指令（GC，力矩模式下生效）
    #[must_use]
    pub fn set_torque_command(&mut self, torque: i32) -> bool {
        self.write_i32(Register::TorqueCommand, torque)
    }

    // ==================== 命令 ====================

    /// 按减速度停止并清空缓冲（SKD）
    #[must_use]
    pub fn stop_motor(&mut self) -> bool {
        self.send_opcode(Opcode::StopKillDecel)
    }

    /// 立即停止并清空缓冲（SK），切换模式前用于清除旧目标
    #[must_use]
    pub fn reset_motor(&mut self) -> bool {
        self.send_opcode(Opcode::StopKill)
    }

    #[must_use]
    pub fn enable_motor(&mut self) -> bool {
        self.send_opcode(Opcode::MotorEnable)
    }

    #[must_use]
    pub fn disable_motor(&mut self) -> bool {
        self.send_opcode(Opcode::MotorDisable)
    }

    /// 以 JS / JA / JL 寄存器中的参数开始点动（CJ）
    #[must_use]
    pub fn start_jogging(&mut self) -> bool {
        self.send_opcode(Opcode::StartJogging)
    }

    #[must_use]
    pub fn stop_jogging(&mut self) -> bool {
        self.send_opcode(Opcode::StopJogging)
    }

    /// 按 DI 中的目标执行绝对定位（FP）
    #[must_use]
    pub fn feed_to_position(&mut self) -> bool {
        self.send_opcode(Opcode::FeedToPosition)
    }

    /// 按 DI 中的距离执行相对定位（FL）
    #[must_use]
    pub fn feed_to_length(&mut self) -> bool {
        self.send_opcode(Opcode::FeedToLength)
    }

    #[must_use]
    pub fn alarm_reset(&mut self) -> bool {
        self.send_opcode(Opcode::AlarmReset)
    }

    /// 设置数字输出（SO），`output` 为输出编号字符
    #[must_use]
    pub fn set_output(&mut self, output: char, high: bool) -> bool {
        self.send_command(&CommandDescriptor::set_output(output, high))
    }

    // ==================== 遥测 ====================

    /// 即时绝对位置（IP）
    pub fn get_position(&mut self) -> Result<Pulses, DriverError> {
        self.read_i32(Register::ImmediatePosition).map(Pulses)
    }

    /// 编码器位置（EP）
    pub fn get_encoder_position(&mut self) -> Result<Pulses, DriverError> {
        self.read_i32(Register::EncoderPosition).map(Pulses)
    }

    /// 即时实际速度（IV）
    pub fn get_speed(&mut self) -> Result<SpeedUnits, DriverError> {
        self.read_i16(Register::ImmediateVelocity)
            .map(|v| SpeedUnits(i32::from(v)))
    }

    /// 即时电流指令（IC，0.01 A）
    pub fn get_current(&mut self) -> Result<i16, DriverError> {
        self.read_i16(Register::ImmediateCurrent)
    }

    /// 驱动器温度（0.1 °C，需要在映射表中配置 IT 地址）
    pub fn get_temperature(&mut self) -> Result<i16, DriverError> {
        self.read_i16(Register::DriveTemperature)
    }

    /// 直流母线电压（0.1 V，需要在映射表中配置 IU 地址）
    pub fn get_bus_voltage(&mut self) -> Result<u16, DriverError> {
        self.read_u16(Register::BusVoltage)
    }

    pub fn get_alarm_code(&mut self) -> Result<u16, DriverError> {
        self.read_u16(Register::AlarmCode)
    }

    pub fn get_status_code(&mut self) -> Result<u16, DriverError> {
        self.read_u16(Register::StatusCode)
    }

    /// 当前控制模式（CM）
    pub fn get_mode(&mut self) -> Result<OperatingMode, DriverError> {
        self.read_i32(Register::ControlMode)
            .map(OperatingMode::from_code)
    }

    /// 依次读取全部遥测量
    ///
    /// 温度、母线电压、报警码与状态码在映射表中没有地址时跳过（字段为 `None`）。
    /// 任意一次读取失败即返回该错误，不返回部分结果。
    pub fn read_telemetry(&mut self) -> Result<TelemetrySample, DriverError> {
        Ok(TelemetrySample {
            position: self.get_position()?,
            encoder_position: self.get_encoder_position()?,
            speed: self.get_speed()?,
            current: self.get_current()?,
            temperature: self.read_if_mapped(Register::DriveTemperature, Self::get_temperature)?,
            bus_voltage: self.read_if_mapped(Register::BusVoltage, Self::get_bus_voltage)?,
            alarm_code: self.read_if_mapped(Register::AlarmCode, Self::get_alarm_code)?,
            status_code: self.read_if_mapped(Register::StatusCode, Self::get_status_code)?,
            mode: self.get_mode()?,
        })
    }

    fn read_if_mapped<V>(
        &mut self,
        register: Register,
        read: fn(&mut Self) -> Result<V, DriverError>,
    ) -> Result<Option<V>, DriverError> {
        if self.register_map().is_mapped(register) {
            read(self).map(Some)
        } else {
            Ok(None)
        }
    }
}
