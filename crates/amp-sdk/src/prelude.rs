//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use amp_sdk::prelude::*;
//! ```

// 客户端层（推荐使用）
pub use amp_client::{
    CancellationToken, ClientError, ModeSwitchPolicy, ModeTransition, Monitor, MonitorEvent,
    MonitorReport, Motor, StopCondition, StopReason,
};

// 驱动层
pub use amp_driver::{AmpDrive, DriverError, TelemetrySample};

// 总线层
pub use amp_bus::{BusClient, BusError, BusWorker, RegisterTransport, SharedBus};

// 协议层
pub use amp_protocol::{
    CommandDescriptor, Firmware, Opcode, OperatingMode, ParamSlot, ProtocolError, Register,
    RegisterAddress, RegisterMap, SlaveId,
};

// 单位
pub use amp_units::{AccelUnits, ConversionError, MotionProfile, Pulses, SpeedUnits};

// 配置与日志
pub use crate::config::{ConfigError, DriveConfig, SdkConfig};
pub use crate::logging::init_logging;
