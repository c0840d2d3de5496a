//! AMP SDK - Modbus 伺服驱动器 Rust SDK
//!
//! 通过保持寄存器向集成伺服驱动器发送 SCL 命令，并在工程单位与设备单位之间换算。
//!
//! # 架构设计
//!
//! 本 SDK 采用分层架构，从底层到高层：
//!
//! - **协议层** (`protocol`): 寄存器映射、字序编解码、SCL 操作码与命令描述
//! - **总线层** (`bus`): 寄存器传输接口与总线共享（互斥锁 / 工作线程）
//! - **单位层** (`units`): 运动参数与 floor 换算
//! - **驱动层** (`driver`): 暂存参数命令分发、设定值写入、遥测读取
//! - **客户端层** (`client`): 模式守护的运动操作、遥测采样
//!
//! # 快速开始
//!
//! ```rust,ignore
//! use amp_sdk::prelude::*;
//!
//! let bus = SharedBus::new(transport);
//! let drive = AmpDrive::new("MDXT", SlaveId::new(32)?, bus.clone());
//! let mut motor = Motor::new(drive).with_profile(MotionProfile::new(1, 20_000)?);
//! motor.run_at_rpm(240.0, 100.0)?;
//! ```
//!
//! 部署配置（从站地址、寄存器地址覆盖、运动参数、模式切换策略）见 [`config`]。

pub use amp_bus as bus;
pub use amp_client as client;
pub use amp_driver as driver;
pub use amp_protocol as protocol;
pub use amp_units as units;

pub mod config;
pub mod logging;
pub mod prelude;

// --- 常用类型 ---
pub use amp_bus::{BusClient, BusError, BusWorker, RegisterTransport, SharedBus};
pub use amp_client::{ClientError, ModeSwitchPolicy, ModeTransition, Motor};
pub use amp_driver::{AmpDrive, DriverError, TelemetrySample};
pub use amp_protocol::ProtocolError;
pub use amp_units::{ConversionError, MotionProfile};
pub use config::{ConfigError, DriveConfig, SdkConfig};
pub use logging::init_logging;
