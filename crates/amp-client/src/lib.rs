//! # AMP Client
//!
//! 面向运动的电机接口：
//! - [`Motor`]: 模式守护的运动操作（速度运行、点到点定位），可选工程单位
//! - [`ModeSwitchPolicy`] / [`ModeTransition`]: 模式切换策略与结果
//! - [`Monitor`]: 固定周期遥测采样，支持截止时间、采样次数与协作式取消
//!
//! # 使用场景
//!
//! 大多数调用方应使用本层。需要直接发送 SCL 命令时，通过
//! [`Motor::drive_mut`] 访问底层 [`AmpDrive`](amp_driver::AmpDrive)。

mod error;
pub mod monitor;
mod motor;
mod policy;

pub use error::ClientError;
pub use monitor::{
    CancellationToken, Monitor, MonitorEvent, MonitorReport, StopCondition, StopReason,
};
pub use motor::Motor;
pub use policy::{ModeSwitchPolicy, ModeTransition};
