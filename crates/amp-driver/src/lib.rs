//! # AMP Driver
//!
//! 单台伺服驱动器的寄存器级访问：
//! - 命令分发：暂存参数 + 操作码（[`AmpDrive::send_command`]）
//! - 设定值写入：32 位寄存器一次写两个字，高字在前
//! - 遥测读取：按寄存器宽度读取并解码，每次调用都重新读取
//!
//! # 使用场景
//!
//! 适用于需要直接发送 SCL 命令或读写单个寄存器的场景。
//! 需要自动切换控制模式的运动操作请使用 `amp-client` 提供的 `Motor`。

mod drive;
mod error;
mod operations;
mod telemetry;

pub use drive::AmpDrive;
pub use error::DriverError;
pub use telemetry::TelemetrySample;
