//! 客户端层错误类型定义

use amp_driver::DriverError;
use amp_protocol::OperatingMode;
use amp_units::ConversionError;
use thiserror::Error;

/// 客户端层错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    /// 驱动层错误（寄存器读取失败等）
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// 单位换算错误
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// 切换模式前的复位命令未被驱动器确认
    #[error("Drive {identifier} rejected the reset before switching to {target}")]
    ResetRejected {
        identifier: String,
        target: OperatingMode,
    },

    /// 工程单位操作需要运动参数
    #[error("Motor {0} has no motion profile configured")]
    MissingProfile(String),
}
