//! 驱动层错误类型定义

use amp_bus::BusError;
use amp_protocol::{ProtocolError, Register, RegisterAddress};
use thiserror::Error;

/// 驱动层错误类型
///
/// 只有读操作会返回错误；写操作（参数、命令、设定值）的失败以 `false` 表示。
#[derive(Error, Debug)]
pub enum DriverError {
    /// 寄存器读取失败（包含传输层诊断信息）
    #[error("Failed to read {register} at {address}: {source}")]
    Read {
        register: Register,
        address: RegisterAddress,
        #[source]
        source: BusError,
    },

    /// 应答字数与寄存器宽度不符
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}
