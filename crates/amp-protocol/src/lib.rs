//! # AMP Protocol
//!
//! 伺服驱动器 Modbus 寄存器协议定义（无硬件依赖）
//!
//! ## 模块
//!
//! - `address`: 从站地址与寄存器地址（文档地址 1 起始，线上地址 = 文档地址 - 1）
//! - `registers`: 寄存器符号表与按固件选择的寄存器映射
//! - `codec`: 16/32 位整数与寄存器字之间的编解码
//! - `command`: SCL 操作码与暂存参数命令描述
//! - `mode`: 控制模式（CM 寄存器）编码
//!
//! ## 字序
//!
//! 32 位数值占用两个连续的保持寄存器 `[address, address + 1]`，
//! 高 16 位在前（大端字序），每个字内部不做字节交换。

pub mod address;
pub mod codec;
pub mod command;
pub mod mode;
pub mod registers;

// 重新导出常用类型
pub use address::*;
pub use codec::*;
pub use command::*;
pub use mode::*;
pub use registers::*;

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid register word count: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid documented register address: {value} (addresses are 1-based)")]
    InvalidAddress { value: u32 },

    #[error("Invalid slave id: {value} (expected 1..=247)")]
    InvalidSlaveId { value: u32 },

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: i64 },

    #[error("Unknown register name: {0}")]
    UnknownRegister(String),

    #[error("Register {0} has no address in this register map")]
    UnmappedRegister(Register),

    #[error("Invalid register map: {0}")]
    InvalidRegisterMap(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protocol_error_display() {
        let err = ProtocolError::InvalidLength {
            expected: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "Invalid register word count: expected 2, got 1"
        );

        let err = ProtocolError::InvalidAddress { value: 0 };
        assert!(err.to_string().contains("1-based"));

        let err = ProtocolError::InvalidSlaveId { value: 248 };
        assert!(err.to_string().contains("248"));

        let err = ProtocolError::UnmappedRegister(Register::JogSpeed);
        assert_eq!(
            err.to_string(),
            "Register jog_speed (JS) has no address in this register map"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_representations() {
        assert_eq!(
            serde_json::to_string(&Register::JogSpeed).unwrap(),
            "\"jog_speed\""
        );
        assert_eq!(
            serde_json::from_str::<Register>("\"JS\"").unwrap(),
            Register::JogSpeed
        );
        assert_eq!(serde_json::to_string(&Opcode::StopKill).unwrap(), "\"SK\"");
        assert_eq!(
            serde_json::from_str::<Opcode>("\"0xE2\"").unwrap(),
            Opcode::StopKillDecel
        );
        assert!(serde_json::from_str::<SlaveId>("0").is_err());
        assert_eq!(
            serde_json::from_str::<RegisterAddress>("125").unwrap().wire(),
            124
        );
        assert!(serde_json::from_str::<RegisterAddress>("0").is_err());
        assert_eq!(
            serde_json::to_string(&OperatingMode::Velocity).unwrap(),
            "33"
        );
        assert_eq!(
            serde_json::from_str::<Firmware>("\"mdxt\"").unwrap(),
            Firmware::Mdxt
        );
    }
}
