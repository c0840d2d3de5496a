//! # AMP Bus Layer
//!
//! 寄存器传输抽象层。链路管理、帧格式、CRC 与链路级重试都由具体传输实现负责，
//! 本层只定义读/写保持寄存器的统一接口，以及多驱动器共享一条总线的方式：
//!
//! - [`SharedBus`]: 互斥锁持有传输对象，每次请求独占一次
//! - [`BusWorker`] / [`BusClient`]: 单个工作线程独占传输对象，客户端通过通道提交请求
//!
//! 两种方式都保证同一条物理链路上任意时刻只有一个在途请求。

use amp_protocol::SlaveId;
use smallvec::SmallVec;
use thiserror::Error;

pub mod shared;
pub mod worker;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use shared::SharedBus;
pub use worker::{BusClient, BusWorker};

#[cfg(any(test, feature = "mock"))]
pub use mock::{BusRequest, MockBus, MockFault};

/// 一次读取返回的寄存器字（1 或 2 个，栈上存储）
pub type RegisterWords = SmallVec<[u16; 2]>;

/// 总线层统一错误类型
#[derive(Error, Debug)]
pub enum BusError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] BusDeviceError),
    #[error("Request timeout")]
    Timeout,
    #[error("Modbus exception 0x{code:02X} from slave {slave}")]
    Exception { slave: u8, code: u8 },
    #[error("Bus disconnected")]
    Disconnected,
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusDeviceErrorKind {
    Unknown,
    NotFound,
    AccessDenied,
    Busy,
    InvalidResponse,
    CrcMismatch,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct BusDeviceError {
    pub kind: BusDeviceErrorKind,
    pub message: String,
}

impl BusDeviceError {
    pub fn new(kind: BusDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            BusDeviceErrorKind::NotFound | BusDeviceErrorKind::AccessDenied
        )
    }
}

impl From<String> for BusDeviceError {
    fn from(message: String) -> Self {
        Self::new(BusDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for BusDeviceError {
    fn from(message: &str) -> Self {
        Self::new(BusDeviceErrorKind::Unknown, message)
    }
}

/// 寄存器传输接口
///
/// 所有地址均为**线上地址**（0 起始），文档地址到线上地址的换算在协议层完成。
/// 每个调用都是阻塞的请求/应答：返回时要么拿到应答，要么拿到传输层错误（包括超时）。
pub trait RegisterTransport {
    /// 读取 `count` 个连续保持寄存器
    fn read(&mut self, address: u16, count: u16, slave: SlaveId) -> Result<RegisterWords, BusError>;

    /// 写单个保持寄存器
    fn write_single(&mut self, address: u16, value: u16, slave: SlaveId) -> Result<(), BusError>;

    /// 写多个连续保持寄存器
    fn write_multiple(
        &mut self,
        address: u16,
        values: &[u16],
        slave: SlaveId,
    ) -> Result<(), BusError>;
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for &mut T {
    fn read(&mut self, address: u16, count: u16, slave: SlaveId) -> Result<RegisterWords, BusError> {
        (**self).read(address, count, slave)
    }

    fn write_single(&mut self, address: u16, value: u16, slave: SlaveId) -> Result<(), BusError> {
        (**self).write_single(address, value, slave)
    }

    fn write_multiple(
        &mut self,
        address: u16,
        values: &[u16],
        slave: SlaveId,
    ) -> Result<(), BusError> {
        (**self).write_multiple(address, values, slave)
    }
}

impl<T: RegisterTransport + ?Sized> RegisterTransport for Box<T> {
    fn read(&mut self, address: u16, count: u16, slave: SlaveId) -> Result<RegisterWords, BusError> {
        (**self).read(address, count, slave)
    }

    fn write_single(&mut self, address: u16, value: u16, slave: SlaveId) -> Result<(), BusError> {
        (**self).write_single(address, value, slave)
    }

    fn write_multiple(
        &mut self,
        address: u16,
        values: &[u16],
        slave: SlaveId,
    ) -> Result<(), BusError> {
        (**self).write_multiple(address, values, slave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_error_display() {
        assert_eq!(BusError::Timeout.to_string(), "Request timeout");
        assert_eq!(
            BusError::Exception { slave: 32, code: 2 }.to_string(),
            "Modbus exception 0x02 from slave 32"
        );
        let err = BusError::from(BusDeviceError::new(
            BusDeviceErrorKind::CrcMismatch,
            "bad crc",
        ));
        assert_eq!(err.to_string(), "Device Error: CrcMismatch: bad crc");
    }

    #[test]
    fn test_device_error_fatal_classification() {
        assert!(BusDeviceError::new(BusDeviceErrorKind::NotFound, "x").is_fatal());
        assert!(!BusDeviceError::new(BusDeviceErrorKind::Busy, "x").is_fatal());
        assert_eq!(
            BusDeviceError::from("oops").kind,
            BusDeviceErrorKind::Unknown
        );
    }

    #[test]
    fn test_boxed_transport_delegates() {
        let slave = SlaveId::new(1).unwrap();
        let mut bus: Box<dyn RegisterTransport> = Box::new(MockBus::new());
        bus.write_single(10, 0xABCD, slave).unwrap();
        let words = bus.read(10, 1, slave).unwrap();
        assert_eq!(words.as_slice(), &[0xABCD]);
    }
}
