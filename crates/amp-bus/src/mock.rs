//! 内存寄存器总线（测试用）
//!
//! `MockBus` 用一个 `(从站, 线上地址) → 字` 的表模拟多台驱动器，
//! 记录每个请求，并支持按地址注入读/写故障。未写过的寄存器读出 0。

use crate::{BusError, RegisterTransport, RegisterWords};
use amp_protocol::{RegisterAddress, SlaveId, decode32, encode32};
use std::collections::HashMap;

/// 请求记录（地址均为线上地址）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusRequest {
    Read { slave: u8, address: u16, count: u16 },
    WriteSingle { slave: u8, address: u16, value: u16 },
    WriteMultiple { slave: u8, address: u16, values: Vec<u16> },
}

impl BusRequest {
    /// 请求的起始线上地址
    pub fn address(&self) -> u16 {
        match self {
            BusRequest::Read { address, .. }
            | BusRequest::WriteSingle { address, .. }
            | BusRequest::WriteMultiple { address, .. } => *address,
        }
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, BusRequest::Read { .. })
    }
}

/// 注入的故障
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFault {
    Timeout,
    Exception(u8),
    Disconnected,
}

impl MockFault {
    fn to_error(self, slave: SlaveId) -> BusError {
        match self {
            MockFault::Timeout => BusError::Timeout,
            MockFault::Exception(code) => BusError::Exception {
                slave: slave.get(),
                code,
            },
            MockFault::Disconnected => BusError::Disconnected,
        }
    }
}

/// 内存寄存器总线
#[derive(Debug, Default)]
pub struct MockBus {
    registers: HashMap<(u8, u16), u16>,
    requests: Vec<BusRequest>,
    read_faults: HashMap<u16, MockFault>,
    write_faults: HashMap<u16, MockFault>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 起始线上地址为 `address` 的读请求返回故障
    pub fn fail_reads_at(&mut self, address: u16, fault: MockFault) {
        self.read_faults.insert(address, fault);
    }

    /// 起始线上地址为 `address` 的写请求返回故障（请求仍被记录，寄存器不变）
    pub fn fail_writes_at(&mut self, address: u16, fault: MockFault) {
        self.write_faults.insert(address, fault);
    }

    pub fn clear_faults(&mut self) {
        self.read_faults.clear();
        self.write_faults.clear();
    }

    /// 按文档地址预置单个寄存器
    pub fn set_register(&mut self, slave: SlaveId, address: RegisterAddress, value: u16) {
        self.registers.insert((slave.get(), address.wire()), value);
    }

    /// 按文档地址预置 32 位值（高字在前）
    pub fn set_i32(&mut self, slave: SlaveId, address: RegisterAddress, value: i32) {
        let [hi, lo] = encode32(value);
        let wire = address.wire();
        self.registers.insert((slave.get(), wire), hi);
        self.registers.insert((slave.get(), wire.wrapping_add(1)), lo);
    }

    /// 按文档地址读取单个寄存器当前值
    pub fn register(&self, slave: SlaveId, address: RegisterAddress) -> u16 {
        self.word(slave.get(), address.wire())
    }

    /// 按文档地址读取 32 位值
    pub fn get_i32(&self, slave: SlaveId, address: RegisterAddress) -> i32 {
        let wire = address.wire();
        decode32([
            self.word(slave.get(), wire),
            self.word(slave.get(), wire.wrapping_add(1)),
        ])
    }

    /// 已记录的请求
    pub fn requests(&self) -> &[BusRequest] {
        &self.requests
    }

    /// 取出并清空请求记录
    pub fn take_requests(&mut self) -> Vec<BusRequest> {
        std::mem::take(&mut self.requests)
    }

    fn word(&self, slave: u8, wire: u16) -> u16 {
        self.registers.get(&(slave, wire)).copied().unwrap_or(0)
    }
}

impl RegisterTransport for MockBus {
    fn read(&mut self, address: u16, count: u16, slave: SlaveId) -> Result<RegisterWords, BusError> {
        self.requests.push(BusRequest::Read {
            slave: slave.get(),
            address,
            count,
        });
        if let Some(fault) = self.read_faults.get(&address) {
            return Err(fault.to_error(slave));
        }
        Ok((0..count)
            .map(|i| self.word(slave.get(), address.wrapping_add(i)))
            .collect())
    }

    fn write_single(&mut self, address: u16, value: u16, slave: SlaveId) -> Result<(), BusError> {
        self.requests.push(BusRequest::WriteSingle {
            slave: slave.get(),
            address,
            value,
        });
        if let Some(fault) = self.write_faults.get(&address) {
            return Err(fault.to_error(slave));
        }
        self.registers.insert((slave.get(), address), value);
        Ok(())
    }

    fn write_multiple(
        &mut self,
        address: u16,
        values: &[u16],
        slave: SlaveId,
    ) -> Result<(), BusError> {
        self.requests.push(BusRequest::WriteMultiple {
            slave: slave.get(),
            address,
            values: values.to_vec(),
        });
        if let Some(fault) = self.write_faults.get(&address) {
            return Err(fault.to_error(slave));
        }
        for (i, value) in values.iter().enumerate() {
            self.registers
                .insert((slave.get(), address.wrapping_add(i as u16)), *value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_registers_read_zero() {
        let mut bus = MockBus::new();
        let words = bus.read(10, 2, SlaveId::new(1).unwrap()).unwrap();
        assert_eq!(words.as_slice(), &[0, 0]);
    }

    #[test]
    fn test_slaves_have_separate_register_files() {
        let a = SlaveId::new(1).unwrap();
        let b = SlaveId::new(2).unwrap();
        let addr = RegisterAddress::documented(263);
        let mut bus = MockBus::new();
        bus.set_i32(a, addr, 33);
        assert_eq!(bus.get_i32(a, addr), 33);
        assert_eq!(bus.get_i32(b, addr), 0);
        // 文档地址 263 → 线上地址 262
        assert_eq!(bus.read(262, 2, a).unwrap().as_slice(), &[0, 33]);
    }

    #[test]
    fn test_failed_write_is_logged_but_not_applied() {
        let s = SlaveId::new(5).unwrap();
        let mut bus = MockBus::new();
        bus.fail_writes_at(125, MockFault::Timeout);
        assert!(matches!(bus.write_single(125, 7, s), Err(BusError::Timeout)));
        assert_eq!(bus.requests().len(), 1);
        assert!(bus.requests()[0].is_write());
        assert_eq!(bus.register(s, RegisterAddress::documented(126)), 0);

        bus.clear_faults();
        bus.write_single(125, 7, s).unwrap();
        assert_eq!(bus.register(s, RegisterAddress::documented(126)), 7);
        assert_eq!(bus.take_requests().len(), 2);
        assert!(bus.requests().is_empty());
    }
}
