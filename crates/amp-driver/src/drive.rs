//! 驱动器句柄与命令分发
//!
//! [`AmpDrive`] 把一个从站地址、一张寄存器映射表和一个传输对象绑在一起。
//! 传输对象通常是共享句柄（[`SharedBus`](amp_bus::SharedBus) 或
//! [`BusClient`](amp_bus::BusClient)），多台驱动器可以共用同一条总线。
//!
//! 两种结果约定：
//! - 写操作返回 `bool`，失败只记录 `warn!` 日志
//! - 读操作返回 `Result`，失败携带寄存器名、文档地址与传输层错误

use crate::DriverError;
use amp_bus::{RegisterTransport, RegisterWords};
use amp_protocol::{
    CommandDescriptor, Register, RegisterAddress, RegisterMap, RegisterWidth, SlaveId,
    decode32_words, encode32, single_word,
};
use tracing::{debug, trace, warn};

/// 单台驱动器句柄
pub struct AmpDrive<T> {
    identifier: String,
    slave: SlaveId,
    map: RegisterMap,
    transport: T,
}

impl<T: RegisterTransport> AmpDrive<T> {
    /// 使用默认寄存器映射（MDX+）创建句柄
    pub fn new(identifier: impl Into<String>, slave: SlaveId, transport: T) -> Self {
        Self::with_register_map(identifier, slave, transport, RegisterMap::default())
    }

    /// 使用指定寄存器映射创建句柄
    pub fn with_register_map(
        identifier: impl Into<String>,
        slave: SlaveId,
        transport: T,
        map: RegisterMap,
    ) -> Self {
        let identifier = identifier.into();
        debug!(
            drive = %identifier,
            slave = slave.get(),
            firmware = ?map.firmware(),
            "drive handle created"
        );
        Self {
            identifier,
            slave,
            map,
            transport,
        }
    }

    // ==================== 命令分发 ====================

    /// 发送暂存参数命令
    ///
    /// 依次写入已设置的参数（Param1 → Param4，跳过未设置的槽位），最后写入操作码。
    /// 参数写入失败不会中止后续写入，也不会回滚；返回值只反映操作码写入是否成功。
    /// 这意味着参数写入失败时，驱动器可能用上一条命令残留的参数执行新操作码。
    #[must_use = "a false result means the opcode write was not acknowledged"]
    pub fn send_command(&mut self, command: &CommandDescriptor) -> bool {
        debug!(
            drive = %self.identifier,
            opcode = command.opcode(),
            params = command.staged().count(),
            "dispatching command"
        );
        for (slot, value) in command.staged() {
            if !self.write_u16(slot.register(), value) {
                warn!(
                    drive = %self.identifier,
                    slot = ?slot,
                    "parameter write failed, opcode will still be sent"
                );
            }
        }
        self.write_u16(Register::CommandWord, command.opcode())
    }

    /// 发送不带参数的操作码
    #[must_use = "a false result means the opcode write was not acknowledged"]
    pub fn send_opcode(&mut self, opcode: impl Into<u16>) -> bool {
        self.send_command(&CommandDescriptor::new(opcode))
    }

    // ==================== 寄存器写入 ====================

    /// 写单个 16 位寄存器
    ///
    /// 寄存器在映射表中没有地址时不发起请求，返回 `false`。
    #[must_use = "a false result means the register write was not acknowledged"]
    pub fn write_u16(&mut self, register: Register, value: u16) -> bool {
        let Some(address) = self.write_address(register) else {
            return false;
        };
        trace!(
            drive = %self.identifier,
            register = %register,
            %address,
            value,
            "write_single"
        );
        match self
            .transport
            .write_single(address.wire(), value, self.slave)
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    drive = %self.identifier,
                    register = %register,
                    %address,
                    "register write failed: {e}"
                );
                false
            },
        }
    }

    /// 写 32 位寄存器（两个连续寄存器，高字在前，一次多寄存器写入）
    ///
    /// 寄存器在映射表中没有地址时不发起请求，返回 `false`。
    #[must_use = "a false result means the register write was not acknowledged"]
    pub fn write_i32(&mut self, register: Register, value: i32) -> bool {
        debug_assert_eq!(register.width(), RegisterWidth::Double, "{register} is 16-bit");
        let Some(address) = self.write_address(register) else {
            return false;
        };
        let words = encode32(value);
        trace!(
            drive = %self.identifier,
            register = %register,
            %address,
            value,
            "write_multiple"
        );
        match self
            .transport
            .write_multiple(address.wire(), &words, self.slave)
        {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    drive = %self.identifier,
                    register = %register,
                    %address,
                    value,
                    "register write failed: {e}"
                );
                false
            },
        }
    }

    fn write_address(&self, register: Register) -> Option<RegisterAddress> {
        let address = self.map.address(register);
        if address.is_none() {
            warn!(
                drive = %self.identifier,
                register = %register,
                "register has no configured address, write skipped"
            );
        }
        address
    }

    // ==================== 寄存器读取 ====================

    /// 按寄存器宽度读取原始字（每次调用都发起一次新的读请求）
    ///
    /// 寄存器在映射表中没有地址时返回 [`ProtocolError::UnmappedRegister`](amp_protocol::ProtocolError::UnmappedRegister)，
    /// 不发起请求。
    pub fn read_words(&mut self, register: Register) -> Result<RegisterWords, DriverError> {
        let address = self.map.require(register)?;
        let count = register.width().words();
        trace!(
            drive = %self.identifier,
            register = %register,
            %address,
            count,
            "read"
        );
        self.transport
            .read(address.wire(), count, self.slave)
            .map_err(|source| DriverError::Read {
                register,
                address,
                source,
            })
    }

    /// 读取 32 位寄存器
    pub fn read_i32(&mut self, register: Register) -> Result<i32, DriverError> {
        let words = self.read_words(register)?;
        Ok(decode32_words(&words)?)
    }

    /// 读取 16 位寄存器（无符号）
    pub fn read_u16(&mut self, register: Register) -> Result<u16, DriverError> {
        let words = self.read_words(register)?;
        Ok(single_word(&words)?)
    }

    /// 读取 16 位寄存器（有符号）
    pub fn read_i16(&mut self, register: Register) -> Result<i16, DriverError> {
        self.read_u16(register).map(amp_protocol::decode16_signed)
    }
}

impl<T> AmpDrive<T> {
    /// 驱动器标识
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// 从站地址（句柄生命周期内不变）
    pub fn slave(&self) -> SlaveId {
        self.slave
    }

    /// 寄存器映射表
    pub fn register_map(&self) -> &RegisterMap {
        &self.map
    }

    /// 访问传输对象
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// 可变访问传输对象
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// 拆出传输对象
    pub fn into_transport(self) -> T {
        self.transport
    }
}

impl<T> std::fmt::Debug for AmpDrive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmpDrive")
            .field("identifier", &self.identifier)
            .field("slave", &self.slave)
            .field("firmware", &self.map.firmware())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use amp_bus::{BusError, BusRequest, MockBus, MockFault};
    use amp_protocol::{Opcode, ParamSlot, ProtocolError};

    fn drive() -> AmpDrive<MockBus> {
        AmpDrive::new("MDXT", SlaveId::new(32).unwrap(), MockBus::new())
    }

    fn single(address: u16, value: u16) -> BusRequest {
        BusRequest::WriteSingle {
            slave: 32,
            address,
            value,
        }
    }

    #[test]
    fn test_params_precede_opcode_and_skip_unset() {
        let mut drive = drive();
        let cmd = CommandDescriptor::new(0x42u16)
            .with_param(ParamSlot::P1, 11)
            .with_param(ParamSlot::P3, 33);

        assert!(drive.send_command(&cmd));
        // Param1 = 126 → 125，Param3 = 128 → 127，命令字 125 → 124
        assert_eq!(
            drive.transport().requests(),
            &[single(125, 11), single(127, 33), single(124, 0x42)]
        );
    }

    #[test]
    fn test_param4_writes_its_own_value() {
        let mut drive = drive();
        let cmd = CommandDescriptor::new(0x42u16)
            .with_param(ParamSlot::P3, 3)
            .with_param(ParamSlot::P4, 4);
        assert!(drive.send_command(&cmd));
        assert_eq!(
            drive.transport().requests(),
            &[single(127, 3), single(128, 4), single(124, 0x42)]
        );
    }

    #[test]
    fn test_failed_param_write_still_sends_opcode() {
        let mut drive = drive();
        drive.transport_mut().fail_writes_at(125, MockFault::Timeout);
        let cmd = CommandDescriptor::new(Opcode::SetOutput)
            .with_param(ParamSlot::P1, b'1' as u16)
            .with_param(ParamSlot::P2, b'H' as u16);

        assert!(drive.send_command(&cmd));
        assert_eq!(drive.transport().requests().len(), 3);
        assert_eq!(drive.transport().requests()[2], single(124, 0x8B));
    }

    #[test]
    fn test_failed_opcode_write_returns_false() {
        let mut drive = drive();
        drive
            .transport_mut()
            .fail_writes_at(124, MockFault::Exception(4));
        assert!(!drive.send_opcode(Opcode::MotorEnable));
    }

    #[test]
    fn test_write_i32_uses_two_words_high_first() {
        let mut drive = drive();
        assert!(drive.write_i32(Register::PointToPointDistance, 100_000));
        assert_eq!(
            drive.transport().requests(),
            &[BusRequest::WriteMultiple {
                slave: 32,
                address: 350,
                values: vec![0x0001, 0x86A0],
            }]
        );
    }

    #[test]
    fn test_read_error_is_typed_and_not_decoded() {
        let mut drive = drive();
        drive.transport_mut().fail_reads_at(6, MockFault::Timeout);
        match drive.read_i32(Register::ImmediatePosition) {
            Err(DriverError::Read {
                register,
                address,
                source: BusError::Timeout,
            }) => {
                assert_eq!(register, Register::ImmediatePosition);
                assert_eq!(address, RegisterAddress::documented(7));
            },
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_every_read_hits_the_bus() {
        let mut drive = drive();
        let slave = drive.slave();
        drive
            .transport_mut()
            .set_i32(slave, RegisterAddress::documented(7), -5);
        assert_eq!(drive.read_i32(Register::ImmediatePosition).unwrap(), -5);
        assert_eq!(drive.read_i32(Register::ImmediatePosition).unwrap(), -5);
        assert_eq!(drive.transport().requests().len(), 2);
    }

    #[test]
    fn test_register_map_override_changes_wire_address() {
        let map = RegisterMap::default()
            .with_override(Register::JogSpeed, RegisterAddress::documented(400));
        let mut drive = AmpDrive::with_register_map(
            "MDXT",
            SlaveId::new(1).unwrap(),
            MockBus::new(),
            map,
        );
        assert!(drive.write_i32(Register::JogSpeed, 1));
        assert_eq!(drive.transport().requests()[0].address(), 399);
    }

    #[test]
    fn test_unmapped_register_never_reaches_the_bus() {
        let mut drive = drive();
        assert!(!drive.write_i32(Register::JogSpeed, 600));
        assert!(!drive.write_u16(Register::AlarmCode, 1));
        match drive.read_i16(Register::DriveTemperature) {
            Err(DriverError::Protocol(ProtocolError::UnmappedRegister(register))) => {
                assert_eq!(register, Register::DriveTemperature)
            },
            other => panic!("unexpected result {other:?}"),
        }
        assert!(drive.transport().requests().is_empty());
    }
}
