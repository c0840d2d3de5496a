//! 互斥共享总线
//!
//! 多个驱动器句柄（不同从站地址）共用一个传输对象时，`SharedBus` 以
//! `Arc<Mutex<T>>` 持有传输对象，每次请求加锁一次，保证链路上没有交错请求。

use crate::{BusError, RegisterTransport, RegisterWords};
use amp_protocol::SlaveId;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// 互斥共享的传输对象句柄
///
/// `Clone` 只复制引用计数，所有克隆指向同一个传输对象。
///
/// # 示例
///
/// ```rust,ignore
/// let bus = SharedBus::new(transport);
/// let axis1 = AmpDrive::new("MDXR83_Auto", slave1, bus.clone(), map);
/// let axis2 = AmpDrive::new("MDXR83_Manual", slave2, bus.clone(), map);
/// ```
pub struct SharedBus<T> {
    inner: Arc<Mutex<T>>,
}

impl<T> SharedBus<T> {
    /// 包装传输对象
    pub fn new(transport: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(transport)),
        }
    }

    /// 独占访问底层传输对象（用于批量操作或测试检查）
    ///
    /// 持有守卫期间，其他句柄的请求会阻塞。
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.inner.lock()
    }

    /// 当前共享该传输对象的句柄数量
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

impl<T> Clone for SharedBus<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: RegisterTransport> RegisterTransport for SharedBus<T> {
    fn read(&mut self, address: u16, count: u16, slave: SlaveId) -> Result<RegisterWords, BusError> {
        self.inner.lock().read(address, count, slave)
    }

    fn write_single(&mut self, address: u16, value: u16, slave: SlaveId) -> Result<(), BusError> {
        self.inner.lock().write_single(address, value, slave)
    }

    fn write_multiple(
        &mut self,
        address: u16,
        values: &[u16],
        slave: SlaveId,
    ) -> Result<(), BusError> {
        self.inner.lock().write_multiple(address, values, slave)
    }
}
