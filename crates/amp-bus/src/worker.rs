//! 单工作线程总线
//!
//! `BusWorker` 启动一个独占传输对象的线程，按到达顺序逐个执行请求。
//! 每个 [`BusClient`] 通过有界通道提交请求，并在一次性应答通道上阻塞等待结果。
//!
//! 生命周期：
//! - `BusWorker` 被 drop 时发送关闭请求并 join 线程
//! - 关闭之后客户端的请求返回 [`BusError::Disconnected`]

use crate::{BusError, RegisterTransport, RegisterWords};
use amp_protocol::SlaveId;
use crossbeam_channel::{Receiver, Sender, bounded};
use smallvec::SmallVec;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// 默认请求队列容量
pub const DEFAULT_QUEUE_CAPACITY: usize = 16;

type Reply<T> = Sender<Result<T, BusError>>;

enum Request {
    Read {
        address: u16,
        count: u16,
        slave: SlaveId,
        reply: Reply<RegisterWords>,
    },
    WriteSingle {
        address: u16,
        value: u16,
        slave: SlaveId,
        reply: Reply<()>,
    },
    WriteMultiple {
        address: u16,
        values: SmallVec<[u16; 2]>,
        slave: SlaveId,
        reply: Reply<()>,
    },
    Shutdown,
}

/// 拥有传输对象的工作线程
pub struct BusWorker<T> {
    tx: Option<Sender<Request>>,
    thread: Option<JoinHandle<T>>,
}

impl<T: RegisterTransport + Send + 'static> BusWorker<T> {
    /// 使用默认队列容量启动工作线程
    pub fn spawn(transport: T) -> Result<Self, BusError> {
        Self::spawn_with_capacity(transport, DEFAULT_QUEUE_CAPACITY)
    }

    /// 启动工作线程
    ///
    /// 队列满时客户端阻塞，直到工作线程取走请求。
    pub fn spawn_with_capacity(transport: T, capacity: usize) -> Result<Self, BusError> {
        let (tx, rx) = bounded(capacity.max(1));
        let thread = thread::Builder::new()
            .name("amp-bus-worker".into())
            .spawn(move || worker_loop(transport, rx))?;
        debug!(capacity, "bus worker started");
        Ok(Self {
            tx: Some(tx),
            thread: Some(thread),
        })
    }
}

impl<T> BusWorker<T> {
    /// 创建提交请求的客户端句柄
    pub fn client(&self) -> BusClient {
        BusClient { tx: self.tx.clone() }
    }

    /// 工作线程是否仍在运行
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// 停止工作线程并取回传输对象
    ///
    /// 已经在队列中的请求会先执行完。
    pub fn shutdown(mut self) -> Result<T, BusError> {
        self.stop()
    }

    fn stop(&mut self) -> Result<T, BusError> {
        if let Some(tx) = self.tx.take() {
            // 线程已退出时发送失败，直接 join 即可
            let _ = tx.send(Request::Shutdown);
        }
        let handle = self.thread.take().ok_or(BusError::Disconnected)?;
        handle.join().map_err(|_| {
            warn!("bus worker thread panicked");
            BusError::Disconnected
        })
    }
}

impl<T> Drop for BusWorker<T> {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.stop();
        }
    }
}

fn worker_loop<T: RegisterTransport>(mut transport: T, rx: Receiver<Request>) -> T {
    while let Ok(request) = rx.recv() {
        match request {
            Request::Read {
                address,
                count,
                slave,
                reply,
            } => {
                trace!(address, count, slave = slave.get(), "worker read");
                let _ = reply.send(transport.read(address, count, slave));
            },
            Request::WriteSingle {
                address,
                value,
                slave,
                reply,
            } => {
                trace!(address, value, slave = slave.get(), "worker write_single");
                let _ = reply.send(transport.write_single(address, value, slave));
            },
            Request::WriteMultiple {
                address,
                values,
                slave,
                reply,
            } => {
                trace!(address, ?values, slave = slave.get(), "worker write_multiple");
                let _ = reply.send(transport.write_multiple(address, &values, slave));
            },
            Request::Shutdown => break,
        }
    }
    debug!("bus worker stopped");
    transport
}

/// 向工作线程提交请求的句柄
///
/// 可以在线程间克隆和移动；每个请求阻塞直到工作线程给出应答。
#[derive(Clone)]
pub struct BusClient {
    tx: Option<Sender<Request>>,
}

impl BusClient {
    fn call<R>(&self, make: impl FnOnce(Reply<R>) -> Request) -> Result<R, BusError> {
        let tx = self.tx.as_ref().ok_or(BusError::Disconnected)?;
        let (reply_tx, reply_rx) = bounded(1);
        tx.send(make(reply_tx)).map_err(|_| BusError::Disconnected)?;
        reply_rx.recv().map_err(|_| BusError::Disconnected)?
    }
}

impl RegisterTransport for BusClient {
    fn read(&mut self, address: u16, count: u16, slave: SlaveId) -> Result<RegisterWords, BusError> {
        self.call(|reply| Request::Read {
            address,
            count,
            slave,
            reply,
        })
    }

    fn write_single(&mut self, address: u16, value: u16, slave: SlaveId) -> Result<(), BusError> {
        self.call(|reply| Request::WriteSingle {
            address,
            value,
            slave,
            reply,
        })
    }

    fn write_multiple(
        &mut self,
        address: u16,
        values: &[u16],
        slave: SlaveId,
    ) -> Result<(), BusError> {
        let values = SmallVec::from_slice(values);
        self.call(|reply| Request::WriteMultiple {
            address,
            values,
            slave,
            reply,
        })
    }
}
