//! 遥测采样循环
//!
//! [`Monitor`] 以固定周期调用采样函数，把每次结果交给调用方的处理函数，
//! 直到满足 [`StopCondition`] 或 [`CancellationToken`] 被取消。
//!
//! - 采样失败只计数并交给处理函数，循环继续
//! - 取消会立即唤醒正在等待下一周期的循环（条件变量，不轮询）
//!
//! # 示例
//!
//! ```rust
//! use amp_client::{CancellationToken, Monitor, StopCondition, StopReason};
//! use std::time::Duration;
//!
//! let monitor = Monitor::new(Duration::ZERO, StopCondition::SampleCount(3));
//! let mut seen = Vec::new();
//! let report = monitor.run(
//!     &CancellationToken::new(),
//!     || Ok::<_, std::io::Error>(42),
//!     |event| seen.push(event.index),
//! );
//! assert_eq!(seen, vec![0, 1, 2]);
//! assert_eq!(report.stop_reason, StopReason::SampleCount);
//! ```

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// 协作式取消令牌
///
/// `Clone` 后的令牌共享同一状态；任意一个调用 [`cancel`](Self::cancel) 都会唤醒所有等待者。
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

#[derive(Default)]
struct TokenInner {
    cancelled: Mutex<bool>,
    cond: Condvar,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取消并唤醒所有等待者（可重复调用）
    pub fn cancel(&self) {
        let mut cancelled = self.inner.cancelled.lock();
        *cancelled = true;
        self.inner.cond.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.cancelled.lock()
    }

    /// 等待到 `deadline` 或被取消
    ///
    /// 返回 `true` 表示已取消。
    pub fn wait_until(&self, deadline: Instant) -> bool {
        self.wait(Some(deadline))
    }

    /// 等待 `timeout` 或被取消
    ///
    /// `timeout` 超出 `Instant` 可表示的范围时一直等到取消。
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        self.wait(Instant::now().checked_add(timeout))
    }

    /// `None` 表示没有截止时间
    fn wait(&self, deadline: Option<Instant>) -> bool {
        let mut cancelled = self.inner.cancelled.lock();
        while !*cancelled {
            match deadline {
                Some(deadline) => {
                    if self.inner.cond.wait_until(&mut cancelled, deadline).timed_out() {
                        break;
                    }
                },
                None => self.inner.cond.wait(&mut cancelled),
            }
        }
        *cancelled
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

/// 停止条件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopCondition {
    /// 运行时长
    Deadline(Duration),
    /// 采样次数（成功与失败都计数）
    SampleCount(usize),
    /// 只由取消令牌停止
    Manual,
}

/// 实际停止原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Deadline,
    SampleCount,
    Cancelled,
}

/// 单次采样事件
#[derive(Debug)]
pub struct MonitorEvent<V, E> {
    /// 采样序号（从 0 开始）
    pub index: usize,
    /// 距离开始的时间
    pub elapsed: Duration,
    pub result: Result<V, E>,
}

/// 采样循环结束时的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorReport {
    /// 成功次数
    pub samples: usize,
    /// 失败次数
    pub failures: usize,
    pub stop_reason: StopReason,
    pub elapsed: Duration,
}

/// 固定周期采样器
#[derive(Debug, Clone, Copy)]
pub struct Monitor {
    interval: Duration,
    stop: StopCondition,
}

impl Monitor {
    pub fn new(interval: Duration, stop: StopCondition) -> Self {
        Self { interval, stop }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn stop_condition(&self) -> StopCondition {
        self.stop
    }

    /// 运行采样循环（阻塞当前线程）
    ///
    /// 第一次采样立即进行，之后按 `start + n * interval` 的固定节拍采样；
    /// 单次采样耗时超过周期时不补采。
    pub fn run<V, E, F, S>(
        &self,
        token: &CancellationToken,
        mut sample: F,
        mut sink: S,
    ) -> MonitorReport
    where
        F: FnMut() -> Result<V, E>,
        S: FnMut(MonitorEvent<V, E>),
    {
        let start = Instant::now();
        // 超出 Instant 范围的时长等同于没有截止时间
        let deadline = match self.stop {
            StopCondition::Deadline(d) => start.checked_add(d),
            _ => None,
        };
        let mut samples = 0usize;
        let mut failures = 0usize;
        let mut tick: u32 = 0;

        let stop_reason = loop {
            if token.is_cancelled() {
                break StopReason::Cancelled;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                break StopReason::Deadline;
            }
            if let StopCondition::SampleCount(n) = self.stop {
                if samples + failures >= n {
                    break StopReason::SampleCount;
                }
            }

            let index = samples + failures;
            let result = sample();
            if result.is_ok() {
                samples += 1;
            } else {
                failures += 1;
            }
            trace!(index, ok = result.is_ok(), "monitor sample");
            sink(MonitorEvent {
                index,
                elapsed: start.elapsed(),
                result,
            });

            if let StopCondition::SampleCount(n) = self.stop {
                if samples + failures >= n {
                    break StopReason::SampleCount;
                }
            }

            tick = tick.saturating_add(1);
            let next = match (start.checked_add(self.interval.saturating_mul(tick)), deadline) {
                (Some(next), Some(d)) => Some(next.min(d)),
                (next, None) => next,
                (None, d) => d,
            };
            if token.wait(next) {
                break StopReason::Cancelled;
            }
        };

        let report = MonitorReport {
            samples,
            failures,
            stop_reason,
            elapsed: start.elapsed(),
        };
        debug!(?report, "monitor stopped");
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Debug)]
    struct Fault;

    #[test]
    fn test_sample_count_counts_failures() {
        let monitor = Monitor::new(Duration::ZERO, StopCondition::SampleCount(5));
        let mut n = 0;
        let mut errors = 0;
        let report = monitor.run(
            &CancellationToken::new(),
            || {
                n += 1;
                if n % 2 == 0 { Err(Fault) } else { Ok(n) }
            },
            |event| {
                if event.result.is_err() {
                    errors += 1;
                }
            },
        );
        assert_eq!(report.samples, 3);
        assert_eq!(report.failures, 2);
        assert_eq!(errors, 2);
        assert_eq!(report.stop_reason, StopReason::SampleCount);
    }

    #[test]
    fn test_deadline_stops_loop() {
        let monitor = Monitor::new(
            Duration::from_millis(5),
            StopCondition::Deadline(Duration::from_millis(40)),
        );
        let report = monitor.run(&CancellationToken::new(), || Ok::<_, Fault>(()), |_| {});
        assert_eq!(report.stop_reason, StopReason::Deadline);
        assert!(report.samples >= 1);
        assert!(report.elapsed >= Duration::from_millis(40));
    }

    #[test]
    fn test_cancel_wakes_sleeping_loop() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            canceller.cancel();
        });

        let monitor = Monitor::new(Duration::from_secs(60), StopCondition::Manual);
        let started = Instant::now();
        let report = monitor.run(&token, || Ok::<_, Fault>(()), |_| {});
        handle.join().unwrap();

        assert_eq!(report.stop_reason, StopReason::Cancelled);
        assert_eq!(report.samples, 1);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        token.cancel();
        let monitor = Monitor::new(Duration::ZERO, StopCondition::Manual);
        let report = monitor.run(&token, || Ok::<_, Fault>(()), |_| panic!("sampled"));
        assert_eq!(report.samples, 0);
        assert_eq!(report.stop_reason, StopReason::Cancelled);
    }

    #[test]
    fn test_wait_timeout_without_cancel() {
        let token = CancellationToken::new();
        assert!(!token.wait_timeout(Duration::from_millis(5)));
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_unbounded_deadline_runs_until_cancelled() {
        let token = CancellationToken::new();
        let stopper = token.clone();
        let monitor = Monitor::new(Duration::ZERO, StopCondition::Deadline(Duration::MAX));
        let report = monitor.run(
            &token,
            || Ok::<_, Fault>(()),
            |event| {
                if event.index == 2 {
                    stopper.cancel();
                }
            },
        );
        assert_eq!(report.samples, 3);
        assert_eq!(report.stop_reason, StopReason::Cancelled);
    }

    #[test]
    fn test_unbounded_interval_waits_for_cancel() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            canceller.cancel();
        });

        let monitor = Monitor::new(Duration::MAX, StopCondition::Deadline(Duration::MAX));
        let report = monitor.run(&token, || Ok::<_, Fault>(()), |_| {});
        handle.join().unwrap();
        assert!(report.samples <= 1);
        assert_eq!(report.stop_reason, StopReason::Cancelled);
    }

    #[test]
    fn test_wait_timeout_max_returns_on_cancel() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            canceller.cancel();
        });
        assert!(token.wait_timeout(Duration::MAX));
        handle.join().unwrap();
    }
}
