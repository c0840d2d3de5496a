//! 日志初始化
//!
//! 安装 `tracing-subscriber` 的 fmt 订阅器（`RUST_LOG` 可覆盖默认过滤指令），
//! 并把 `log` 记录桥接到 `tracing`，使依赖 `log` 的传输实现也能输出到同一处。

use tracing_subscriber::EnvFilter;

/// 默认过滤指令
pub const DEFAULT_DIRECTIVE: &str = "info";

/// 使用默认过滤指令初始化日志
///
/// 已经初始化过（或其他代码已安装全局订阅器）时返回 `false`，不会 panic。
pub fn init_logging() -> bool {
    init_logging_with(DEFAULT_DIRECTIVE)
}

/// 使用指定的默认过滤指令初始化日志（`RUST_LOG` 优先）
pub fn init_logging_with(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }
    // log → tracing
    let _ = tracing_log::LogTracer::init();
    true
}
