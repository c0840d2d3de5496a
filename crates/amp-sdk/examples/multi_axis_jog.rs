//! 多轴点动
//!
//! 从 TOML 配置加载多台驱动器（同一条总线），全部切到速度模式并以相同转速运行，
//! 运行期间轮询遥测，结束后逐台停止。
//!
//! ```bash
//! cargo run -p amp-sdk --example multi_axis_jog -- --rpm 60 --seconds 5
//! cargo run -p amp-sdk --example multi_axis_jog -- --config my_drives.toml
//! ```

use amp_sdk::bus::MockBus;
use amp_sdk::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

const EXAMPLE_CONFIG: &str = include_str!("../config/drives.example.toml");

#[derive(Parser, Debug)]
#[command(name = "multi_axis_jog")]
#[command(about = "Run every configured axis at the same speed", long_about = None)]
struct Args {
    /// 配置文件（缺省使用内置的三轴示例）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 转速（RPM）
    #[arg(long, default_value = "60", allow_hyphen_values = true)]
    rpm: f64,

    /// 加速度（rev/s²）
    #[arg(long, default_value = "25")]
    accel: f64,

    /// 运行时长（秒）
    #[arg(long, default_value = "5")]
    seconds: u64,

    /// 遥测周期（毫秒）
    #[arg(long, default_value = "500")]
    interval_ms: u64,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SdkConfig::load(path)?,
        None => SdkConfig::from_toml_str(EXAMPLE_CONFIG)?,
    };
    println!("Loaded {} drive(s)", config.drives.len());

    let bus = SharedBus::new(MockBus::new());
    let mut motors: Vec<_> = config.drives.iter().map(|d| d.open(bus.clone())).collect();

    for motor in &mut motors {
        match motor.run_at_rpm(args.rpm, args.accel) {
            Ok(acknowledged) => {
                println!("{} running at {} rpm: {acknowledged}", motor.drive().identifier(), args.rpm)
            },
            Err(e) => warn!(drive = motor.drive().identifier(), "failed to start: {e}"),
        }
    }

    let token = CancellationToken::new();
    let on_signal = token.clone();
    ctrlc::set_handler(move || on_signal.cancel())?;

    let monitor = Monitor::new(
        Duration::from_millis(args.interval_ms),
        StopCondition::Deadline(Duration::from_secs(args.seconds)),
    );
    let report = monitor.run(
        &token,
        || {
            motors
                .iter_mut()
                .map(|m| m.drive_mut().read_telemetry())
                .collect::<Result<Vec<_>, _>>()
        },
        |event| match event.result {
            Ok(samples) => {
                for sample in samples {
                    println!("[{:.1}s] {sample}", event.elapsed.as_secs_f64());
                }
            },
            Err(e) => eprintln!("[{:.1}s] telemetry error: {e}", event.elapsed.as_secs_f64()),
        },
    );
    println!("Telemetry stopped: {:?}", report.stop_reason);

    for motor in &mut motors {
        let drive = motor.drive_mut();
        let stopped = drive.stop_motor();
        println!("{} stopping: {stopped}", drive.identifier());
    }
    Ok(())
}
