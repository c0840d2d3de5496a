//! 点位运动
//!
//! 输出 2 置低后下发目标位置并执行 FP，等待运动完成后停止并读取位置；
//! 随后用工程单位（度）再做一次模式守护的点位运动。
//!
//! ```bash
//! cargo run -p amp-sdk --example position_move -- --target 20000 --degrees 90
//! ```

use amp_sdk::bus::MockBus;
use amp_sdk::prelude::*;
use clap::Parser;
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "position_move")]
#[command(about = "Feed one drive to a target position", long_about = None)]
struct Args {
    /// 从站地址
    #[arg(long, default_value = "32")]
    slave: u8,

    /// 目标位置（脉冲）
    #[arg(long, default_value = "20000", allow_hyphen_values = true)]
    target: i32,

    /// 第二段运动的目标角度（度）
    #[arg(long, default_value = "90", allow_hyphen_values = true)]
    degrees: f64,

    /// 运动速度（RPM）
    #[arg(long, default_value = "120")]
    rpm: f64,

    /// 加速度（rev/s²）
    #[arg(long, default_value = "50")]
    accel: f64,

    /// 运动等待时间（毫秒）
    #[arg(long, default_value = "3000")]
    settle_ms: u64,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let bus = SharedBus::new(MockBus::new());
    let drive = AmpDrive::new("MDXT", SlaveId::new(args.slave)?, bus.clone());
    let mut motor = Motor::new(drive).with_profile(MotionProfile::new(1, 20_000)?);
    let settle = Duration::from_millis(args.settle_ms);

    // 设备单位
    let drive = motor.drive_mut();
    println!("Output 2 low: {}", drive.set_output('2', false));
    println!("Target position set: {}", drive.set_target_position(Pulses(args.target)));
    println!("Feed to position: {}", drive.feed_to_position());
    thread::sleep(settle);
    println!("Stop: {}", drive.stop_motor());
    match drive.get_position() {
        Ok(position) => println!("Immediate position: {position}"),
        Err(e) => eprintln!("Error reading position: {e}"),
    }

    // 工程单位（先确认位置模式）
    let acknowledged = motor.go_to_degrees(args.degrees, args.rpm, args.accel)?;
    println!("Move to {}°: {acknowledged}", args.degrees);
    println!("Feed to position: {}", motor.drive_mut().feed_to_position());
    thread::sleep(settle);
    println!("Position: {}°", motor.position_degrees()?);

    println!("Requests on the bus: {}", bus.lock().requests().len());
    Ok(())
}
