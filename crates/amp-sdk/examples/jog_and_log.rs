//! 点动并记录电流
//!
//! 设置点动加减速与速度，使能并开始点动，按固定周期记录即时电流到文件，
//! 到时或按 Ctrl-C 后停止并失能。
//!
//! 本示例使用内存总线（`MockBus`），接入真实驱动器时替换为实际的 Modbus 传输实现。
//!
//! # 使用说明
//!
//! ```bash
//! cargo run -p amp-sdk --example jog_and_log -- --slave 32 --rpm 240 --seconds 10
//! ```

use amp_sdk::bus::MockBus;
use amp_sdk::prelude::*;
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "jog_and_log")]
#[command(about = "Jog one drive and log its immediate current", long_about = None)]
struct Args {
    /// 驱动器标识
    #[arg(long, default_value = "MDXT")]
    identifier: String,

    /// 从站地址
    #[arg(long, default_value = "32")]
    slave: u8,

    /// 每转步数（驱动器配置软件中设置）
    #[arg(long, default_value = "20000")]
    steps_per_rev: u32,

    /// 减速比倍数（仅评估电机时为 1）
    #[arg(long, default_value = "1")]
    gear_multiplier: u32,

    /// 点动速度（RPM）
    #[arg(long, default_value = "240")]
    rpm: f64,

    /// 点动加速度（rev/s²）
    #[arg(long, default_value = "100")]
    accel: f64,

    /// 点动减速度（rev/s²）
    #[arg(long, default_value = "100")]
    decel: f64,

    /// 记录时长（秒）
    #[arg(long, default_value = "10")]
    seconds: u64,

    /// 采样周期（毫秒）
    #[arg(long, default_value = "1000")]
    interval_ms: u64,

    /// 点动速度寄存器的文档地址（JS）
    #[arg(long, default_value = "339")]
    jog_speed_address: u32,

    /// 点动加速度寄存器的文档地址（JA）
    #[arg(long, default_value = "341")]
    jog_accel_address: u32,

    /// 点动减速度寄存器的文档地址（JL）
    #[arg(long, default_value = "343")]
    jog_decel_address: u32,

    /// 输出文件
    #[arg(long, default_value = "current_log.txt")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    let profile = MotionProfile::new(args.gear_multiplier, args.steps_per_rev)?;
    let worker = BusWorker::spawn(MockBus::new())?;
    // 点动寄存器不在默认映射表中，按驱动器手册补充
    let map = RegisterMap::default()
        .with_override(Register::JogSpeed, RegisterAddress::new(args.jog_speed_address)?)
        .with_override(Register::JogAcceleration, RegisterAddress::new(args.jog_accel_address)?)
        .with_override(Register::JogDeceleration, RegisterAddress::new(args.jog_decel_address)?);
    map.validate()?;
    let mut drive =
        AmpDrive::with_register_map(&args.identifier, SlaveId::new(args.slave)?, worker.client(), map);
    println!("{} slave address: {}", drive.identifier(), drive.slave());

    let accel = profile.rev_per_s2_to_accel_units(args.accel)?;
    let decel = profile.rev_per_s2_to_accel_units(args.decel)?;
    let speed = profile.rpm_to_speed_units(args.rpm)?;
    println!("Jog acceleration set: {}", drive.set_jog_acceleration(accel));
    println!("Jog deceleration set: {}", drive.set_jog_deceleration(decel));
    println!("Jog speed set ({speed}): {}", drive.set_jog_speed(speed));
    println!("Motor enable sent: {}", drive.enable_motor());
    println!("Jog motion in progress: {}", drive.start_jogging());

    let token = CancellationToken::new();
    let on_signal = token.clone();
    ctrlc::set_handler(move || on_signal.cancel())?;

    let mut file = BufWriter::new(File::create(&args.output)?);
    writeln!(file, "[time, {}]", drive.identifier())?;
    println!("Logging started. Saving to '{}'...", args.output.display());

    let monitor = Monitor::new(
        Duration::from_millis(args.interval_ms),
        StopCondition::Deadline(Duration::from_secs(args.seconds)),
    );
    let mut write_error = None;
    let report = monitor.run(
        &token,
        || drive.get_current(),
        |event| {
            let value = match &event.result {
                Ok(current) => current.to_string(),
                Err(e) => {
                    eprintln!("Error reading current: {e}");
                    "ERROR".to_string()
                },
            };
            let line = writeln!(file, "[{:.2}, {value}]", event.elapsed.as_secs_f64())
                .and_then(|()| file.flush());
            if let Err(e) = line {
                write_error.get_or_insert(e);
            }
        },
    );
    if let Some(e) = write_error {
        return Err(e.into());
    }
    println!(
        "Logging complete: {} samples, {} failures ({:?})",
        report.samples, report.failures, report.stop_reason
    );

    let stopped = drive.stop_motor();
    println!("{} stopping: {stopped}", drive.identifier());
    println!("Motor disable sent: {}", drive.disable_motor());

    drop(drive);
    worker.shutdown()?;
    Ok(())
}
