//! 端到端集成测试
//!
//! 通过 `MockBus` 验证从工程单位到总线请求的完整链路：
//! - 字序编码与寄存器地址（文档地址 - 1）
//! - 暂存参数命令的写入顺序
//! - 模式守护（只读一次 CM，至多写一次）
//! - 工作线程与共享总线上的多驱动器访问
//! - 配置加载到电机句柄

use amp_sdk::bus::{BusRequest, MockBus, MockFault};
use amp_sdk::prelude::*;
use amp_sdk::protocol::{decode32, encode32};
use std::thread;

const CM: u16 = 262;
const CMD: u16 = 124;

fn slave(id: u8) -> SlaveId {
    SlaveId::new(id).unwrap()
}

fn writes(requests: &[BusRequest]) -> Vec<&BusRequest> {
    requests.iter().filter(|r| r.is_write()).collect()
}

/// 默认映射表补充点动寄存器地址
fn jog_map() -> RegisterMap {
    RegisterMap::default()
        .with_override(Register::JogSpeed, RegisterAddress::documented(339))
        .with_override(Register::JogAcceleration, RegisterAddress::documented(341))
        .with_override(Register::JogDeceleration, RegisterAddress::documented(343))
}

fn jog_drive<T: RegisterTransport>(identifier: &str, id: u8, transport: T) -> AmpDrive<T> {
    AmpDrive::with_register_map(identifier, slave(id), transport, jog_map())
}

#[test]
fn test_codec_word_order() {
    assert_eq!(encode32(100_000), [0x0001, 0x86A0]);
    assert_eq!(decode32([0x0001, 0x86A0]), 100_000);
    assert_eq!(encode32(99_999), [0x0001, 0x869F]);
    assert_eq!(decode32([0x0001, 0x869F]), 99_999);
    assert_eq!(encode32(-1), [0xFFFF, 0xFFFF]);
}

#[test]
fn test_unit_conversions_match_device_values() {
    let profile = MotionProfile::new(1, 20_000).unwrap();
    assert_eq!(profile.degrees_to_pulses(180.0).unwrap(), Pulses(10_000));
    assert_eq!(profile.pulses_to_degrees(Pulses(10_000)), 180);
    assert_eq!(profile.rpm_to_speed_units(150.0).unwrap(), SpeedUnits(600));
    assert_eq!(profile.rev_per_s2_to_accel_units(160.0).unwrap(), AccelUnits(960));
}

#[test]
fn test_set_output_stages_params_before_opcode() {
    let mut drive = AmpDrive::new("MDXT", slave(32), MockBus::new());
    assert!(drive.set_output('2', false));
    assert_eq!(
        drive.transport().requests(),
        &[
            BusRequest::WriteSingle {
                slave: 32,
                address: 125,
                value: '2' as u16,
            },
            BusRequest::WriteSingle {
                slave: 32,
                address: 126,
                value: 'L' as u16,
            },
            BusRequest::WriteSingle {
                slave: 32,
                address: CMD,
                value: 0x8B,
            },
        ]
    );
}

#[test]
fn test_p1_p3_command_skips_unset_slots() {
    let mut drive = AmpDrive::new("MDXT", slave(1), MockBus::new());
    let command = CommandDescriptor::new(0x50u16)
        .with_param(ParamSlot::P1, 0x32)
        .with_param(ParamSlot::P3, 7);
    assert!(drive.send_command(&command));
    let addresses: Vec<u16> = drive
        .transport()
        .requests()
        .iter()
        .map(BusRequest::address)
        .collect();
    assert_eq!(addresses, vec![125, 127, CMD]);
}

#[test]
fn test_read_failure_is_typed_error() {
    let mut bus = MockBus::new();
    bus.fail_reads_at(6, MockFault::Timeout);
    let mut drive = AmpDrive::new("MDXT", slave(1), bus);
    match drive.get_position() {
        Err(DriverError::Read {
            register, address, ..
        }) => {
            assert_eq!(register, Register::ImmediatePosition);
            assert_eq!(address.number(), 7);
        },
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_write_failure_returns_false() {
    let mut bus = MockBus::new();
    bus.fail_writes_at(CMD, MockFault::Exception(0x04));
    let mut drive = jog_drive("MDXT", 1, bus);
    assert!(!drive.enable_motor());
    assert!(drive.set_jog_speed(SpeedUnits(600)));
}

#[test]
fn test_speed_mode_already_active_writes_nothing() {
    let mut bus = MockBus::new();
    bus.set_i32(slave(1), RegisterAddress::documented(263), 33);
    let mut motor = Motor::new(AmpDrive::new("MDXT", slave(1), bus));

    let transition = motor.ensure_speed_mode().unwrap();
    assert_eq!(transition, ModeTransition::AlreadyActive(OperatingMode::Velocity));
    assert!(!transition.switched());

    let requests = motor.drive().transport().requests();
    assert_eq!(
        requests,
        &[BusRequest::Read {
            slave: 1,
            address: CM,
            count: 2,
        }]
    );
}

#[test]
fn test_speed_mode_switch_resets_then_writes_once() {
    let mut bus = MockBus::new();
    bus.set_i32(slave(1), RegisterAddress::documented(263), 21);
    let mut motor = Motor::new(AmpDrive::new("MDXT", slave(1), bus));

    let transition = motor.ensure_speed_mode().unwrap();
    assert_eq!(
        transition,
        ModeTransition::Switched {
            from: OperatingMode::Position,
            to: OperatingMode::Velocity,
            acknowledged: true,
        }
    );

    let requests = motor.drive().transport().requests();
    assert_eq!(
        writes(requests),
        vec![
            &BusRequest::WriteSingle {
                slave: 1,
                address: CMD,
                value: 0xE1,
            },
            &BusRequest::WriteMultiple {
                slave: 1,
                address: CM,
                values: vec![0, 33],
            },
        ]
    );
}

#[test]
fn test_run_at_rpm_end_to_end() {
    let mut bus = MockBus::new();
    bus.set_i32(slave(5), RegisterAddress::documented(263), 33);
    let mut motor = Motor::new(jog_drive("MDXT", 5, bus))
        .with_profile(MotionProfile::new(1, 20_000).unwrap());

    assert!(motor.run_at_rpm(150.0, 160.0).unwrap());
    let bus = motor.drive().transport();
    assert_eq!(bus.get_i32(slave(5), RegisterAddress::documented(353)), 960);
    assert_eq!(bus.get_i32(slave(5), RegisterAddress::documented(339)), 600);
    // AM 先于 JS
    let order: Vec<u16> = writes(bus.requests()).iter().map(|r| r.address()).collect();
    assert_eq!(order, vec![352, 338]);
}

#[test]
fn test_go_to_degrees_writes_target_last() {
    let mut motor = Motor::new(AmpDrive::new("MDXT", slave(1), MockBus::new()))
        .with_profile(MotionProfile::new(1, 20_000).unwrap())
        .with_policy(ModeSwitchPolicy::without_reset());

    assert!(motor.go_to_degrees(180.0, 150.0, 160.0).unwrap());
    let bus = motor.drive().transport();
    let order: Vec<u16> = writes(bus.requests()).iter().map(|r| r.address()).collect();
    // CM → VM → AM → DI
    assert_eq!(order, vec![CM, 336, 352, 350]);
    assert_eq!(bus.get_i32(slave(1), RegisterAddress::documented(351)), 10_000);
}

#[test]
fn test_worker_serializes_multiple_drives() {
    let worker = BusWorker::spawn(MockBus::new()).unwrap();
    let handles: Vec<_> = (1..=3u8)
        .map(|id| {
            let client = worker.client();
            thread::spawn(move || {
                let mut drive = jog_drive(&format!("axis{id}"), id, client);
                for _ in 0..10 {
                    assert!(drive.set_jog_speed(SpeedUnits(i32::from(id) * 100)));
                    assert!(drive.start_jogging());
                }
                drive.get_mode().unwrap()
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), OperatingMode::Other(0));
    }

    let bus = worker.shutdown().unwrap();
    assert_eq!(bus.requests().len(), 3 * (10 * 2 + 1));
    for id in 1..=3u8 {
        assert_eq!(
            bus.get_i32(slave(id), RegisterAddress::documented(339)),
            i32::from(id) * 100
        );
    }
}

#[test]
fn test_shared_bus_handles_see_same_registers() {
    let bus = SharedBus::new(MockBus::new());
    let mut writer = AmpDrive::new("a", slave(2), bus.clone());
    let mut reader = AmpDrive::new("b", slave(2), bus.clone());

    assert!(writer.set_target_position(Pulses(-20_000)));
    assert_eq!(
        bus.lock().get_i32(slave(2), RegisterAddress::documented(351)),
        -20_000
    );
    assert_eq!(reader.read_i32(Register::PointToPointDistance).unwrap(), -20_000);
}

#[test]
fn test_speed_command_without_jog_address_stays_off_the_bus() {
    let mut bus = MockBus::new();
    bus.set_i32(slave(1), RegisterAddress::documented(263), 33);
    let mut motor = Motor::new(AmpDrive::new("MDXT", slave(1), bus))
        .with_profile(MotionProfile::new(1, 20_000).unwrap());

    // JS 未配置：速度写入不发出，结果为 false
    assert!(!motor.run_at_rpm(150.0, 160.0).unwrap());
    let bus = motor.drive().transport();
    let order: Vec<u16> = writes(bus.requests()).iter().map(|r| r.address()).collect();
    assert_eq!(order, vec![352]);

    // IT 未配置：读取返回类型化错误，不发请求
    let reads_before = bus.requests().len();
    assert!(matches!(
        motor.drive_mut().get_temperature(),
        Err(DriverError::Protocol(ProtocolError::UnmappedRegister(
            Register::DriveTemperature
        )))
    ));
    assert_eq!(motor.drive().transport().requests().len(), reads_before);
}

#[test]
fn test_config_to_motor() {
    let text = include_str!("../config/drives.example.toml");
    let config = SdkConfig::from_toml_str(text).unwrap();
    assert_eq!(config.drives.len(), 3);

    let bus = SharedBus::new(MockBus::new());
    let mut z = config.drive("MDXR83_Z").unwrap().open(bus.clone());
    assert_eq!(z.drive().slave().get(), 3);
    assert_eq!(z.policy().reset_opcode, Opcode::StopKillDecel);

    // CM 读为 0，切换前先发送 SKD
    assert!(z.run_at_rpm(60.0, 25.0).unwrap());
    let guard = bus.lock();
    let first_write = writes(guard.requests())[0].clone();
    assert_eq!(
        first_write,
        BusRequest::WriteSingle {
            slave: 3,
            address: CMD,
            value: 0xE2,
        }
    );
    assert_eq!(z.profile().unwrap().hub_diameter(), Some(40.0));
}

proptest::proptest! {
    #[test]
    fn prop_position_round_trip_through_bus(degrees in -3600i32..3600) {
        let mut motor = Motor::new(AmpDrive::new("MDXT", slave(1), MockBus::new()))
            .with_profile(MotionProfile::new(1, 20_000).unwrap())
            .with_policy(ModeSwitchPolicy::without_reset());
        proptest::prop_assert!(motor.go_to_degrees(f64::from(degrees), 60.0, 10.0).unwrap());

        // 目标写入 DI，这里把它当作当前位置读回
        let target = motor
            .drive_mut()
            .read_i32(Register::PointToPointDistance)
            .unwrap();
        let start = RegisterAddress::documented(7);
        let bus = motor.drive_mut().transport_mut();
        bus.set_i32(slave(1), start, target);

        let back = motor.position_degrees().unwrap();
        proptest::prop_assert!((back - i64::from(degrees)).abs() <= 1);
    }
}
