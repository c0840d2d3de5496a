//! # 部署配置
//!
//! TOML 格式，每台驱动器一个 `[[drive]]` 表：
//!
//! ```toml
//! [[drive]]
//! identifier = "MDXT"
//! slave = 32
//! firmware = "mdxt"            # 选择寄存器映射表（默认 mdxt）
//!
//! [drive.registers]            # 补充或覆盖文档地址
//! jog_speed = 339              # 点动与部分遥测寄存器不在厂商表中，需按手册填写
//! drive_temperature = 19
//!
//! [drive.profile]              # 可选：启用工程单位操作
//! gear_multiplier = 1
//! steps_per_rev = 20000
//! hub_diameter_mm = 40.0
//!
//! [drive.mode_switch]          # 可选：模式切换策略
//! reset_before_switch = true
//! reset_opcode = "SK"
//! ```
//!
//! 加载时完成全部校验（从站范围、地址 1 起始、运动参数、地址区间重叠、
//! 参数寄存器连续、重复的标识或从站地址），内存中的配置总是合法的。

use amp_bus::RegisterTransport;
use amp_client::{ModeSwitchPolicy, Motor};
use amp_driver::AmpDrive;
use amp_protocol::{Firmware, Register, RegisterAddress, RegisterMap, SlaveId};
use amp_units::MotionProfile;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// SDK 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SdkConfig {
    #[serde(default, rename = "drive")]
    pub drives: Vec<DriveConfig>,
}

/// 单台驱动器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DriveConfig {
    pub identifier: String,
    pub slave: SlaveId,
    #[serde(default)]
    pub firmware: Firmware,
    /// 寄存器名（或助记符） → 文档地址
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub registers: BTreeMap<Register, RegisterAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<MotionProfile>,
    #[serde(default)]
    pub mode_switch: ModeSwitchPolicy,
}

impl SdkConfig {
    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: SdkConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载并校验
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading drive configuration");
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// 按标识查找驱动器
    pub fn drive(&self, identifier: &str) -> Option<&DriveConfig> {
        self.drives.iter().find(|d| d.identifier == identifier)
    }

    /// 校验跨驱动器约束与每台驱动器的寄存器映射
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut identifiers = HashSet::new();
        let mut slaves = HashSet::new();
        for drive in &self.drives {
            if drive.identifier.trim().is_empty() {
                return Err(ConfigError::Invalid("drive identifier is empty".into()));
            }
            if !identifiers.insert(drive.identifier.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate drive identifier {:?}",
                    drive.identifier
                )));
            }
            if !slaves.insert(drive.slave) {
                return Err(ConfigError::Invalid(format!(
                    "slave {} is assigned to more than one drive",
                    drive.slave
                )));
            }
            drive.validate()?;
        }
        Ok(())
    }
}

impl DriveConfig {
    /// 使用默认映射表、无运动参数、默认切换策略
    pub fn new(identifier: impl Into<String>, slave: SlaveId) -> Self {
        Self {
            identifier: identifier.into(),
            slave,
            firmware: Firmware::default(),
            registers: BTreeMap::new(),
            profile: None,
            mode_switch: ModeSwitchPolicy::default(),
        }
    }

    /// 固件映射表叠加地址覆盖
    pub fn register_map(&self) -> RegisterMap {
        self.registers
            .iter()
            .fold(self.firmware.register_map(), |map, (&reg, &addr)| {
                map.with_override(reg, addr)
            })
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.register_map()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("drive {:?}: {e}", self.identifier)))
    }

    /// 创建驱动器句柄
    pub fn open_drive<T: RegisterTransport>(&self, transport: T) -> AmpDrive<T> {
        AmpDrive::with_register_map(
            self.identifier.clone(),
            self.slave,
            transport,
            self.register_map(),
        )
    }

    /// 创建带运动参数与切换策略的电机句柄
    pub fn open<T: RegisterTransport>(&self, transport: T) -> Motor<T> {
        let motor = Motor::new(self.open_drive(transport)).with_policy(self.mode_switch);
        match self.profile {
            Some(profile) => motor.with_profile(profile),
            None => motor,
        }
    }
}
