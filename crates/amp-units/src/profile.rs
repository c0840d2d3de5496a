//! 运动参数

use crate::ConversionError;

/// 运动参数（减速比、每转步数、可选轮毂直径）
///
/// 构造时校验：`gear_multiplier > 0`、`steps_per_rev > 0`，
/// 轮毂直径若存在必须是有限正数。反序列化同样经过校验，
/// 因此内存中不存在非法的 `MotionProfile`。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawMotionProfile"))]
pub struct MotionProfile {
    gear_multiplier: u32,
    steps_per_rev: u32,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "hub_diameter_mm", skip_serializing_if = "Option::is_none")
    )]
    hub_diameter: Option<f64>,
}

impl MotionProfile {
    /// 创建不带轮毂直径的运动参数（仅支持旋转换算）
    pub fn new(gear_multiplier: u32, steps_per_rev: u32) -> Result<Self, ConversionError> {
        if gear_multiplier == 0 {
            return Err(ConversionError::InvalidProfile(
                "gear_multiplier must be positive".into(),
            ));
        }
        if steps_per_rev == 0 {
            return Err(ConversionError::InvalidProfile(
                "steps_per_rev must be positive".into(),
            ));
        }
        Ok(Self {
            gear_multiplier,
            steps_per_rev,
            hub_diameter: None,
        })
    }

    /// 附加轮毂直径（毫米），启用直线换算
    pub fn with_hub_diameter(mut self, diameter_mm: f64) -> Result<Self, ConversionError> {
        if !diameter_mm.is_finite() || diameter_mm <= 0.0 {
            return Err(ConversionError::InvalidProfile(format!(
                "hub diameter must be a positive finite number of millimeters, got {diameter_mm}"
            )));
        }
        self.hub_diameter = Some(diameter_mm);
        Ok(self)
    }

    #[inline]
    pub fn gear_multiplier(&self) -> u32 {
        self.gear_multiplier
    }

    #[inline]
    pub fn steps_per_rev(&self) -> u32 {
        self.steps_per_rev
    }

    /// 轮毂直径（毫米）
    #[inline]
    pub fn hub_diameter(&self) -> Option<f64> {
        self.hub_diameter
    }

    /// 输出轴每转脉冲数 `s * g`
    #[inline]
    pub(crate) fn pulses_per_rev(&self) -> f64 {
        self.steps_per_rev as f64 * self.gear_multiplier as f64
    }

    #[inline]
    pub(crate) fn gear(&self) -> f64 {
        self.gear_multiplier as f64
    }

    pub(crate) fn require_hub(&self) -> Result<f64, ConversionError> {
        self.hub_diameter.ok_or(ConversionError::MissingHubDiameter)
    }
}

/// 反序列化中间表示（未校验）
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMotionProfile {
    gear_multiplier: u32,
    steps_per_rev: u32,
    #[serde(default)]
    hub_diameter_mm: Option<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<RawMotionProfile> for MotionProfile {
    type Error = ConversionError;

    fn try_from(raw: RawMotionProfile) -> Result<Self, Self::Error> {
        let profile = MotionProfile::new(raw.gear_multiplier, raw.steps_per_rev)?;
        match raw.hub_diameter_mm {
            Some(d) => profile.with_hub_diameter(d),
            None => Ok(profile),
        }
    }
}
