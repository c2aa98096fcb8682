//! 效果预设配置
//!
//! 预设是数据：每种效果的发射参数和各条曲线的关键帧都可以从
//! TOML/JSON 文件读入，校验后构造成引擎可直接使用的曲线与参数。

use crate::curve::{Curve, CurveOut, SharedCurve, SharedCurveOut};
use crate::particles::EmitterParams;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// 预设配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 文件读取错误
    #[error("Config file error: {0}")]
    FileError(#[from] std::io::Error),
    /// 解析错误
    #[error("Config parse error: {0}")]
    ParseError(String),
    /// 验证错误
    #[error("Config validation error: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// 标量曲线关键帧
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CurvePoint {
    pub t: f32,
    pub value: f32,
}

/// 颜色曲线关键帧
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ColorPoint {
    pub t: f32,
    pub rgb: [f32; 3],
}

/// 效果预设
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectConfig {
    /// 效果名，用于日志与编辑器标签
    pub name: String,
    /// 发射门控间隔（毫秒）
    pub frequency: f32,
    /// 发射期时长（毫秒），缺省为无限发射
    #[serde(default)]
    pub max_emitter_life: Option<f32>,
    /// 粒子寿命（毫秒）
    pub max_particle_life: f32,
    /// 发射率曲线
    pub emit_rate: Vec<CurvePoint>,
    /// 透明度曲线
    pub alpha: Vec<CurvePoint>,
    /// 大小曲线
    pub size: Vec<CurvePoint>,
    /// 速度曲线
    pub velocity: Vec<CurvePoint>,
    /// 颜色曲线
    pub color: Vec<ColorPoint>,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            name: "plume".to_string(),
            frequency: 128.0,
            max_emitter_life: None,
            max_particle_life: 400.0,
            emit_rate: vec![CurvePoint { t: 0.0, value: 1.0 }],
            alpha: vec![
                CurvePoint { t: 0.0, value: 0.7 },
                CurvePoint { t: 1.0, value: 0.0 },
            ],
            size: vec![
                CurvePoint { t: 0.0, value: 3.0 },
                CurvePoint { t: 1.0, value: 9.43 },
            ],
            velocity: vec![
                CurvePoint { t: 0.0, value: 4.3 },
                CurvePoint { t: 0.07, value: 1.86 },
                CurvePoint { t: 0.21, value: 0.71 },
                CurvePoint { t: 1.0, value: 0.0 },
            ],
            color: vec![
                ColorPoint {
                    t: 0.0,
                    rgb: [0.46, 0.46, 0.46],
                },
                ColorPoint {
                    t: 1.0,
                    rgb: [0.31, 0.31, 0.31],
                },
            ],
        }
    }
}

/// 预设构造产物：可直接喂给效果行为的共享曲线
pub struct EffectCurves {
    pub emit_rate: SharedCurve<f32>,
    pub alpha: SharedCurve<f32>,
    pub size: SharedCurve<f32>,
    pub velocity: SharedCurve<f32>,
    pub color: SharedCurveOut<Vec3>,
}

impl EffectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 TOML 文本解析并校验
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文本解析并校验
    pub fn from_json_str(content: &str) -> ConfigResult<Self> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 按扩展名从文件加载
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(ConfigError::ParseError(format!(
                "Unsupported config extension: {:?}",
                other
            ))),
        }
    }

    /// 校验，与引擎构造器的快速失败规则保持一致
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.frequency.is_finite() || self.frequency <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "frequency must be positive, got {}",
                self.frequency
            )));
        }
        if let Some(max) = self.max_emitter_life {
            if !max.is_finite() || max <= 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "max_emitter_life must be strictly positive or unset, got {}",
                    max
                )));
            }
        }
        if !self.max_particle_life.is_finite() || self.max_particle_life <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "max_particle_life must be positive, got {}",
                self.max_particle_life
            )));
        }

        check_track("emit_rate", self.emit_rate.iter().map(|p| p.t))?;
        check_track("alpha", self.alpha.iter().map(|p| p.t))?;
        check_track("size", self.size.iter().map(|p| p.t))?;
        check_track("velocity", self.velocity.iter().map(|p| p.t))?;
        check_track("color", self.color.iter().map(|p| p.t))?;

        Ok(())
    }

    /// 构造发射参数与共享曲线
    pub fn build(&self) -> ConfigResult<(EmitterParams, EffectCurves)> {
        self.validate()?;

        let params = EmitterParams {
            frequency: self.frequency,
            max_emitter_life: self.max_emitter_life,
        };

        let mut emit_rate = Curve::linear();
        for p in &self.emit_rate {
            emit_rate.add_point(p.t, p.value);
        }
        let mut alpha = Curve::linear();
        for p in &self.alpha {
            alpha.add_point(p.t, p.value);
        }
        let mut size = Curve::linear();
        for p in &self.size {
            size.add_point(p.t, p.value);
        }
        let mut velocity = Curve::linear();
        for p in &self.velocity {
            velocity.add_point(p.t, p.value);
        }
        let mut color = CurveOut::new(Box::new(|f, a: &Vec3, b: &Vec3, out: &mut Vec3| {
            *out = a.lerp(*b, f);
        }));
        for p in &self.color {
            color.add_point(p.t, Vec3::from_array(p.rgb));
        }

        tracing::debug!(name = %self.name, "effect preset built");

        Ok((
            params,
            EffectCurves {
                emit_rate: emit_rate.into_shared(),
                alpha: alpha.into_shared(),
                size: size.into_shared(),
                velocity: velocity.into_shared(),
                color: color.into_shared(),
            },
        ))
    }
}

/// 关键帧轨道校验：非空、t 落在 [0,1]、严格升序
fn check_track(name: &str, ts: impl Iterator<Item = f32>) -> ConfigResult<()> {
    let mut prev: Option<f32> = None;
    let mut count = 0;
    for t in ts {
        count += 1;
        if !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::ValidationError(format!(
                "{} curve t {} out of [0, 1]",
                name, t
            )));
        }
        if let Some(prev) = prev {
            if t <= prev {
                return Err(ConfigError::ValidationError(format!(
                    "{} curve t values must be strictly ascending, {} follows {}",
                    name, t, prev
                )));
            }
        }
        prev = Some(t);
    }
    if count == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{} curve needs at least one point",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLUME_TOML: &str = r#"
name = "plume"
frequency = 128.0
max_particle_life = 400.0

[[emit_rate]]
t = 0.0
value = 1.0

[[alpha]]
t = 0.0
value = 0.7

[[alpha]]
t = 1.0
value = 0.0

[[size]]
t = 0.0
value = 3.0

[[size]]
t = 1.0
value = 9.43

[[velocity]]
t = 0.0
value = 4.3

[[velocity]]
t = 1.0
value = 0.0

[[color]]
t = 0.0
rgb = [0.46, 0.46, 0.46]

[[color]]
t = 1.0
rgb = [0.31, 0.31, 0.31]
"#;

    #[test]
    fn test_toml_round_trip() {
        let config = EffectConfig::from_toml_str(PLUME_TOML).unwrap();
        assert_eq!(config.name, "plume");
        assert_eq!(config.frequency, 128.0);
        assert_eq!(config.max_emitter_life, None);
        assert_eq!(config.alpha.len(), 2);
    }

    #[test]
    fn test_json_loader() {
        let config = EffectConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = EffectConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed.name, config.name);
        assert_eq!(parsed.velocity.len(), config.velocity.len());
    }

    #[test]
    fn test_zero_frequency_rejected() {
        let mut config = EffectConfig::default();
        config.frequency = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_zero_emitter_life_rejected() {
        let mut config = EffectConfig::default();
        config.max_emitter_life = Some(0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_unsorted_track_rejected() {
        let mut config = EffectConfig::default();
        config.alpha = vec![
            CurvePoint { t: 0.5, value: 1.0 },
            CurvePoint { t: 0.2, value: 0.0 },
        ];
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_empty_track_rejected() {
        let mut config = EffectConfig::default();
        config.emit_rate.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_build_produces_working_curves() {
        let config = EffectConfig::from_toml_str(PLUME_TOML).unwrap();
        let (params, curves) = config.build().unwrap();

        assert_eq!(params.frequency, 128.0);
        assert!((curves.alpha.borrow().get(0.0).unwrap() - 0.7).abs() < 1e-6);
        assert!((curves.size.borrow().get(1.0).unwrap() - 9.43).abs() < 1e-6);

        let mut out = Vec3::ZERO;
        let color_curve = curves.color.borrow();
        let mid = *color_curve.get_result(0.5, &mut out).unwrap();
        assert!((mid.x - 0.385).abs() < 1e-4);
    }
}
