//! 效果行为插件
//!
//! 每种效果只在两件事上不同：怎么造一个粒子、怎么逐帧推进它。
//! 这两个能力收拢进 [`EffectBehavior`]，由 [`ParticleSystem`]
//! 组合使用，效果之间不存在继承关系。
//!
//! [`ParticleSystem`]: crate::particles::system::ParticleSystem

use crate::curve::{Curve, CurveOut, SharedCurve, SharedCurveOut};
use crate::particles::noise::NoiseTable;
use crate::particles::system::Particle;
use glam::Vec3;
use std::f32::consts::TAU;

/// 效果行为：粒子工厂 + 逐帧推进
pub trait EffectBehavior {
    /// 构造一个新粒子
    fn make_particle(&mut self) -> Particle;

    /// 推进粒子属性
    ///
    /// `t` 为引擎算好的归一化年龄 `min(life / max_life, 1)`，
    /// `dt_ms` 为本帧耗时。老化本身由引擎完成。
    fn advance(&mut self, particle: &mut Particle, t: f32, dt_ms: f32);
}

/// 构造标量曲线
fn scalar_curve(points: &[(f32, f32)]) -> SharedCurve<f32> {
    let mut curve = Curve::linear();
    for &(t, v) in points {
        curve.add_point(t, v);
    }
    curve.into_shared()
}

/// 构造颜色曲线（无分配变体）
fn color_curve(points: &[(f32, Vec3)]) -> SharedCurveOut<Vec3> {
    let mut curve = CurveOut::new(Box::new(|f, a: &Vec3, b: &Vec3, out: &mut Vec3| {
        *out = a.lerp(*b, f);
    }));
    for &(t, v) in points {
        curve.add_point(t, v);
    }
    curve.into_shared()
}

// ============================================================================
// 烟柱
// ============================================================================

/// 烟柱效果：径向漂移，速度随年龄经曲线衰减
pub struct PlumeEffect {
    alpha: SharedCurve<f32>,
    size: SharedCurve<f32>,
    velocity: SharedCurve<f32>,
    color: SharedCurveOut<Vec3>,
    max_particle_life: f32,
    color_scratch: Vec3,
}

impl PlumeEffect {
    const V_DAMP_FACTOR: f32 = 0.001;

    pub fn new(
        alpha: SharedCurve<f32>,
        size: SharedCurve<f32>,
        velocity: SharedCurve<f32>,
        color: SharedCurveOut<Vec3>,
        max_particle_life: f32,
    ) -> Self {
        Self {
            alpha,
            size,
            velocity,
            color,
            max_particle_life,
            color_scratch: Vec3::ZERO,
        }
    }

    /// 默认预设
    pub fn with_defaults() -> Self {
        Self::new(
            scalar_curve(&[(0.0, 0.7), (1.0, 0.0)]),
            scalar_curve(&[(0.0, 3.0), (1.0, 9.43)]),
            scalar_curve(&[(0.0, 4.3), (0.07, 1.86), (0.21, 0.71), (1.0, 0.0)]),
            color_curve(&[
                (0.0, Vec3::new(0.46, 0.46, 0.46)),
                (1.0, Vec3::new(0.31, 0.31, 0.31)),
            ]),
            400.0,
        )
    }

    /// 稳态发射率
    pub fn default_emit_rate() -> SharedCurve<f32> {
        scalar_curve(&[(0.0, 1.0)])
    }

    pub fn alpha_curve(&self) -> &SharedCurve<f32> {
        &self.alpha
    }

    pub fn size_curve(&self) -> &SharedCurve<f32> {
        &self.size
    }

    pub fn velocity_curve(&self) -> &SharedCurve<f32> {
        &self.velocity
    }

    pub fn color_curve(&self) -> &SharedCurveOut<Vec3> {
        &self.color
    }
}

impl EffectBehavior for PlumeEffect {
    fn make_particle(&mut self) -> Particle {
        let rotation = rand::random::<f32>() * TAU;
        let speed = rand::random::<f32>() + 1.0;

        Particle {
            max_life: self.max_particle_life,
            alpha: self.alpha.borrow().get(0.0).unwrap_or(1.0),
            rotation,
            velocity: Vec3::new(rotation.cos(), 0.0, rotation.sin()) * speed,
            ..Particle::default()
        }
    }

    fn advance(&mut self, particle: &mut Particle, t: f32, dt_ms: f32) {
        if let Ok(speed) = self.velocity.borrow().get(t) {
            particle.position += particle.velocity * (speed * Self::V_DAMP_FACTOR * dt_ms);
        }
        if let Ok(alpha) = self.alpha.borrow().get(t) {
            particle.alpha = alpha;
        }
        if let Ok(size) = self.size.borrow().get(t) {
            particle.size = size;
        }
        if let Ok(color) = self.color.borrow().get_result(t, &mut self.color_scratch) {
            particle.color = *color;
        }
    }
}

// ============================================================================
// 日冕
// ============================================================================

/// 日冕效果：有界发射器，发射率随年龄衰减到零后进入收尾
pub struct CoronaEffect {
    alpha: SharedCurve<f32>,
    size: SharedCurve<f32>,
    velocity: SharedCurve<f32>,
    color: SharedCurveOut<Vec3>,
    max_particle_life: f32,
    color_scratch: Vec3,
}

impl CoronaEffect {
    const V_DAMP_FACTOR: f32 = 0.001;

    pub fn new(
        alpha: SharedCurve<f32>,
        size: SharedCurve<f32>,
        velocity: SharedCurve<f32>,
        color: SharedCurveOut<Vec3>,
        max_particle_life: f32,
    ) -> Self {
        Self {
            alpha,
            size,
            velocity,
            color,
            max_particle_life,
            color_scratch: Vec3::ZERO,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            scalar_curve(&[(0.0, 0.9), (1.0, 0.0)]),
            scalar_curve(&[(0.0, 9.0), (1.0, 10.0)]),
            scalar_curve(&[(0.0, 2.8), (1.0, 0.0)]),
            color_curve(&[(0.0, Vec3::new(1.0, 0.0, 0.0)), (1.0, Vec3::new(0.0, 1.0, 0.0))]),
            400.0,
        )
    }

    /// 衰减发射率：开场密集，随后稀疏，收尾归零
    pub fn default_emit_rate() -> SharedCurve<f32> {
        scalar_curve(&[(0.0, 10.0), (0.1, 2.0), (1.0, 0.0)])
    }

    pub fn alpha_curve(&self) -> &SharedCurve<f32> {
        &self.alpha
    }

    pub fn color_curve(&self) -> &SharedCurveOut<Vec3> {
        &self.color
    }
}

impl EffectBehavior for CoronaEffect {
    fn make_particle(&mut self) -> Particle {
        let rotation = rand::random::<f32>() * TAU;

        Particle {
            max_life: self.max_particle_life,
            alpha: self.alpha.borrow().get(0.0).unwrap_or(1.0),
            rotation,
            velocity: Vec3::new(rotation.cos(), 0.0, rotation.sin()),
            ..Particle::default()
        }
    }

    fn advance(&mut self, particle: &mut Particle, t: f32, dt_ms: f32) {
        if let Ok(speed) = self.velocity.borrow().get(t) {
            particle.position += particle.velocity * (speed * Self::V_DAMP_FACTOR * dt_ms);
        }
        if let Ok(alpha) = self.alpha.borrow().get(t) {
            particle.alpha = alpha;
        }
        if let Ok(size) = self.size.borrow().get(t) {
            particle.size = size;
        }
        if let Ok(color) = self.color.borrow().get_result(t, &mut self.color_scratch) {
            particle.color = *color;
        }
    }
}

// ============================================================================
// 星光闪烁
// ============================================================================

/// 闪烁效果：固定粒子池，粒子在休眠与活跃之间循环而不销毁
///
/// 每个粒子带独立的老化倍率 `t_scalar` 和噪声游标，
/// 亮度在 alpha 曲线之上叠加噪声表抖动。
pub struct TwinkleEffect {
    alpha: SharedCurve<f32>,
    color: SharedCurveOut<Vec3>,
    noise: NoiseTable,
    max_particle_life: f32,
    color_scratch: Vec3,
}

/// 休眠哨兵：引擎的 `life += dt` 对负无穷不产生影响，
/// 休眠粒子也永远不会触发移除
const DORMANT: f32 = f32::NEG_INFINITY;

impl TwinkleEffect {
    /// 每帧休眠粒子的激活概率
    const WAKE_CHANCE: f32 = 0.05;

    pub fn new(
        alpha: SharedCurve<f32>,
        color: SharedCurveOut<Vec3>,
        noise: NoiseTable,
        max_particle_life: f32,
    ) -> Self {
        Self {
            alpha,
            color,
            noise,
            max_particle_life,
            color_scratch: Vec3::ZERO,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(
            scalar_curve(&[(0.0, 0.0), (0.1, 1.0), (1.0, 0.0)]),
            color_curve(&[(0.0, Vec3::new(1.0, 1.0, 0.5)), (1.0, Vec3::new(1.0, 0.5, 0.5))]),
            NoiseTable::new(256),
            2000.0,
        )
    }

    /// 固定池不经过发射门控，速率恒为零
    pub fn default_emit_rate() -> SharedCurve<f32> {
        scalar_curve(&[(0.0, 0.0)])
    }
}

impl EffectBehavior for TwinkleEffect {
    fn make_particle(&mut self) -> Particle {
        Particle {
            max_life: self.max_particle_life,
            life: DORMANT,
            size: 30.0,
            alpha: 0.0,
            t_scalar: rand::random::<f32>() + 0.5, // 0.5-1.5
            noise_index: rand::random::<u32>() as usize,
            ..Particle::default()
        }
    }

    fn advance(&mut self, particle: &mut Particle, _t: f32, dt_ms: f32) {
        if particle.life == DORMANT {
            if rand::random::<f32>() < Self::WAKE_CHANCE {
                particle.life = 0.0;
            }
            particle.alpha = 0.0;
            return;
        }

        // 引擎已加过一次 dt，这里补上逐粒子倍率的差额
        particle.life += dt_ms * (particle.t_scalar - 1.0);

        if particle.life >= particle.max_life {
            // 动画结束，回到休眠而不是销毁
            particle.life = DORMANT;
            particle.alpha = 0.0;
            return;
        }

        let t = (particle.life / particle.max_life).clamp(0.0, 1.0);

        particle.noise_index = particle.noise_index.wrapping_add(1);
        let flicker = 0.5 + 0.5 * self.noise.sample(particle.noise_index);

        if let Ok(alpha) = self.alpha.borrow().get(t) {
            particle.alpha = alpha * flicker;
        }
        if let Ok(color) = self.color.borrow().get_result(t, &mut self.color_scratch) {
            particle.color = *color;
        }
    }
}
