//! 粒子系统核心
//!
//! 发射门控、粒子老化、几何缓冲投影。具体效果（粒子工厂 + 属性推进）
//! 通过 [`EffectBehavior`] 插件注入，见 [`crate::particles::effects`]。

use crate::curve::SharedCurve;
use crate::particles::effects::EffectBehavior;
use glam::Vec3;
use thiserror::Error;

/// 粒子系统错误
#[derive(Error, Debug)]
pub enum ParticleError {
    /// 发射间隔缺失或非法
    #[error("Emitter frequency must be a positive number of milliseconds, got {0}")]
    InvalidFrequency(f32),
    /// 与“无限发射”的哨兵值冲突
    #[error("maxEmitterLife of exactly 0 is ambiguous with unbounded, leave it unset or use a positive value")]
    ZeroEmitterLife,
    /// 发射器寿命非法
    #[error("maxEmitterLife must be strictly positive, got {0}")]
    InvalidEmitterLife(f32),
}

/// 粒子
///
/// 寿命以毫秒计，范围 `[0, max_life)`，到达 `max_life` 后移除。
#[derive(Debug, Clone)]
pub struct Particle {
    /// 已存活时间（毫秒）
    pub life: f32,
    /// 寿命上限（毫秒）
    pub max_life: f32,
    /// 位置
    pub position: Vec3,
    /// 速度
    pub velocity: Vec3,
    /// 大小
    pub size: f32,
    /// 颜色（RGB）
    pub color: Vec3,
    /// 透明度
    pub alpha: f32,
    /// 旋转（弧度）
    pub rotation: f32,
    /// 逐粒子老化倍率，闪烁类效果使用
    pub t_scalar: f32,
    /// 噪声表游标，按模回绕
    pub noise_index: usize,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            life: 0.0,
            max_life: 1000.0,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            size: 1.0,
            color: Vec3::ONE,
            alpha: 1.0,
            rotation: 0.0,
            t_scalar: 1.0,
            noise_index: 0,
        }
    }
}

/// 发射器构造参数
#[derive(Debug, Clone, Copy)]
pub struct EmitterParams {
    /// 发射门控间隔（毫秒），必须为正
    pub frequency: f32,
    /// 发射期时长（毫秒）。`None` 表示无限发射
    pub max_emitter_life: Option<f32>,
}

/// 渲染协作方消费的扁平属性缓冲
///
/// 每帧整体重建而非增量更新。粒子数量有限，交互性优先于峰值吞吐。
#[derive(Debug, Clone, Default)]
pub struct GeometryBuffers {
    /// 位置，每粒子 3 个分量
    pub positions: Vec<f32>,
    /// 颜色 + 透明度，每粒子 4 个分量
    pub colors: Vec<f32>,
    /// 大小，每粒子 1 个分量
    pub sizes: Vec<f32>,
    /// 旋转角，每粒子 1 个分量
    pub angles: Vec<f32>,
}

/// 粒子系统
///
/// 每帧 [`tick`](Self::tick) 依次执行发射门控、粒子更新、缓冲投影。
pub struct ParticleSystem {
    particles: Vec<Particle>,
    /// 发射门控间隔（毫秒）
    frequency: f32,
    /// 发射累加器，只减不清零，余量跨帧保留
    freq_counter: f32,
    /// 发射器年龄（毫秒）
    emitter_life: f32,
    max_emitter_life: Option<f32>,
    /// 发射率曲线，按发射器归一化年龄采样出每次门控的发射数量
    emit_rate: SharedCurve<f32>,
    behavior: Box<dyn EffectBehavior>,
    buffers: GeometryBuffers,
}

impl ParticleSystem {
    /// 构造粒子系统，参数非法时立即失败
    pub fn new(
        params: EmitterParams,
        emit_rate: SharedCurve<f32>,
        behavior: Box<dyn EffectBehavior>,
    ) -> Result<Self, ParticleError> {
        if !params.frequency.is_finite() || params.frequency <= 0.0 {
            return Err(ParticleError::InvalidFrequency(params.frequency));
        }
        if let Some(max) = params.max_emitter_life {
            if max == 0.0 {
                return Err(ParticleError::ZeroEmitterLife);
            }
            if !max.is_finite() || max < 0.0 {
                return Err(ParticleError::InvalidEmitterLife(max));
            }
        }

        tracing::debug!(
            frequency = params.frequency,
            max_emitter_life = ?params.max_emitter_life,
            "particle system created"
        );

        Ok(Self {
            particles: Vec::new(),
            frequency: params.frequency,
            freq_counter: 0.0,
            emitter_life: 0.0,
            max_emitter_life: params.max_emitter_life,
            emit_rate,
            behavior,
            buffers: GeometryBuffers::default(),
        })
    }

    /// 推进一帧
    ///
    /// `dt_ms` 为宿主时钟给出的本帧耗时（毫秒），允许不规则帧长。
    pub fn tick(&mut self, dt_ms: f32) {
        self.add_particles_gate(dt_ms);
        self.update_particles(dt_ms);
        self.update_geometry();
        self.emitter_life += dt_ms;
    }

    /// 发射门控
    ///
    /// 累加器达到 `frequency` 才放行，且只减去 `frequency` 本身，
    /// 余量保留，保证不规则帧长下的发射总量正确。
    fn add_particles_gate(&mut self, dt_ms: f32) {
        self.freq_counter += dt_ms;
        if self.freq_counter < self.frequency {
            return;
        }

        self.freq_counter -= self.frequency;

        if let Some(max) = self.max_emitter_life {
            if self.emitter_life > max {
                // 发射期结束，系统进入收尾阶段，累加器照常消耗
                return;
            }
        }

        let count = self.emit_count();
        for _ in 0..count {
            self.add_particle();
        }
    }

    /// 本次门控的发射数量
    ///
    /// 有界发射器按归一化年龄采样发射率曲线；无界发射器固定采样 0，
    /// 视作稳态速率。小数速率向上取整。
    fn emit_count(&self) -> usize {
        let t = match self.max_emitter_life {
            Some(max) => (self.emitter_life / max).min(1.0),
            None => 0.0,
        };

        let rate = match self.emit_rate.borrow().get(t) {
            Ok(rate) => rate,
            Err(err) => {
                tracing::warn!(%err, "emission rate curve sample failed, emitting nothing");
                return 0;
            }
        };

        rate.max(0.0).ceil() as usize
    }

    /// 手动发射一个粒子
    pub fn add_particle(&mut self) {
        let particle = self.behavior.make_particle();
        self.particles.push(particle);
    }

    /// 通过工厂预填充粒子池，固定粒子集的效果（如闪烁）使用
    pub fn populate(&mut self, count: usize) {
        for _ in 0..count {
            self.add_particle();
        }
    }

    /// 更新全部存活粒子
    ///
    /// 老化在行为插件之前执行；移除在更新之后执行，寿命刚好耗尽的
    /// 粒子还能拿到一次 `t = 1` 的采样。
    fn update_particles(&mut self, dt_ms: f32) {
        for particle in &mut self.particles {
            particle.life += dt_ms;
            let t = (particle.life / particle.max_life).min(1.0);
            self.behavior.advance(particle, t, dt_ms);
        }

        self.particles.retain(|p| p.life < p.max_life);
    }

    /// 缓冲投影：把存活粒子的属性整帧重建为扁平数组
    fn update_geometry(&mut self) {
        let buffers = &mut self.buffers;
        buffers.positions.clear();
        buffers.colors.clear();
        buffers.sizes.clear();
        buffers.angles.clear();

        for p in &self.particles {
            buffers
                .positions
                .extend_from_slice(&[p.position.x, p.position.y, p.position.z]);
            buffers
                .colors
                .extend_from_slice(&[p.color.x, p.color.y, p.color.z, p.alpha]);
            buffers.sizes.push(p.size);
            buffers.angles.push(p.rotation);
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn buffers(&self) -> &GeometryBuffers {
        &self.buffers
    }

    pub fn emitter_life(&self) -> f32 {
        self.emitter_life
    }

    pub fn emit_rate_curve(&self) -> &SharedCurve<f32> {
        &self.emit_rate
    }
}
