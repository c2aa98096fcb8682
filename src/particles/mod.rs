//! 粒子系统模块
//!
//! 基于累加器的发射门控、粒子老化与属性更新、逐帧缓冲投影。
//! 每帧按固定顺序执行三个阶段：
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    tick(dt_ms)                           │
//! ├─────────────────────────────────────────────────────────┤
//! │  1. Emission gate                                        │
//! │     - freq_counter 累加 dt，达到 frequency 才放行          │
//! │     - 只减去 frequency，余量跨帧保留                        │
//! │     - 发射数量由发射率曲线按发射器归一化年龄采样             │
//! │                                                          │
//! │  2. Update                                               │
//! │     - life += dt，按 t = min(life/max_life, 1) 采样曲线    │
//! │     - 行为插件推进属性（alpha/size/color/位置积分）          │
//! │     - life >= max_life 的粒子移除                          │
//! │                                                          │
//! │  3. Buffer projection                                    │
//! │     - 存活粒子属性整帧重建为扁平 f32 缓冲                   │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 使用示例
//!
//! ```ignore
//! let mut emit_rate = Curve::linear();
//! emit_rate.add_point(0.0, 2.0);
//! let mut ps = ParticleSystem::new(
//!     EmitterParams { frequency: 16.0, max_emitter_life: None },
//!     emit_rate.into_shared(),
//!     Box::new(PlumeEffect::with_defaults()),
//! )?;
//!
//! ps.tick(16.0);
//! renderer.upload(ps.buffers());
//! ```

pub mod effects;
pub mod noise;
pub mod system;

pub use effects::{CoronaEffect, EffectBehavior, PlumeEffect, TwinkleEffect};
pub use noise::NoiseTable;
pub use system::{EmitterParams, GeometryBuffers, Particle, ParticleError, ParticleSystem};
