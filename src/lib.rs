//! # Particle Engine
//!
//! A curve-driven particle effects library built with Rust.
//!
//! ## Features
//!
//! - **Keyframe Curves**: Linear interpolation tracks over normalized time, with
//!   an allocation-free variant for compound values
//! - **Particle Systems**: Accumulator-gated emission, per-particle life tracking
//!   and flat geometry buffers ready for GPU upload
//! - **Effect Behaviors**: Composable smoke plume / corona / twinkle behaviors
//!   driven entirely by shared curves
//! - **Curve Editor**: A UI-toolkit-independent state machine for interactive
//!   curve editing, live against a running system
//! - **Presets**: TOML/JSON effect configuration with validation
//!
//! ## Architecture Design
//!
//! Curves are the single source of truth: effects and editors both hold
//! `Rc<RefCell<...>>` handles to the same curve, so an editor drag is visible
//! to the simulation on the very next tick without any synchronization layer.
//!
//! ### Example
//!
//! ```ignore
//! use particle_engine::config::EffectConfig;
//! use particle_engine::particles::{ParticleSystem, PlumeEffect};
//!
//! let config = EffectConfig::default();
//! let (params, curves) = config.build()?;
//! let effect = PlumeEffect::with_defaults();
//! let mut system = ParticleSystem::new(params, curves.emit_rate, Box::new(effect))?;
//! system.tick(16.0);
//! ```
//!
//! ## Modules
//!
//! - [`curve`]: Keyframe interpolation tracks
//! - [`particles`]: Particle systems and effect behaviors
//! - [`editor`]: Interactive curve editing state machine
//! - [`config`]: Effect preset loading and validation

/// Keyframe curves with boxed interpolation strategies
pub mod curve;
/// Particle systems, effect behaviors and the shared noise table
pub mod particles;
/// UI-toolkit-independent curve editor state machine
pub mod editor;
/// Effect preset configuration (TOML/JSON)
pub mod config;
