use glam::{Vec2, Vec3};
use particle_engine::config::{ConfigError, EffectConfig};
use particle_engine::editor::{CurveEditor, DragState, EditorLayout, EditorTarget};
use particle_engine::particles::{
    CoronaEffect, EmitterParams, ParticleSystem, PlumeEffect, TwinkleEffect,
};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn test_config_to_running_system() -> anyhow::Result<()> {
    init_tracing();

    // 默认预设 → 曲线 → 粒子系统
    let config = EffectConfig::default();
    let (params, curves) = config.build()?;

    let effect = PlumeEffect::new(
        curves.alpha,
        curves.size,
        curves.velocity,
        curves.color,
        config.max_particle_life,
    );
    let mut system = ParticleSystem::new(params, curves.emit_rate, Box::new(effect))?;

    // frequency 128ms：一帧 130ms 放行一次，发射率 1 → 1 个粒子
    system.tick(130.0);
    assert_eq!(system.particle_count(), 1);

    let buffers = system.buffers();
    assert_eq!(buffers.positions.len(), 3);
    assert_eq!(buffers.colors.len(), 4);
    assert_eq!(buffers.sizes.len(), 1);
    assert_eq!(buffers.angles.len(), 1);
    Ok(())
}

#[test]
fn test_editor_edit_is_visible_to_simulation() {
    // 编辑器与效果行为共享同一条曲线，拖拽后下一帧即生效
    let config = EffectConfig::default();
    let (params, curves) = config.build().unwrap();
    let size_curve = curves.size.clone();

    let effect = PlumeEffect::new(
        curves.alpha,
        curves.size,
        curves.velocity,
        curves.color,
        config.max_particle_life,
    );
    let mut system = ParticleSystem::new(params, curves.emit_rate, Box::new(effect)).unwrap();

    let layout = EditorLayout {
        left: 0.0,
        top: 0.0,
        width: 100.0,
        height: 100.0,
        max_value: 10.0,
    };
    let mut editor = CurveEditor::new(layout);
    editor.initialize(EditorTarget::Scalar(size_curve.clone()), "size");

    // size 曲线起点 (0, 3.0) → 屏幕 (0, 70)；拖到 y=20 → 值 8.0
    editor.on_press(Vec2::new(0.0, 70.0));
    assert_eq!(editor.drag_state(), DragState::Dragging(0));
    editor.on_move(Vec2::new(0.0, 20.0));
    editor.on_release();

    assert!((size_curve.borrow().get(0.0).unwrap() - 8.0).abs() < 1e-4);

    // 发射一个粒子并推进：大小按编辑后的曲线采样
    system.tick(130.0);
    assert_eq!(system.particle_count(), 1);
    let t = 130.0 / 400.0;
    let expected = 8.0 + t * (9.43 - 8.0);
    assert!((system.particles()[0].size - expected).abs() < 1e-4);
}

#[test]
fn test_editor_insert_updates_gradient_stops() {
    let effect = CoronaEffect::with_defaults();
    let color_curve = effect.color_curve().clone();

    let layout = EditorLayout {
        left: 0.0,
        top: 0.0,
        width: 200.0,
        height: 40.0,
        max_value: 1.0,
    };
    let mut editor = CurveEditor::new(layout);
    editor.initialize(EditorTarget::Color(color_curve.clone()), "color");
    editor.set_current_color(Vec3::new(0.0, 0.0, 1.0));

    // 空白处按下：插入关键帧，渐变停靠点同步重建
    editor.on_press(Vec2::new(100.0, 0.0));
    editor.on_release();

    assert_eq!(color_curve.borrow().len(), 3);
    let stops = editor.gradient_stops();
    assert_eq!(stops.len(), 3);
    assert!((stops[1].offset - 50.0).abs() < 1e-4);
    assert_eq!(stops[1].color, Vec3::new(0.0, 0.0, 1.0));
}

#[test]
fn test_bounded_emitter_winds_down_and_drains() {
    let effect = CoronaEffect::with_defaults();
    let params = EmitterParams {
        frequency: 25.0,
        max_emitter_life: Some(100.0),
    };
    let mut system =
        ParticleSystem::new(params, CoronaEffect::default_emit_rate(), Box::new(effect)).unwrap();

    for _ in 0..4 {
        system.tick(25.0);
    }
    let peak = system.particle_count();
    assert!(peak > 0);

    // 发射期结束后不再新增，存量按寿命自然耗尽
    for _ in 0..20 {
        system.tick(25.0);
        assert!(system.particle_count() <= peak);
    }
    assert_eq!(system.particle_count(), 0);
}

#[test]
fn test_twinkle_pool_stays_fixed_size() {
    let effect = TwinkleEffect::with_defaults();
    let params = EmitterParams {
        frequency: 1000.0,
        max_emitter_life: None,
    };
    let mut system =
        ParticleSystem::new(params, TwinkleEffect::default_emit_rate(), Box::new(effect)).unwrap();
    system.populate(50);

    for _ in 0..100 {
        system.tick(16.0);
        // 休眠粒子永不被移除，池大小恒定
        assert_eq!(system.particle_count(), 50);
    }
}

#[test]
fn test_invalid_preset_is_rejected_before_engine() {
    let bad = "name = \"x\"\nfrequency = ";
    assert!(matches!(
        EffectConfig::from_toml_str(bad),
        Err(ConfigError::ParseError(_))
    ));

    let mut config = EffectConfig::default();
    config.max_emitter_life = Some(-5.0);
    assert!(matches!(
        config.build(),
        Err(ConfigError::ValidationError(_))
    ));
}
