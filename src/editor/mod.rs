//! 曲线编辑器
//!
//! 交互式曲线授权面。内部是纯状态迁移函数（按下 / 移动 / 释放），
//! 不依赖任何 UI 工具包；宿主适配器负责把具体的指针事件接进来，
//! 并消费编辑器产出的控制点、填充轮廓与渐变停靠点。

pub mod curve_editor;

pub use curve_editor::{
    ControlPoint, CurveEditor, DragState, EditorLayout, EditorTarget, GradientStop,
};
