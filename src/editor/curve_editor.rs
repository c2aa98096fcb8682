//! 曲线编辑器状态机
//!
//! 把 2D 交互面（横向 `[0,1]`，纵向 `[0,max_value]`，颜色曲线为
//! 扁平渐变条）映射到曲线关键帧。指针迁移是纯函数：
//! `on_press` / `on_move` / `on_release` / `on_leave`。
//!
//! 不变量：控制点列表与背后的关键帧列表长度相等、下标对齐；
//! 关键帧按 `t` 升序；首尾关键帧的 `t` 不可改变；同一时刻最多
//! 抓取一个控制点。

use crate::curve::{SharedCurve, SharedCurveOut};
use glam::{Vec2, Vec3};

/// 命中判定半径（像素）
const HIT_RADIUS: f32 = 10.0;

/// 相邻控制点的最小横向间隔（像素）
///
/// 拖拽不允许越过邻居导致重排序，重排序只能删除后重插。
pub const MIN_POINT_GAP: f32 = 8.0;

/// 控制点：关键帧在屏幕上的可拖拽表示
#[derive(Debug, Clone, Copy)]
pub struct ControlPoint {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    /// 横向锁定（首尾关键帧）
    pub lock_x: bool,
    /// 纵向锁定（颜色曲线等不可纵向插值的类型）
    pub lock_y: bool,
}

/// 编辑面布局与纵向值域
#[derive(Debug, Clone, Copy)]
pub struct EditorLayout {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub max_value: f32,
}

/// 编辑目标：标量曲线或颜色曲线
///
/// 编辑器持有活曲线的共享句柄，是其唯一写者；模拟循环按单线程
/// 轮转顺序在两次编辑之间读取。
pub enum EditorTarget {
    Scalar(SharedCurve<f32>),
    Color(SharedCurveOut<Vec3>),
}

/// 指针交互状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    /// 抓取中的控制点下标
    Dragging(usize),
}

/// 渐变停靠点（颜色曲线专用）
#[derive(Debug, Clone, Copy)]
pub struct GradientStop {
    /// 百分比偏移 `t * 100`
    pub offset: f32,
    pub color: Vec3,
}

/// 曲线编辑器
pub struct CurveEditor {
    layout: EditorLayout,
    target: Option<EditorTarget>,
    label: String,
    control_points: Vec<ControlPoint>,
    drag: DragState,
    next_id: u32,
    outline: Vec<Vec2>,
    gradient_stops: Vec<GradientStop>,
    /// 颜色曲线新增关键帧取用的当前选色
    current_color: Vec3,
}

impl CurveEditor {
    pub fn new(layout: EditorLayout) -> Self {
        Self {
            layout,
            target: None,
            label: String::new(),
            control_points: Vec::new(),
            drag: DragState::Idle,
            next_id: 0,
            outline: Vec::new(),
            gradient_stops: Vec::new(),
            current_color: Vec3::ONE,
        }
    }

    /// 绑定活曲线与显示标签，按关键帧重建控制点
    pub fn initialize(&mut self, target: EditorTarget, label: impl Into<String>) {
        self.label = label.into();

        let mut next_id = self.next_id;
        let mut control_points = Vec::new();

        match &target {
            EditorTarget::Scalar(curve) => {
                let curve = curve.borrow();
                let len = curve.len();
                for (i, kf) in curve.points().iter().enumerate() {
                    control_points.push(ControlPoint {
                        id: next_id,
                        x: self.x_from_t(kf.t),
                        y: self.y_from_value(kf.value),
                        lock_x: i == 0 || i + 1 == len,
                        lock_y: false,
                    });
                    next_id += 1;
                }
            }
            EditorTarget::Color(curve) => {
                let curve = curve.borrow();
                let len = curve.len();
                for (i, kf) in curve.points().iter().enumerate() {
                    control_points.push(ControlPoint {
                        id: next_id,
                        x: self.x_from_t(kf.t),
                        // 颜色由选色控件传达，不占用纵向位置
                        y: self.layout.top,
                        lock_x: i == 0 || i + 1 == len,
                        lock_y: true,
                    });
                    next_id += 1;
                }
            }
        }

        self.next_id = next_id;
        self.control_points = control_points;
        self.target = Some(target);
        self.drag = DragState::Idle;
        self.refresh_derived();

        tracing::debug!(
            label = %self.label,
            points = self.control_points.len(),
            "curve editor initialized"
        );
    }

    /// 指针按下
    ///
    /// 空白处：在排序位置插入新关键帧并抓取；已有标记：抓取；
    /// 再次按下已抓取的标记：视作释放（幂等，不报错）。
    pub fn on_press(&mut self, pos: Vec2) {
        if self.target.is_none() {
            return;
        }

        if let Some(hit) = self.hit_test(pos) {
            if self.drag == DragState::Dragging(hit) {
                self.drag = DragState::Idle;
                return;
            }
            self.drag = DragState::Dragging(hit);
            return;
        }

        self.insert_at(pos);
    }

    /// 指针移动：仅在拖拽中生效，应用约束后写回关键帧
    pub fn on_move(&mut self, pos: Vec2) {
        let DragState::Dragging(index) = self.drag else {
            return;
        };

        let x = pos
            .x
            .clamp(self.layout.left, self.layout.left + self.layout.width);
        let y = pos
            .y
            .clamp(self.layout.top, self.layout.top + self.layout.height);

        let cp = self.control_points[index];

        let mut new_x = cp.x;
        if !cp.lock_x {
            let clear_left = index == 0 || x >= self.control_points[index - 1].x + MIN_POINT_GAP;
            let clear_right = index + 1 >= self.control_points.len()
                || x <= self.control_points[index + 1].x - MIN_POINT_GAP;
            if clear_left && clear_right {
                new_x = x;
            }
        }

        let new_y = if cp.lock_y { cp.y } else { y };

        if new_x == cp.x && new_y == cp.y {
            return;
        }

        self.control_points[index].x = new_x;
        self.control_points[index].y = new_y;

        let t = self.t_from_x(new_x);
        match &self.target {
            Some(EditorTarget::Scalar(curve)) => {
                let value = self.value_from_y(new_y);
                curve.borrow_mut().set_point(index, t, value);
            }
            Some(EditorTarget::Color(curve)) => {
                let value = curve.borrow().points()[index].value;
                curve.borrow_mut().set_point(index, t, value);
            }
            None => {}
        }

        self.refresh_derived();
    }

    /// 指针释放：无条件回到空闲
    pub fn on_release(&mut self) {
        self.drag = DragState::Idle;
    }

    /// 指针离开编辑面：等同释放
    pub fn on_leave(&mut self) {
        self.drag = DragState::Idle;
    }

    /// 设置颜色曲线新增关键帧使用的颜色
    pub fn set_current_color(&mut self, color: Vec3) {
        self.current_color = color;
    }

    /// 填充轮廓：控制点从左到右，接右下、左下角，闭合回起点。
    /// 纯展示用途，模拟不消费。
    pub fn fill_outline(&self) -> &[Vec2] {
        &self.outline
    }

    /// 渐变停靠点，仅颜色曲线非空
    pub fn gradient_stops(&self) -> &[GradientStop] {
        &self.gradient_stops
    }

    pub fn control_points(&self) -> &[ControlPoint] {
        &self.control_points
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn layout(&self) -> &EditorLayout {
        &self.layout
    }

    fn hit_test(&self, pos: Vec2) -> Option<usize> {
        self.control_points
            .iter()
            .position(|cp| Vec2::new(cp.x, cp.y).distance(pos) < HIT_RADIUS)
    }

    /// 在排序位置插入新关键帧与控制点并抓取
    ///
    /// 从左到右找到第一个 x 超过指针的控制点，把新条目同时拼接进
    /// 控制点列表与关键帧列表的同一下标，保持两者对齐。
    fn insert_at(&mut self, pos: Vec2) {
        let len = self.control_points.len();

        let mut index = len;
        for (i, cp) in self.control_points.iter().enumerate() {
            if cp.x > pos.x {
                index = i;
                break;
            }
        }
        if len >= 2 {
            // 首尾关键帧钉死在 t=0 和 t=1，新点只落在中间
            index = index.clamp(1, len - 1);
        }

        let t = self.t_from_x(pos.x);
        let is_color = matches!(self.target, Some(EditorTarget::Color(_)));

        match &self.target {
            Some(EditorTarget::Scalar(curve)) => {
                let value = self.value_from_y(pos.y);
                curve.borrow_mut().insert_point(index, t, value);
            }
            Some(EditorTarget::Color(curve)) => {
                curve.borrow_mut().insert_point(index, t, self.current_color);
            }
            None => return,
        }

        let control_point = ControlPoint {
            id: self.next_id,
            x: pos.x,
            y: if is_color { self.layout.top } else { pos.y },
            lock_x: false,
            lock_y: is_color,
        };
        self.next_id += 1;
        self.control_points.insert(index, control_point);
        self.drag = DragState::Dragging(index);
        self.refresh_derived();

        tracing::debug!(label = %self.label, index, t, "keyframe inserted");
    }

    /// 重算填充轮廓与渐变停靠点，每次关键帧变动后调用
    fn refresh_derived(&mut self) {
        let bottom = self.layout.top + self.layout.height;

        let mut outline: Vec<Vec2> = self
            .control_points
            .iter()
            .map(|cp| Vec2::new(cp.x, cp.y))
            .collect();
        outline.push(Vec2::new(self.layout.left + self.layout.width, bottom));
        outline.push(Vec2::new(self.layout.left, bottom));
        if let Some(first) = self.control_points.first() {
            outline.push(Vec2::new(first.x, first.y));
        }
        self.outline = outline;

        self.gradient_stops = match &self.target {
            Some(EditorTarget::Color(curve)) => curve
                .borrow()
                .points()
                .iter()
                .map(|kf| GradientStop {
                    offset: kf.t * 100.0,
                    color: kf.value,
                })
                .collect(),
            _ => Vec::new(),
        };
    }

    // 正映射：关键帧 → 屏幕
    fn x_from_t(&self, t: f32) -> f32 {
        self.layout.left + t * self.layout.width
    }

    fn y_from_value(&self, value: f32) -> f32 {
        self.layout.top
            + self.layout.height / self.layout.max_value * (self.layout.max_value - value)
    }

    // 逆映射：屏幕 → 关键帧
    fn t_from_x(&self, x: f32) -> f32 {
        (x - self.layout.left) / self.layout.width
    }

    fn value_from_y(&self, y: f32) -> f32 {
        self.layout.max_value - (y - self.layout.top) * self.layout.max_value / self.layout.height
    }
}
