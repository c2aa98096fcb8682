//! 关键帧曲线插值
//!
//! 提供通用的关键帧插值原语：值返回形式的 [`Curve`] 与
//! 面向复合类型、无分配的 [`CurveOut`]（写入调用方提供的累加器）。

use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// 曲线错误
#[derive(Error, Debug)]
pub enum CurveError {
    /// 参数超出归一化区间
    #[error("Curve t values are normalized to the interval [0.0, 1.0], given t {0} is out of range")]
    OutOfRange(f32),
    /// 曲线没有关键帧
    #[error("Curve has no keyframes")]
    Empty,
    /// CurveOut 不支持值返回形式
    #[error("Not supported on CurveOut, use get_result instead")]
    UseGetResult,
}

pub type CurveResult<T> = Result<T, CurveError>;

/// 关键帧
///
/// `t` 为归一化参数，约定在 `[0, 1]` 内；列表按 `t` 升序排列。
#[derive(Debug, Clone)]
pub struct Keyframe<V> {
    /// 归一化时间
    pub t: f32,
    /// 值
    pub value: V,
}

/// 值返回形式的插值函数
pub type LerpFn<V> = Box<dyn Fn(f32, &V, &V) -> V>;
/// 写入累加器形式的插值函数
pub type LerpOutFn<V> = Box<dyn Fn(f32, &V, &V, &mut V)>;

/// 单线程共享句柄：编辑器是唯一写者，模拟循环是读者
pub type SharedCurve<V> = Rc<RefCell<Curve<V>>>;
pub type SharedCurveOut<V> = Rc<RefCell<CurveOut<V>>>;

/// 确定插值区间的两个下标
///
/// `p1` 为最后一个 `t <= 查询值` 的关键帧（没有则为 0），
/// `p2 = min(len - 1, p1 + 1)`。`p1 == p2` 时无插值。
fn lerp_points<V>(points: &[Keyframe<V>], t: f32) -> CurveResult<(usize, usize)> {
    if t > 1.0 {
        return Err(CurveError::OutOfRange(t));
    }
    if points.is_empty() {
        return Err(CurveError::Empty);
    }

    let mut p1 = 0;
    for (i, kf) in points.iter().enumerate() {
        if kf.t >= t {
            break;
        }
        p1 = i;
    }

    let p2 = (points.len() - 1).min(p1 + 1);
    Ok((p1, p2))
}

/// 关键帧曲线
///
/// 持有按 `t` 升序的关键帧序列和一个插值函数。
/// 排序由调用方维护（编辑器通过有序插入保证）。
pub struct Curve<V> {
    points: Vec<Keyframe<V>>,
    lerp: LerpFn<V>,
}

impl<V> Curve<V>
where
    V: Clone,
{
    pub fn new(lerp: LerpFn<V>) -> Self {
        Self {
            points: Vec::new(),
            lerp,
        }
    }

    /// 追加关键帧
    ///
    /// 调用方负责保持升序。
    pub fn add_point(&mut self, t: f32, value: V) {
        self.points.push(Keyframe { t, value });
    }

    /// 在指定下标插入关键帧
    pub fn insert_point(&mut self, index: usize, t: f32, value: V) {
        self.points.insert(index, Keyframe { t, value });
    }

    /// 覆写指定下标的关键帧
    pub fn set_point(&mut self, index: usize, t: f32, value: V) {
        if let Some(kf) = self.points.get_mut(index) {
            kf.t = t;
            kf.value = value;
        }
    }

    pub fn points(&self) -> &[Keyframe<V>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 采样曲线
    ///
    /// `t > 1.0` 立即报错。`p1 == p2` 时直接返回该关键帧的值，
    /// 不做插值（最后一帧之后或只有一帧时）。
    pub fn get(&self, t: f32) -> CurveResult<V> {
        let (p1, p2) = lerp_points(&self.points, t)?;

        if p1 == p2 {
            return Ok(self.points[p1].value.clone());
        }

        let a = &self.points[p1];
        let b = &self.points[p2];
        let f = (t - a.t) / (b.t - a.t);
        Ok((self.lerp)(f, &a.value, &b.value))
    }

    pub fn into_shared(self) -> SharedCurve<V> {
        Rc::new(RefCell::new(self))
    }
}

impl Curve<f32> {
    /// 标量仿射插值曲线 `a + f * (b - a)`
    pub fn linear() -> Self {
        Self::new(Box::new(|f, a, b| a + f * (b - a)))
    }
}

/// 无分配变体
///
/// 与 [`Curve`] 使用相同的区间查找逻辑，但插值结果写入调用方提供的
/// 可变累加器，用于向量、颜色等复合类型，避免逐次采样分配。
pub struct CurveOut<V> {
    points: Vec<Keyframe<V>>,
    lerp: LerpOutFn<V>,
}

impl<V> CurveOut<V> {
    pub fn new(lerp: LerpOutFn<V>) -> Self {
        Self {
            points: Vec::new(),
            lerp,
        }
    }

    /// 追加关键帧，调用方负责保持升序
    pub fn add_point(&mut self, t: f32, value: V) {
        self.points.push(Keyframe { t, value });
    }

    /// 在指定下标插入关键帧
    pub fn insert_point(&mut self, index: usize, t: f32, value: V) {
        self.points.insert(index, Keyframe { t, value });
    }

    /// 覆写指定下标的关键帧
    pub fn set_point(&mut self, index: usize, t: f32, value: V) {
        if let Some(kf) = self.points.get_mut(index) {
            kf.t = t;
            kf.value = value;
        }
    }

    pub fn points(&self) -> &[Keyframe<V>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 值返回形式在此类型上被禁用
    pub fn get(&self, _t: f32) -> CurveResult<V> {
        Err(CurveError::UseGetResult)
    }

    /// 采样曲线并写入 `out`
    ///
    /// 返回写入后的累加器引用。`p1 == p2` 时返回关键帧自身的引用，
    /// 此分支不写 `out`，调用方不得假定 `out` 已被更新。
    pub fn get_result<'a>(&'a self, t: f32, out: &'a mut V) -> CurveResult<&'a V> {
        let (p1, p2) = lerp_points(&self.points, t)?;

        if p1 == p2 {
            return Ok(&self.points[p1].value);
        }

        let a = &self.points[p1];
        let b = &self.points[p2];
        let f = (t - a.t) / (b.t - a.t);
        (self.lerp)(f, &a.value, &b.value, out);
        Ok(out)
    }

    pub fn into_shared(self) -> SharedCurveOut<V> {
        Rc::new(RefCell::new(self))
    }
}
