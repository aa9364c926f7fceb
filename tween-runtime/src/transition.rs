//! # Transition 模块
//!
//! 过渡（缓动）函数库与注册表。
//!
//! 过渡函数把归一化时间 `t ∈ [0, 1]` 映射为缓动后的进度，
//! 部分曲线（Back、Elastic）会超出 `[0, 1]`。

use std::collections::HashMap;
use std::f32::consts::PI;
use std::rc::Rc;
use std::str::FromStr;

use crate::error::{TweenError, TweenResult};

/// 自定义过渡函数
pub type TransitionFn = Rc<dyn Fn(f32) -> f32>;

/// 内置过渡函数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Transition {
    /// 线性（匀速）
    #[default]
    Linear,
    /// 缓入（三次）
    EaseIn,
    /// 缓出（三次）
    EaseOut,
    /// 缓入缓出
    EaseInOut,
    /// 缓出缓入
    EaseOutIn,
    /// 回退缓入
    EaseInBack,
    /// 回退缓出
    EaseOutBack,
    /// 回退缓入缓出
    EaseInOutBack,
    /// 回退缓出缓入
    EaseOutInBack,
    /// 弹性缓入
    EaseInElastic,
    /// 弹性缓出
    EaseOutElastic,
    /// 弹性缓入缓出
    EaseInOutElastic,
    /// 弹性缓出缓入
    EaseOutInElastic,
    /// 弹跳缓入
    EaseInBounce,
    /// 弹跳缓出
    EaseOutBounce,
    /// 弹跳缓入缓出
    EaseInOutBounce,
    /// 弹跳缓出缓入
    EaseOutInBounce,
}

impl Transition {
    /// 所有内置过渡函数
    pub const ALL: [Transition; 17] = [
        Transition::Linear,
        Transition::EaseIn,
        Transition::EaseOut,
        Transition::EaseInOut,
        Transition::EaseOutIn,
        Transition::EaseInBack,
        Transition::EaseOutBack,
        Transition::EaseInOutBack,
        Transition::EaseOutInBack,
        Transition::EaseInElastic,
        Transition::EaseOutElastic,
        Transition::EaseInOutElastic,
        Transition::EaseOutInElastic,
        Transition::EaseInBounce,
        Transition::EaseOutBounce,
        Transition::EaseInOutBounce,
        Transition::EaseOutInBounce,
    ];

    /// 注册名
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Linear => "linear",
            Transition::EaseIn => "easeIn",
            Transition::EaseOut => "easeOut",
            Transition::EaseInOut => "easeInOut",
            Transition::EaseOutIn => "easeOutIn",
            Transition::EaseInBack => "easeInBack",
            Transition::EaseOutBack => "easeOutBack",
            Transition::EaseInOutBack => "easeInOutBack",
            Transition::EaseOutInBack => "easeOutInBack",
            Transition::EaseInElastic => "easeInElastic",
            Transition::EaseOutElastic => "easeOutElastic",
            Transition::EaseInOutElastic => "easeInOutElastic",
            Transition::EaseOutInElastic => "easeOutInElastic",
            Transition::EaseInBounce => "easeInBounce",
            Transition::EaseOutBounce => "easeOutBounce",
            Transition::EaseInOutBounce => "easeInOutBounce",
            Transition::EaseOutInBounce => "easeOutInBounce",
        }
    }

    /// 按注册名查找内置过渡函数
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Transition::Linear => t,
            Transition::EaseIn => ease_in(t),
            Transition::EaseOut => ease_out(t),
            Transition::EaseInOut => combined(t, ease_in, ease_out),
            Transition::EaseOutIn => combined(t, ease_out, ease_in),
            Transition::EaseInBack => ease_in_back(t),
            Transition::EaseOutBack => ease_out_back(t),
            Transition::EaseInOutBack => combined(t, ease_in_back, ease_out_back),
            Transition::EaseOutInBack => combined(t, ease_out_back, ease_in_back),
            Transition::EaseInElastic => ease_in_elastic(t),
            Transition::EaseOutElastic => ease_out_elastic(t),
            Transition::EaseInOutElastic => combined(t, ease_in_elastic, ease_out_elastic),
            Transition::EaseOutInElastic => combined(t, ease_out_elastic, ease_in_elastic),
            Transition::EaseInBounce => ease_in_bounce(t),
            Transition::EaseOutBounce => ease_out_bounce(t),
            Transition::EaseInOutBounce => combined(t, ease_in_bounce, ease_out_bounce),
            Transition::EaseOutInBounce => combined(t, ease_out_bounce, ease_in_bounce),
        }
    }
}

impl FromStr for Transition {
    type Err = TweenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| TweenError::UnknownTransition {
            name: s.to_string(),
        })
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn ease_in(t: f32) -> f32 {
    t * t * t
}

fn ease_out(t: f32) -> f32 {
    let inv = t - 1.0;
    inv * inv * inv + 1.0
}

fn ease_in_back(t: f32) -> f32 {
    let s = 1.70158;
    t * t * ((s + 1.0) * t - s)
}

fn ease_out_back(t: f32) -> f32 {
    let inv = t - 1.0;
    let s = 1.70158;
    inv * inv * ((s + 1.0) * inv + s) + 1.0
}

fn ease_in_elastic(t: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let p = 0.3;
    let s = p / 4.0;
    let inv = t - 1.0;
    -(2.0_f32.powf(10.0 * inv)) * ((inv - s) * (2.0 * PI) / p).sin()
}

fn ease_out_elastic(t: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let p = 0.3;
    let s = p / 4.0;
    2.0_f32.powf(-10.0 * t) * ((t - s) * (2.0 * PI) / p).sin() + 1.0
}

fn ease_in_bounce(t: f32) -> f32 {
    1.0 - ease_out_bounce(1.0 - t)
}

fn ease_out_bounce(t: f32) -> f32 {
    let s = 7.5625;
    let p = 2.75;

    if t < 1.0 / p {
        s * t * t
    } else if t < 2.0 / p {
        let t = t - 1.5 / p;
        s * t * t + 0.75
    } else if t < 2.5 / p {
        let t = t - 2.25 / p;
        s * t * t + 0.9375
    } else {
        let t = t - 2.625 / p;
        s * t * t + 0.984375
    }
}

/// 前半段用 `first`，后半段用 `second`
fn combined(t: f32, first: fn(f32) -> f32, second: fn(f32) -> f32) -> f32 {
    if t < 0.5 {
        0.5 * first(t * 2.0)
    } else {
        0.5 * second(t * 2.0 - 1.0) + 0.5
    }
}

/// 已解析的过渡曲线
#[derive(Clone)]
pub enum TransitionCurve {
    /// 内置曲线
    Builtin(Transition),
    /// 自定义曲线
    Custom(TransitionFn),
}

impl TransitionCurve {
    /// 计算缓动值
    pub fn apply(&self, t: f32) -> f32 {
        match self {
            Self::Builtin(transition) => transition.apply(t),
            Self::Custom(f) => f(t),
        }
    }
}

impl Default for TransitionCurve {
    fn default() -> Self {
        Self::Builtin(Transition::Linear)
    }
}

impl std::fmt::Debug for TransitionCurve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Builtin(transition) => write!(f, "Builtin({})", transition),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// 过渡函数注册表
///
/// 内置曲线总是可用；自定义曲线通过 [`register`](Self::register) 添加，
/// 同名时优先于内置曲线。
#[derive(Clone, Default)]
pub struct TransitionRegistry {
    custom: HashMap<String, TransitionFn>,
}

impl std::fmt::Debug for TransitionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.custom.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("TransitionRegistry")
            .field("custom", &names)
            .finish()
    }
}

impl TransitionRegistry {
    /// 创建只包含内置曲线的注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册自定义曲线
    pub fn register(&mut self, name: impl Into<String>, f: impl Fn(f32) -> f32 + 'static) {
        self.custom.insert(name.into(), Rc::new(f));
    }

    /// 名称是否可解析
    pub fn contains(&self, name: &str) -> bool {
        self.custom.contains_key(name) || Transition::from_name(name).is_some()
    }

    /// 解析过渡函数名
    pub fn resolve(&self, name: &str) -> TweenResult<TransitionCurve> {
        if let Some(f) = self.custom.get(name) {
            return Ok(TransitionCurve::Custom(f.clone()));
        }
        name.parse().map(TransitionCurve::Builtin)
    }
}
