//! # Tween Runtime
//!
//! 时间驱动的属性补间动画引擎。
//!
//! ## 架构概述
//!
//! `tween-runtime` 是纯逻辑核心，不依赖渲染或 IO（配置加载除外）。
//! 外部调度器每帧推进所有 [`Animatable`]：
//!
//! ```text
//! 主循环                       Juggler                    Tween
//!   │                            │                          │
//!   │──── advance(dt) ─────────►│──── advance(dt) ────────►│ 插值并写回目标属性
//!   │                            │◄─── is_complete() ───────│
//!   │                            │◄─── take_next() ─────────│ 交出后续 Tween
//! ```
//!
//! ## 核心类型
//!
//! - [`Tween`]：属性补间动画，带延迟、重复、往返与生命周期回调
//! - [`PropertyBinding`]：单个属性的起始值、目标值与插值方式
//! - [`Transition`] / [`TransitionRegistry`]：过渡函数
//! - [`TweenTarget`]：目标对象的按名称读写接口
//! - [`Juggler`]：逐帧调度器
//!
//! ## 使用示例
//!
//! ```ignore
//! use tween_runtime::{Juggler, PropertyBag, Tween};
//!
//! let sprite = Rc::new(PropertyBag::new().with("x", 0.0).with("alpha", 1.0));
//!
//! let mut tween = Tween::new(&sprite, 2.0).with_transition("easeInOut")?;
//! tween.animate_property("x", 50.0)?;
//! tween.fade_to(0.0);
//!
//! let mut juggler = Juggler::new();
//! juggler.add_tween(tween);
//!
//! loop {
//!     juggler.advance(frame_time);
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`transition`]：过渡函数与注册表
//! - [`target`]：目标对象接口与现成实现
//! - [`property`]：属性绑定与插值
//! - [`tween`]：Tween 状态机
//! - [`animatable`]：调度接口与延迟调用
//! - [`juggler`]：调度器
//! - [`config`]：JSON 配置
//! - [`error`]：错误类型定义

pub mod animatable;
pub mod config;
pub mod error;
pub mod juggler;
pub mod property;
pub mod target;
pub mod transition;
pub mod tween;

// 重导出核心类型
pub use animatable::{Animatable, DelayedCall};
pub use config::TweenConfig;
pub use error::{BindingFailure, TweenError, TweenResult};
pub use juggler::{AnimId, Juggler, JugglerEvent};
pub use property::{PropertyBinding, PropertyKind};
pub use target::{PropertyBag, PropertyTable, Reflected, TweenTarget};
pub use transition::{Transition, TransitionCurve, TransitionFn, TransitionRegistry};
pub use tween::{Tween, TweenCallback, TweenState};
