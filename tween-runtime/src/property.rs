//! # Property 模块
//!
//! 单个属性的绑定：起始值捕获、插值与写回。
//!
//! ## 属性名约定
//!
//! | 写法 | 插值方式 |
//! |------|----------|
//! | `alpha` | 普通数值 |
//! | `color`、`tintColor` | 24 位 RGB，逐通道插值 |
//! | `tint#rgb` | 同上（显式标记） |
//! | `rotation#rad` | 弧度角，走最短弧 |
//! | `heading#deg` | 角度，走最短弧 |
//!
//! 标记后缀只在 [`PropertyKind::parse`] 里处理，其余代码只看 [`PropertyKind`]。

use std::f32::consts::PI;
use std::rc::Weak;

use tracing::trace;

use crate::error::{BindingFailure, TweenError, TweenResult};
use crate::target::TweenTarget;

/// 插值方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PropertyKind {
    /// 普通数值
    #[default]
    Plain,
    /// 打包的 24 位 RGB 颜色
    ColorRgb,
    /// 弧度角
    AngleRadians,
    /// 角度
    AngleDegrees,
}

impl PropertyKind {
    /// 解析属性名，返回真实属性名与插值方式
    ///
    /// # 错误
    /// - 属性名为空
    /// - `#` 后是未知标记
    pub fn parse(name: &str) -> TweenResult<(&str, PropertyKind)> {
        let (attribute, kind) = match name.rsplit_once('#') {
            Some((attribute, marker)) => {
                let kind = match marker {
                    "rgb" => PropertyKind::ColorRgb,
                    "rad" => PropertyKind::AngleRadians,
                    "deg" => PropertyKind::AngleDegrees,
                    other => {
                        return Err(TweenError::invalid_property(
                            name,
                            format!("未知的类型标记 '#{}'", other),
                        ));
                    }
                };
                (attribute, kind)
            }
            None if name.contains("color") || name.contains("Color") => {
                (name, PropertyKind::ColorRgb)
            }
            None => (name, PropertyKind::Plain),
        };

        if attribute.is_empty() {
            return Err(TweenError::invalid_property(name, "属性名为空"));
        }
        Ok((attribute, kind))
    }

    /// 计算插值结果
    ///
    /// `round_to_int` 作用于普通数值与颜色通道，不作用于角度。
    pub fn interpolate(self, start: f32, end: f32, t: f32, round_to_int: bool) -> f32 {
        match self {
            PropertyKind::Plain => {
                let value = lerp(start, end, t);
                if round_to_int { value.round() } else { value }
            }
            PropertyKind::ColorRgb => interpolate_rgb(start, end, t, round_to_int),
            PropertyKind::AngleRadians => interpolate_angle(start, end, t, 2.0 * PI),
            PropertyKind::AngleDegrees => interpolate_angle(start, end, t, 360.0),
        }
    }
}

/// 端点精确的线性插值
fn lerp(start: f32, end: f32, t: f32) -> f32 {
    start * (1.0 - t) + end * t
}

fn interpolate_rgb(start: f32, end: f32, t: f32, round_to_int: bool) -> f32 {
    let start = start as u32;
    let end = end as u32;

    let mut packed = 0u32;
    for shift in [16, 8, 0] {
        let from = ((start >> shift) & 0xFF) as f32;
        let to = ((end >> shift) & 0xFF) as f32;
        let channel = lerp(from, to, t).clamp(0.0, 255.0);
        let channel = if round_to_int {
            channel.round()
        } else {
            channel.trunc()
        };
        packed |= (channel as u32) << shift;
    }
    packed as f32
}

/// 沿最短弧插值，结束时精确落在 `end`
fn interpolate_angle(start: f32, end: f32, t: f32, full_turn: f32) -> f32 {
    let half_turn = full_turn / 2.0;
    let mut delta = (end - start) % full_turn;
    if delta > half_turn {
        delta -= full_turn;
    } else if delta <= -half_turn {
        delta += full_turn;
    }
    end - delta * (1.0 - t)
}

/// 属性绑定
///
/// 一个绑定对应目标上的一个属性。起始值在 Tween 首次进入播放阶段时捕获，
/// 而不是在创建时，这样可以尊重创建之后、开始之前被其他系统修改过的值。
#[derive(Debug, Clone)]
pub struct PropertyBinding {
    target: Weak<dyn TweenTarget>,
    attribute: String,
    kind: PropertyKind,
    start_value: Option<f32>,
    end_value: f32,
    failed: bool,
}

impl PropertyBinding {
    /// 创建绑定（尚未捕获起始值）
    pub fn new(
        target: Weak<dyn TweenTarget>,
        attribute: impl Into<String>,
        kind: PropertyKind,
        end_value: f32,
    ) -> Self {
        Self {
            target,
            attribute: attribute.into(),
            kind,
            start_value: None,
            end_value,
            failed: false,
        }
    }

    /// 属性名（不含类型标记）
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// 插值方式
    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    /// 捕获到的起始值
    pub fn start_value(&self) -> Option<f32> {
        self.start_value
    }

    /// 目标值
    pub fn end_value(&self) -> f32 {
        self.end_value
    }

    /// 是否已捕获起始值
    pub fn is_captured(&self) -> bool {
        self.start_value.is_some()
    }

    /// 是否因错误被停用
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// 重新设定目标值与插值方式
    pub(crate) fn retarget(&mut self, kind: PropertyKind, end_value: f32) {
        self.kind = kind;
        self.end_value = end_value;
    }

    pub(crate) fn mark_failed(&mut self) {
        self.failed = true;
    }

    /// 读取目标的当前值作为起始值
    ///
    /// 已捕获时不做任何事。
    pub fn capture(&mut self) -> TweenResult<()> {
        if self.start_value.is_some() {
            return Ok(());
        }

        let target = self.upgrade()?;
        let value = target
            .get_property(&self.attribute)
            .ok_or_else(|| TweenError::binding(&self.attribute, BindingFailure::MissingProperty))?;

        trace!(property = %self.attribute, start = value, "捕获起始值");
        self.start_value = Some(value);
        Ok(())
    }

    /// 计算给定缓动进度下的值
    ///
    /// 未捕获时以目标值作为起点。
    pub fn interpolate(&self, fraction: f32, round_to_int: bool) -> f32 {
        let start = self.start_value.unwrap_or(self.end_value);
        self.kind
            .interpolate(start, self.end_value, fraction, round_to_int)
    }

    /// 计算插值并写回目标
    pub fn apply(&mut self, fraction: f32, round_to_int: bool) -> TweenResult<()> {
        self.capture()?;
        let value = self.interpolate(fraction, round_to_int);

        let target = self.upgrade()?;
        if target.set_property(&self.attribute, value) {
            Ok(())
        } else {
            Err(TweenError::binding(&self.attribute, BindingFailure::Rejected))
        }
    }

    fn upgrade(&self) -> TweenResult<std::rc::Rc<dyn TweenTarget>> {
        self.target
            .upgrade()
            .ok_or_else(|| TweenError::binding(&self.attribute, BindingFailure::TargetDropped))
    }
}
