//! # Tween 模块
//!
//! 属性补间动画：在给定时长内把目标对象的若干属性从当前值推进到目标值。
//!
//! ## 状态机
//!
//! ```text
//! Delaying ──► Active ──► RepeatDelay ──► Active ──► … ──► Finished
//!   (delay)     (cycle)    (repeat_delay)                (on_complete)
//! ```
//!
//! 单次 `advance` 可以跨越多个阶段，多出的时间会继续带入下一阶段，
//! 因此无论帧间隔多大，时间都不会丢失。一帧跨越的完整周期过多时，
//! 中间的周期直接跳过（不逐轮触发 `on_update` / `on_repeat`），
//! 保证单次推进的开销有上界。

use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::animatable::{Animatable, MAX_CATCH_UP};
use crate::error::{TweenError, TweenResult};
use crate::property::{PropertyBinding, PropertyKind};
use crate::target::TweenTarget;
use crate::transition::{Transition, TransitionCurve, TransitionFn, TransitionRegistry};

/// 生命周期回调
pub type TweenCallback = Box<dyn FnMut()>;

/// Tween 状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TweenState {
    /// 等待首次延迟结束
    #[default]
    Delaying,
    /// 正在播放某一轮
    Active,
    /// 两轮之间的等待
    RepeatDelay,
    /// 已结束
    Finished,
}

#[derive(Default)]
struct Callbacks {
    on_start: Option<TweenCallback>,
    on_update: Option<TweenCallback>,
    on_repeat: Option<TweenCallback>,
    on_complete: Option<TweenCallback>,
}

impl Callbacks {
    fn fire(slot: &mut Option<TweenCallback>) {
        if let Some(callback) = slot {
            callback();
        }
    }
}

/// 属性补间动画
///
/// ## 使用示例
///
/// ```rust,ignore
/// let mut tween = Tween::new(&sprite, 2.0).with_transition("easeInOut")?;
/// tween.move_to(50.0, 20.0);
/// tween.animate_property("rotation#deg", 45.0)?;
/// tween.fade_to(0.0);
/// juggler.add_tween(tween);
/// ```
pub struct Tween {
    target: Weak<dyn TweenTarget>,
    bindings: Vec<PropertyBinding>,
    total_time: f32,
    current_time: f32,
    delay: f32,
    /// 当前等待阶段（delay 或 repeat_delay）剩余时间
    wait_remaining: f32,
    transition_name: String,
    transition: TransitionCurve,
    transition_fn: Option<TransitionFn>,
    repeat_count: u32,
    repeat_delay: f32,
    reverse: bool,
    round_to_int: bool,
    progress: f32,
    current_cycle: u32,
    has_started: bool,
    state: TweenState,
    callbacks: Callbacks,
    next_tween: Option<Box<Tween>>,
    errors: Vec<TweenError>,
}

impl std::fmt::Debug for Tween {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tween")
            .field("bindings", &self.bindings.len())
            .field("total_time", &self.total_time)
            .field("current_time", &self.current_time)
            .field("transition", &self.transition_name)
            .field("state", &self.state)
            .field("current_cycle", &self.current_cycle)
            .field("has_next", &self.next_tween.is_some())
            .finish()
    }
}

impl Tween {
    /// 创建 Tween（线性过渡）
    ///
    /// Tween 只持有目标的弱引用，不会延长目标的生命周期。
    pub fn new<T: TweenTarget>(target: &Rc<T>, time: f32) -> Self {
        let target: Weak<dyn TweenTarget> = Rc::downgrade(target) as Weak<dyn TweenTarget>;
        Self::with_weak_target(target, time)
    }

    /// 使用已有的弱引用创建 Tween
    pub fn with_weak_target(target: Weak<dyn TweenTarget>, time: f32) -> Self {
        Self {
            target,
            bindings: Vec::new(),
            total_time: time.max(0.0),
            current_time: 0.0,
            delay: 0.0,
            wait_remaining: 0.0,
            transition_name: Transition::Linear.name().to_string(),
            transition: TransitionCurve::default(),
            transition_fn: None,
            repeat_count: 1,
            repeat_delay: 0.0,
            reverse: false,
            round_to_int: false,
            progress: 0.0,
            current_cycle: 0,
            has_started: false,
            state: TweenState::Delaying,
            callbacks: Callbacks::default(),
            next_tween: None,
            errors: Vec::new(),
        }
    }

    // ========== 配置 ==========

    /// 设置内置过渡函数（构建器）
    pub fn with_transition(mut self, name: &str) -> TweenResult<Self> {
        self.set_transition(name)?;
        Ok(self)
    }

    /// 设置延迟（构建器）
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.set_delay(delay);
        self
    }

    /// 设置重复次数（构建器），0 表示无限
    pub fn with_repeat(mut self, repeat_count: u32, repeat_delay: f32) -> Self {
        self.repeat_count = repeat_count;
        self.repeat_delay = repeat_delay.max(0.0);
        self
    }

    /// 设置往返播放（构建器）
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// 设置取整（构建器）
    pub fn with_round_to_int(mut self, round_to_int: bool) -> Self {
        self.round_to_int = round_to_int;
        self
    }

    /// 按名称设置内置过渡函数
    ///
    /// 名称在此处立即解析，未知名称直接报错，而不是等到播放时。
    pub fn set_transition(&mut self, name: &str) -> TweenResult<()> {
        let transition: Transition = name.parse()?;
        self.transition = TransitionCurve::Builtin(transition);
        self.transition_name = name.to_string();
        Ok(())
    }

    /// 从注册表解析过渡函数（支持自定义名称）
    pub fn set_transition_from(
        &mut self,
        registry: &TransitionRegistry,
        name: &str,
    ) -> TweenResult<()> {
        self.transition = registry.resolve(name)?;
        self.transition_name = name.to_string();
        Ok(())
    }

    /// 设置自定义过渡函数，优先于按名称设置的过渡函数
    pub fn set_transition_fn(&mut self, f: impl Fn(f32) -> f32 + 'static) {
        self.transition_fn = Some(Rc::new(f));
    }

    /// 清除自定义过渡函数
    pub fn clear_transition_fn(&mut self) {
        self.transition_fn = None;
    }

    /// 设置延迟
    ///
    /// 延迟尚未结束时会按差值调整剩余等待时间。
    pub fn set_delay(&mut self, delay: f32) {
        let delay = delay.max(0.0);
        if self.state == TweenState::Delaying {
            self.wait_remaining = (self.wait_remaining + delay - self.delay).max(0.0);
        }
        self.delay = delay;
    }

    /// 设置重复次数，0 表示无限
    pub fn set_repeat_count(&mut self, repeat_count: u32) {
        self.repeat_count = repeat_count;
    }

    /// 设置两轮之间的等待时间
    pub fn set_repeat_delay(&mut self, repeat_delay: f32) {
        self.repeat_delay = repeat_delay.max(0.0);
    }

    /// 设置往返播放：偶数轮（第 2、4…轮）从目标值回到起始值
    pub fn set_reverse(&mut self, reverse: bool) {
        self.reverse = reverse;
    }

    /// 设置是否将数值取整
    pub fn set_round_to_int(&mut self, round_to_int: bool) {
        self.round_to_int = round_to_int;
    }

    /// 开始时回调（延迟结束后，仅第一轮）
    pub fn set_on_start(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.on_start = Some(Box::new(f));
    }

    /// 每次推进后回调
    pub fn set_on_update(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.on_update = Some(Box::new(f));
    }

    /// 每轮结束（最后一轮除外）回调
    pub fn set_on_repeat(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.on_repeat = Some(Box::new(f));
    }

    /// 全部完成时回调
    pub fn set_on_complete(&mut self, f: impl FnMut() + 'static) {
        self.callbacks.on_complete = Some(Box::new(f));
    }

    /// 设置完成后接着播放的 Tween
    pub fn set_next_tween(&mut self, next: Tween) {
        self.next_tween = Some(Box::new(next));
    }

    // ========== 属性绑定 ==========

    /// 动画一个属性到目标值
    ///
    /// 属性名可带 `#rgb` / `#rad` / `#deg` 标记，见 [`PropertyKind::parse`]。
    /// 同一属性重复绑定时只更新目标值。
    pub fn animate_property(&mut self, name: &str, value: f32) -> TweenResult<()> {
        let (attribute, kind) = PropertyKind::parse(name)?;
        self.bind(attribute, kind, value);
        Ok(())
    }

    /// 批量动画属性
    ///
    /// 任意属性名无效时返回错误，在它之前的属性已绑定。
    pub fn animate_properties<'a, I>(&mut self, properties: I) -> TweenResult<()>
    where
        I: IntoIterator<Item = (&'a str, f32)>,
    {
        for (name, value) in properties {
            self.animate_property(name, value)?;
        }
        Ok(())
    }

    /// 同时动画 `x` 与 `y`
    pub fn move_to(&mut self, x: f32, y: f32) {
        self.bind("x", PropertyKind::Plain, x);
        self.bind("y", PropertyKind::Plain, y);
    }

    /// 同时动画 `scaleX` 与 `scaleY`
    pub fn scale_to(&mut self, scale: f32) {
        self.bind("scaleX", PropertyKind::Plain, scale);
        self.bind("scaleY", PropertyKind::Plain, scale);
    }

    /// 动画 `alpha`
    pub fn fade_to(&mut self, alpha: f32) {
        self.bind("alpha", PropertyKind::Plain, alpha);
    }

    fn bind(&mut self, attribute: &str, kind: PropertyKind, value: f32) {
        match self.bindings.iter_mut().find(|b| b.attribute() == attribute) {
            Some(binding) => binding.retarget(kind, value),
            None => self.bindings.push(PropertyBinding::new(
                self.target.clone(),
                attribute,
                kind,
                value,
            )),
        }
    }

    /// 查询属性的目标值
    pub fn end_value_of_property(&self, name: &str) -> TweenResult<f32> {
        let (attribute, _) = PropertyKind::parse(name)?;
        self.bindings
            .iter()
            .find(|b| b.attribute() == attribute)
            .map(PropertyBinding::end_value)
            .ok_or_else(|| TweenError::NotAnimated {
                property: attribute.to_string(),
            })
    }

    // ========== 推进 ==========

    /// 推进时间
    pub fn advance(&mut self, dt: f32) {
        if self.state == TweenState::Finished || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let mut rest = dt;
        loop {
            match self.state {
                TweenState::Delaying | TweenState::RepeatDelay => {
                    // 只有累计时间超过等待时间才进入播放
                    if rest <= self.wait_remaining {
                        self.wait_remaining -= rest;
                        return;
                    }
                    rest -= self.wait_remaining;
                    self.wait_remaining = 0.0;
                    self.enter_cycle();
                }
                TweenState::Active => {
                    let carry = (rest - (self.total_time - self.current_time)).max(0.0);
                    self.current_time = (self.current_time + rest).min(self.total_time);
                    self.update_bindings();
                    Callbacks::fire(&mut self.callbacks.on_update);

                    if self.current_time < self.total_time {
                        return;
                    }
                    self.finish_cycle();
                    if self.state == TweenState::Finished {
                        return;
                    }
                    rest = self.skip_whole_periods(carry);
                }
                TweenState::Finished => return,
            }
        }
    }

    fn enter_cycle(&mut self) {
        self.state = TweenState::Active;
        self.current_time = 0.0;

        if !self.has_started {
            self.has_started = true;
            for i in 0..self.bindings.len() {
                self.capture_binding(i);
            }
            debug!(bindings = self.bindings.len(), "Tween 开始");
            Callbacks::fire(&mut self.callbacks.on_start);
        }
    }

    fn finish_cycle(&mut self) {
        // 零时长只播放一轮，避免无限重复时空转
        let more_cycles = self.total_time > 0.0
            && (self.repeat_count == 0 || self.current_cycle + 1 < self.repeat_count);

        if more_cycles {
            self.current_cycle = self.current_cycle.wrapping_add(1);
            self.current_time = 0.0;
            self.wait_remaining = self.repeat_delay;
            self.state = TweenState::RepeatDelay;
            debug!(cycle = self.current_cycle, "Tween 重复");
            Callbacks::fire(&mut self.callbacks.on_repeat);
        } else {
            self.state = TweenState::Finished;
            debug!(cycles = self.current_cycle.wrapping_add(1), "Tween 完成");
            Callbacks::fire(&mut self.callbacks.on_complete);
        }
    }

    /// 在重复等待开始时跳过多余的完整周期，返回剩余时间
    ///
    /// 至少留下一个完整周期走正常流程；有限重复时不会跳过最后一轮。
    fn skip_whole_periods(&mut self, rest: f32) -> f32 {
        let period = f64::from(self.total_time) + f64::from(self.repeat_delay);
        let rest_f64 = f64::from(rest);
        let periods = (rest_f64 / period).floor();
        if periods <= f64::from(MAX_CATCH_UP) {
            return rest;
        }

        let mut skip = periods - 1.0;
        let mut remaining = period + rest_f64 % period;
        if self.repeat_count != 0 {
            let cap = f64::from(self.repeat_count - self.current_cycle - 1);
            if skip > cap {
                skip = cap;
                remaining = rest_f64 - skip * period;
            }
        }
        if skip < 1.0 {
            return rest;
        }

        // 只有奇偶性影响往返方向，按 2^32 取模保持不变
        let cycles = (skip % 4_294_967_296.0) as u32;
        self.current_cycle = self.current_cycle.wrapping_add(cycles);
        debug!(skipped = skip, cycle = self.current_cycle, "Tween 跳过完整周期");
        remaining as f32
    }

    fn update_bindings(&mut self) {
        let ratio = if self.total_time > 0.0 {
            self.current_time / self.total_time
        } else {
            1.0
        };
        let ratio = if self.is_reversed_cycle() {
            1.0 - ratio
        } else {
            ratio
        };

        self.progress = match &self.transition_fn {
            Some(f) => f(ratio),
            None => self.transition.apply(ratio),
        };

        for i in 0..self.bindings.len() {
            let binding = &mut self.bindings[i];
            if binding.is_failed() {
                continue;
            }
            if let Err(e) = binding.apply(self.progress, self.round_to_int) {
                self.fail_binding(i, e);
            }
        }
    }

    fn capture_binding(&mut self, index: usize) {
        let binding = &mut self.bindings[index];
        if binding.is_failed() {
            return;
        }
        if let Err(e) = binding.capture() {
            self.fail_binding(index, e);
        }
    }

    /// 停用出错的绑定；错误只上报一次
    fn fail_binding(&mut self, index: usize, error: TweenError) {
        let binding = &mut self.bindings[index];
        binding.mark_failed();
        warn!(property = %binding.attribute(), error = %error, "属性绑定失败，停止更新该属性");
        self.errors.push(error);
    }

    fn is_reversed_cycle(&self) -> bool {
        self.reverse && self.current_cycle % 2 == 1
    }

    /// 立即停止，不触发 `on_complete`，也不会启动后续 Tween
    pub fn stop(&mut self) {
        if self.state != TweenState::Finished {
            debug!("Tween 被停止");
            self.state = TweenState::Finished;
            self.next_tween = None;
        }
    }

    /// 取出累积的绑定错误
    pub fn take_errors(&mut self) -> Vec<TweenError> {
        std::mem::take(&mut self.errors)
    }

    // ========== 查询 ==========

    /// 目标对象（已释放时为 `None`）
    pub fn target(&self) -> Option<Rc<dyn TweenTarget>> {
        self.target.upgrade()
    }

    /// 属性绑定
    pub fn bindings(&self) -> &[PropertyBinding] {
        &self.bindings
    }

    /// 总时长（秒）
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// 当前轮已播放时间（秒）
    pub fn current_time(&self) -> f32 {
        self.current_time
    }

    /// 延迟（秒）
    pub fn delay(&self) -> f32 {
        self.delay
    }

    /// 当前缓动进度（已应用过渡函数，可能超出 0..1）
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// 过渡函数名
    pub fn transition_name(&self) -> &str {
        &self.transition_name
    }

    /// 重复次数，0 表示无限
    pub fn repeat_count(&self) -> u32 {
        self.repeat_count
    }

    /// 两轮之间的等待时间
    pub fn repeat_delay(&self) -> f32 {
        self.repeat_delay
    }

    /// 是否往返播放
    pub fn reverse(&self) -> bool {
        self.reverse
    }

    /// 是否取整
    pub fn round_to_int(&self) -> bool {
        self.round_to_int
    }

    /// 当前轮序号（从 0 开始）
    pub fn current_cycle(&self) -> u32 {
        self.current_cycle
    }

    /// 剩余轮数（含当前轮），无限重复时为 `None`
    pub fn remaining_repeats(&self) -> Option<u32> {
        if self.repeat_count == 0 {
            return None;
        }
        if self.state == TweenState::Finished {
            return Some(0);
        }
        Some(self.repeat_count.saturating_sub(self.current_cycle))
    }

    /// 当前状态
    pub fn state(&self) -> TweenState {
        self.state
    }

    /// 是否已经开始（延迟已结束）
    pub fn has_started(&self) -> bool {
        self.has_started
    }

    /// 是否已结束
    pub fn is_complete(&self) -> bool {
        self.state == TweenState::Finished
    }

    /// 后续 Tween
    pub fn next_tween(&self) -> Option<&Tween> {
        self.next_tween.as_deref()
    }
}

impl Animatable for Tween {
    fn advance(&mut self, dt: f32) {
        Tween::advance(self, dt);
    }

    fn is_complete(&self) -> bool {
        Tween::is_complete(self)
    }

    fn take_next(&mut self) -> Option<Box<dyn Animatable>> {
        if !self.is_complete() {
            return None;
        }
        self.next_tween
            .take()
            .map(|next| next as Box<dyn Animatable>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::PropertyBag;
    use std::cell::RefCell;

    fn bag() -> Rc<PropertyBag> {
        Rc::new(PropertyBag::new().with("x", 0.0).with("y", 0.0).with("alpha", 1.0))
    }

    /// 记录回调触发顺序
    fn record(tween: &mut Tween) -> Rc<RefCell<Vec<&'static str>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        tween.set_on_start(move || l.borrow_mut().push("start"));
        let l = log.clone();
        tween.set_on_repeat(move || l.borrow_mut().push("repeat"));
        let l = log.clone();
        tween.set_on_complete(move || l.borrow_mut().push("complete"));
        log
    }

    #[test]
    fn test_tween_creation() {
        let target = bag();
        let tween = Tween::new(&target, 1.0);
        assert_eq!(tween.state(), TweenState::Delaying);
        assert_eq!(tween.total_time(), 1.0);
        assert_eq!(tween.repeat_count(), 1);
        assert_eq!(tween.transition_name(), "linear");
        assert!(!tween.is_complete());
    }

    #[test]
    fn test_tween_update() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0);
        tween.animate_property("x", 100.0).unwrap();

        tween.advance(0.25);
        assert_eq!(tween.state(), TweenState::Active);
        assert_eq!(target.get("x"), Some(25.0));

        tween.advance(0.5);
        assert_eq!(target.get("x"), Some(75.0));
        assert!(!tween.is_complete());

        tween.advance(0.25);
        assert_eq!(target.get("x"), Some(100.0));
        assert!(tween.is_complete());
        assert_eq!(tween.progress(), 1.0);
    }

    #[test]
    fn test_overshooting_delta_clamps() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0);
        tween.animate_property("x", 10.0).unwrap();

        tween.advance(5.0);
        assert_eq!(tween.current_time(), 1.0);
        assert_eq!(target.get("x"), Some(10.0));
        assert!(tween.is_complete());
    }

    #[test]
    fn test_start_value_captured_lazily() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0).with_delay(0.5);
        tween.animate_property("x", 100.0).unwrap();

        // 创建之后、开始之前被修改的值应被尊重
        target.insert("x", 50.0);
        tween.advance(0.75);
        assert_eq!(tween.bindings()[0].start_value(), Some(50.0));
        assert_eq!(target.get("x"), Some(62.5));
    }

    #[test]
    fn test_delay_must_be_exceeded() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0).with_delay(0.5);
        tween.animate_property("x", 100.0).unwrap();
        let log = record(&mut tween);

        tween.advance(0.25);
        tween.advance(0.25);
        assert_eq!(tween.state(), TweenState::Delaying);
        assert_eq!(target.get("x"), Some(0.0));
        assert!(log.borrow().is_empty());
        assert!(!tween.has_started());

        tween.advance(0.25);
        assert_eq!(*log.borrow(), vec!["start"]);
        assert_eq!(target.get("x"), Some(25.0));
    }

    #[test]
    fn test_set_delay_adjusts_remaining() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0).with_delay(1.0);
        tween.animate_property("x", 100.0).unwrap();
        tween.advance(0.25);

        tween.set_delay(0.5);
        tween.advance(0.5);
        assert_eq!(tween.state(), TweenState::Active);
        assert_eq!(target.get("x"), Some(25.0));
    }

    #[test]
    fn test_repeat_reverse_callbacks() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0)
            .with_repeat(2, 0.0)
            .with_reverse(true);
        tween.animate_property("x", 100.0).unwrap();
        let log = record(&mut tween);

        tween.advance(0.5);
        assert_eq!(target.get("x"), Some(50.0));
        tween.advance(0.5);
        assert_eq!(target.get("x"), Some(100.0));
        assert_eq!(tween.current_cycle(), 1);

        // 第二轮从目标值回到起始值
        tween.advance(0.25);
        assert_eq!(target.get("x"), Some(75.0));
        tween.advance(0.75);
        assert_eq!(target.get("x"), Some(0.0));

        assert!(tween.is_complete());
        assert_eq!(*log.borrow(), vec!["start", "repeat", "complete"]);
        assert_eq!(tween.end_value_of_property("x"), Ok(100.0));
    }

    #[test]
    fn test_repeat_without_reverse_restarts() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0).with_repeat(3, 0.0);
        tween.animate_property("x", 100.0).unwrap();

        tween.advance(1.25);
        assert_eq!(target.get("x"), Some(25.0));
        assert_eq!(tween.remaining_repeats(), Some(2));

        tween.advance(2.0);
        assert_eq!(target.get("x"), Some(100.0));
        assert!(tween.is_complete());
        assert_eq!(tween.remaining_repeats(), Some(0));
    }

    #[test]
    fn test_repeat_delay_holds_value() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0).with_repeat(2, 0.5);
        tween.animate_property("x", 100.0).unwrap();

        tween.advance(1.25);
        assert_eq!(tween.state(), TweenState::RepeatDelay);
        assert_eq!(target.get("x"), Some(100.0));

        tween.advance(0.5);
        assert_eq!(tween.state(), TweenState::Active);
        assert_eq!(target.get("x"), Some(25.0));
    }

    #[test]
    fn test_carry_over_single_advance() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0)
            .with_delay(0.5)
            .with_repeat(3, 0.25)
            .with_reverse(true);
        tween.animate_property("x", 100.0).unwrap();
        let log = record(&mut tween);

        // delay + total + 2 * (total + repeat_delay)
        tween.advance(4.0);
        assert!(tween.is_complete());
        assert_eq!(target.get("x"), Some(100.0));
        assert_eq!(*log.borrow(), vec!["start", "repeat", "repeat", "complete"]);
    }

    #[test]
    fn test_infinite_repeat_never_completes() {
        let target = bag();
        let mut tween = Tween::new(&target, 0.5).with_repeat(0, 0.0);
        tween.animate_property("x", 10.0).unwrap();

        for _ in 0..100 {
            tween.advance(0.25);
        }
        assert!(!tween.is_complete());
        assert_eq!(tween.remaining_repeats(), None);
        assert_eq!(tween.current_cycle(), 50);
    }

    #[test]
    fn test_huge_delta_on_infinite_repeat_is_bounded() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0).with_repeat(0, 0.0);
        tween.animate_property("x", 100.0).unwrap();

        tween.advance(1.0e8);
        assert!(!tween.is_complete());
        assert_eq!(target.get("x"), Some(100.0));

        // 之后的推进照常进行
        tween.advance(0.5);
        assert_eq!(tween.state(), TweenState::Active);
        assert_eq!(target.get("x"), Some(50.0));
    }

    #[test]
    fn test_non_finite_delta_is_noop() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0).with_repeat(0, 0.0);
        tween.animate_property("x", 100.0).unwrap();

        tween.advance(f32::INFINITY);
        assert_eq!(tween.state(), TweenState::Delaying);
        assert!(!tween.has_started());
        assert_eq!(target.get("x"), Some(0.0));

        tween.advance(0.25);
        tween.advance(f32::INFINITY);
        tween.advance(f32::NEG_INFINITY);
        assert_eq!(tween.current_time(), 0.25);
        assert_eq!(target.get("x"), Some(25.0));
    }

    #[test]
    fn test_skipped_cycles_keep_reverse_direction() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0)
            .with_repeat(0, 0.0)
            .with_reverse(true);
        tween.animate_property("x", 100.0).unwrap();

        // 第 100 轮为正向
        tween.advance(100.25);
        assert_eq!(tween.current_cycle(), 100);
        assert_eq!(target.get("x"), Some(25.0));

        // 第 101 轮为反向
        tween.advance(1.0);
        assert_eq!(tween.current_cycle(), 101);
        assert_eq!(target.get("x"), Some(75.0));
    }

    #[test]
    fn test_skipped_cycles_stop_at_last_repeat() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0).with_repeat(50, 0.0);
        tween.animate_property("x", 100.0).unwrap();
        let log = record(&mut tween);

        tween.advance(100.0);
        assert!(tween.is_complete());
        assert_eq!(tween.current_cycle(), 49);
        assert_eq!(target.get("x"), Some(100.0));
        assert_eq!(*log.borrow(), vec!["start", "repeat", "complete"]);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let target = bag();
        let mut tween = Tween::new(&target, 0.0).with_repeat(0, 0.0);
        tween.animate_property("x", 7.0).unwrap();
        let log = record(&mut tween);

        tween.advance(0.01);
        assert!(tween.is_complete());
        assert_eq!(target.get("x"), Some(7.0));
        assert_eq!(*log.borrow(), vec!["start", "complete"]);
    }

    #[test]
    fn test_zero_and_negative_delta_are_noops() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0);
        tween.animate_property("x", 10.0).unwrap();

        tween.advance(0.0);
        tween.advance(-1.0);
        assert_eq!(tween.state(), TweenState::Delaying);
        assert!(!tween.has_started());
    }

    #[test]
    fn test_rebinding_replaces_target_value() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0);
        tween.animate_property("x", 10.0).unwrap();
        tween.animate_property("x", 20.0).unwrap();

        assert_eq!(tween.bindings().len(), 1);
        assert_eq!(tween.end_value_of_property("x"), Ok(20.0));
    }

    #[test]
    fn test_end_value_of_unbound_property() {
        let target = bag();
        let tween = Tween::new(&target, 1.0);
        assert_eq!(
            tween.end_value_of_property("alpha"),
            Err(TweenError::NotAnimated {
                property: "alpha".to_string()
            })
        );
    }

    #[test]
    fn test_convenience_bindings() {
        let target = Rc::new(
            PropertyBag::new()
                .with("x", 0.0)
                .with("y", 0.0)
                .with("scaleX", 1.0)
                .with("scaleY", 1.0)
                .with("alpha", 1.0),
        );
        let mut tween = Tween::new(&target, 1.0);
        tween.move_to(10.0, 20.0);
        tween.scale_to(2.0);
        tween.fade_to(0.0);
        tween
            .animate_properties([("x", 30.0), ("rotation#deg", 90.0)])
            .unwrap();

        assert_eq!(tween.bindings().len(), 6);
        assert_eq!(tween.end_value_of_property("x"), Ok(30.0));
        assert_eq!(tween.end_value_of_property("scaleY"), Ok(2.0));
        assert_eq!(tween.end_value_of_property("rotation#deg"), Ok(90.0));
    }

    #[test]
    fn test_invalid_property_name() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0);
        assert!(matches!(
            tween.animate_property("x#hsl", 1.0),
            Err(TweenError::InvalidProperty { .. })
        ));
        assert!(tween.bindings().is_empty());
    }

    #[test]
    fn test_unknown_transition_fails_early() {
        let target = bag();
        let result = Tween::new(&target, 1.0).with_transition("wobble");
        assert!(matches!(
            result,
            Err(TweenError::UnknownTransition { .. })
        ));
    }

    #[test]
    fn test_transition_fn_takes_precedence() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0).with_transition("easeIn").unwrap();
        tween.set_transition_fn(|t| t * 0.5);
        tween.animate_property("x", 100.0).unwrap();

        tween.advance(0.5);
        assert_eq!(target.get("x"), Some(25.0));
        assert_eq!(tween.progress(), 0.25);
    }

    #[test]
    fn test_transition_from_registry() {
        let mut registry = TransitionRegistry::new();
        registry.register("half", |t| t / 2.0);

        let target = bag();
        let mut tween = Tween::new(&target, 1.0);
        tween.set_transition_from(&registry, "half").unwrap();
        tween.animate_property("x", 100.0).unwrap();
        tween.advance(1.0);

        assert_eq!(tween.transition_name(), "half");
        assert_eq!(target.get("x"), Some(50.0));
    }

    #[test]
    fn test_round_to_int() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0).with_round_to_int(true);
        tween.animate_property("x", 10.0).unwrap();

        tween.advance(0.125);
        assert_eq!(target.get("x"), Some(1.0));
    }

    #[test]
    fn test_binding_error_disables_only_that_binding() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0);
        tween.animate_property("missing", 5.0).unwrap();
        tween.animate_property("x", 10.0).unwrap();

        tween.advance(0.5);
        tween.advance(0.25);
        assert_eq!(target.get("x"), Some(7.5));

        // 只上报一次
        let errors = tween.take_errors();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], TweenError::Binding { .. }));
        assert!(tween.bindings()[0].is_failed());

        tween.advance(0.25);
        assert!(tween.take_errors().is_empty());
        assert!(tween.is_complete());
    }

    #[test]
    fn test_binding_added_while_active() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0);
        tween.animate_property("x", 100.0).unwrap();
        tween.advance(0.5);

        target.insert("y", 40.0);
        tween.animate_property("y", 0.0).unwrap();
        tween.advance(0.25);
        assert_eq!(tween.bindings()[1].start_value(), Some(40.0));
        assert_eq!(target.get("y"), Some(10.0));
    }

    #[test]
    fn test_stop_skips_on_complete() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0);
        tween.animate_property("x", 10.0).unwrap();
        tween.set_next_tween(Tween::new(&target, 1.0));
        let log = record(&mut tween);

        tween.advance(0.5);
        tween.stop();
        assert!(tween.is_complete());
        assert_eq!(*log.borrow(), vec!["start"]);
        assert!(Animatable::take_next(&mut tween).is_none());

        tween.advance(1.0);
        assert_eq!(target.get("x"), Some(5.0));
    }

    #[test]
    fn test_next_tween_handoff() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0);
        tween.set_next_tween(Tween::new(&target, 2.0));

        assert!(Animatable::take_next(&mut tween).is_none());
        assert!(tween.next_tween().is_some());

        tween.advance(1.0);
        let next = Animatable::take_next(&mut tween);
        assert!(next.is_some());
        assert!(tween.next_tween().is_none());
    }

    #[test]
    fn test_target_is_not_kept_alive() {
        let target = bag();
        let mut tween = Tween::new(&target, 1.0);
        tween.animate_property("x", 10.0).unwrap();
        drop(target);

        assert!(tween.target().is_none());
        tween.advance(0.5);
        assert_eq!(tween.take_errors().len(), 1);
    }
}
