//! # Animatable 模块
//!
//! 调度器驱动对象的最小接口。

/// 单次推进中逐个处理的周期上限，超出部分直接跳过
pub(crate) const MAX_CATCH_UP: u32 = 16;

/// 可被调度器逐帧推进的对象
///
/// 调度器每帧调用 [`advance`](Self::advance)，之后轮询
/// [`is_complete`](Self::is_complete)；完成的对象被移除，
/// 并通过 [`take_next`](Self::take_next) 交出后续对象的所有权。
pub trait Animatable {
    /// 推进时间（秒）
    fn advance(&mut self, dt: f32);

    /// 是否已结束
    fn is_complete(&self) -> bool;

    /// 结束后需要接着调度的对象
    fn take_next(&mut self) -> Option<Box<dyn Animatable>> {
        None
    }
}

/// 延迟调用
///
/// 等待 `delay` 秒后调用一次闭包；`repeat_count` 大于 1 时按相同间隔重复，
/// 为 0 时无限重复。
pub struct DelayedCall {
    delay: f32,
    elapsed: f32,
    repeat_count: u32,
    calls: u32,
    callback: Box<dyn FnMut()>,
}

impl std::fmt::Debug for DelayedCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelayedCall")
            .field("delay", &self.delay)
            .field("elapsed", &self.elapsed)
            .field("repeat_count", &self.repeat_count)
            .field("calls", &self.calls)
            .finish()
    }
}

impl DelayedCall {
    /// 创建只调用一次的延迟调用
    pub fn new(delay: f32, callback: impl FnMut() + 'static) -> Self {
        Self {
            delay: delay.max(0.0),
            elapsed: 0.0,
            repeat_count: 1,
            calls: 0,
            callback: Box::new(callback),
        }
    }

    /// 设置重复次数，0 表示无限
    pub fn with_repeat(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    /// 已调用次数
    pub fn calls(&self) -> u32 {
        self.calls
    }

    /// 积压的调用过多时只保留最后一次，其余计数但不调用
    fn skip_overdue_calls(&mut self) {
        if self.delay <= 0.0 {
            return;
        }
        let delay = f64::from(self.delay);
        let elapsed = f64::from(self.elapsed);
        let pending = (elapsed / delay).floor();
        if pending <= f64::from(MAX_CATCH_UP) {
            return;
        }

        let mut skip = pending - 1.0;
        let mut rest = delay + elapsed % delay;
        if self.repeat_count != 0 {
            let cap = f64::from(self.repeat_count - self.calls - 1);
            if skip > cap {
                skip = cap;
                rest = elapsed - skip * delay;
            }
        }
        self.calls = self.calls.saturating_add(skip as u32);
        self.elapsed = rest as f32;
    }
}

impl Animatable for DelayedCall {
    fn advance(&mut self, dt: f32) {
        if self.is_complete() || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        self.elapsed += dt;
        self.skip_overdue_calls();
        while self.elapsed >= self.delay && !self.is_complete() {
            self.elapsed -= self.delay;
            self.calls = self.calls.saturating_add(1);
            (self.callback)();
            if self.delay <= 0.0 && self.repeat_count == 0 {
                // 零间隔的无限调用每帧只触发一次
                self.elapsed = 0.0;
                break;
            }
        }
    }

    fn is_complete(&self) -> bool {
        self.repeat_count != 0 && self.calls >= self.repeat_count
    }
}
