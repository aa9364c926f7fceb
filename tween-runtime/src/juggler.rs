//! # Juggler 模块
//!
//! 逐帧调度器：持有所有活跃的 [`Animatable`]，统一推进，
//! 自动移除已完成的对象并接管它们交出的后续对象。
//!
//! ```rust,ignore
//! let mut juggler = Juggler::new();
//! juggler.add_tween(tween);
//!
//! // 主循环
//! juggler.advance(dt);
//! for event in juggler.take_events() { /* ... */ }
//! ```

use tracing::debug;

use crate::animatable::{Animatable, DelayedCall};
use crate::tween::Tween;

/// 调度对象 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimId(u64);

impl AnimId {
    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for AnimId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AnimId({})", self.0)
    }
}

/// 调度事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JugglerEvent {
    /// 对象被加入
    Added(AnimId),
    /// 对象完成并被移除
    Completed(AnimId),
    /// 完成的对象交出了后续对象
    Chained { from: AnimId, to: AnimId },
    /// 对象被手动移除
    Removed(AnimId),
}

struct Entry {
    id: AnimId,
    object: Box<dyn Animatable>,
}

/// 调度器
///
/// 本身也实现 [`Animatable`]，可以嵌套在另一个调度器中；它永远不会完成。
pub struct Juggler {
    objects: Vec<Entry>,
    elapsed_time: f32,
    next_id: u64,
    events: Vec<JugglerEvent>,
}

impl Default for Juggler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Juggler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Juggler")
            .field("objects", &self.objects.len())
            .field("elapsed_time", &self.elapsed_time)
            .finish()
    }
}

impl Juggler {
    /// 创建空调度器
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            elapsed_time: 0.0,
            next_id: 1,
            events: Vec::new(),
        }
    }

    fn next_anim_id(&mut self) -> AnimId {
        let id = AnimId(self.next_id);
        self.next_id += 1;
        id
    }

    // ========== 对象管理 ==========

    /// 加入对象，从下一次 `advance` 开始推进
    pub fn add(&mut self, object: Box<dyn Animatable>) -> AnimId {
        let id = self.next_anim_id();
        self.objects.push(Entry { id, object });
        self.events.push(JugglerEvent::Added(id));
        debug!(id = id.value(), "Juggler 加入对象");
        id
    }

    /// 加入 Tween
    pub fn add_tween(&mut self, tween: Tween) -> AnimId {
        self.add(Box::new(tween))
    }

    /// 延迟调用闭包
    pub fn delay_call(&mut self, delay: f32, callback: impl FnMut() + 'static) -> AnimId {
        self.add(Box::new(DelayedCall::new(delay, callback)))
    }

    /// 移除对象；不会启动它的后续对象
    pub fn remove(&mut self, id: AnimId) -> bool {
        let before = self.objects.len();
        self.objects.retain(|entry| entry.id != id);
        let removed = self.objects.len() != before;
        if removed {
            self.events.push(JugglerEvent::Removed(id));
            debug!(id = id.value(), "Juggler 移除对象");
        }
        removed
    }

    /// 移除所有对象
    pub fn purge(&mut self) {
        for entry in self.objects.drain(..) {
            self.events.push(JugglerEvent::Removed(entry.id));
        }
        debug!("Juggler 已清空");
    }

    /// 是否包含对象
    pub fn contains(&self, id: AnimId) -> bool {
        self.objects.iter().any(|entry| entry.id == id)
    }

    /// 对象数量
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// 累计推进的时间
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    // ========== 推进 ==========

    /// 推进所有对象
    ///
    /// 本帧加入的后续对象从下一帧开始推进。
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.elapsed_time += dt;

        let mut chained: Vec<(AnimId, Box<dyn Animatable>)> = Vec::new();
        let mut completed: Vec<AnimId> = Vec::new();

        for entry in &mut self.objects {
            entry.object.advance(dt);
            if entry.object.is_complete() {
                completed.push(entry.id);
                if let Some(next) = entry.object.take_next() {
                    chained.push((entry.id, next));
                }
            }
        }

        if !completed.is_empty() {
            self.objects.retain(|entry| !completed.contains(&entry.id));
            for id in completed {
                self.events.push(JugglerEvent::Completed(id));
            }
        }

        for (from, next) in chained {
            let to = self.add(next);
            self.events.push(JugglerEvent::Chained { from, to });
            debug!(from = from.value(), to = to.value(), "Juggler 接管后续对象");
        }
    }

    /// 取出并清空事件队列
    pub fn take_events(&mut self) -> Vec<JugglerEvent> {
        std::mem::take(&mut self.events)
    }
}

impl Animatable for Juggler {
    fn advance(&mut self, dt: f32) {
        Juggler::advance(self, dt);
    }

    fn is_complete(&self) -> bool {
        false
    }
}
