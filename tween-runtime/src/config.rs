//! # Config 模块
//!
//! Tween 的声明式配置，可从 JSON 加载。
//!
//! ```json
//! {
//!   "time": 2.0,
//!   "transition": "easeInOut",
//!   "delay": 0.5,
//!   "repeat_count": 2,
//!   "reverse": true,
//!   "properties": { "x": 50.0, "rotation#deg": 90.0 },
//!   "next": { "time": 1.0, "properties": { "alpha": 0.0 } }
//! }
//! ```
//!
//! 过渡函数名和属性名在 [`TweenConfig::build`] 时校验，错误不会拖到播放阶段。

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{TweenError, TweenResult};
use crate::property::PropertyKind;
use crate::target::TweenTarget;
use crate::transition::TransitionRegistry;
use crate::tween::Tween;

/// Tween 配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TweenConfig {
    /// 时长（秒）
    pub time: f32,

    /// 过渡函数名
    #[serde(default = "default_transition")]
    pub transition: String,

    /// 延迟（秒）
    #[serde(default)]
    pub delay: f32,

    /// 重复次数，0 表示无限
    #[serde(default = "default_repeat_count")]
    pub repeat_count: u32,

    /// 两轮之间的等待时间（秒）
    #[serde(default)]
    pub repeat_delay: f32,

    /// 偶数轮反向播放
    #[serde(default)]
    pub reverse: bool,

    /// 数值取整
    #[serde(default)]
    pub round_to_int: bool,

    /// 属性名 → 目标值
    #[serde(default)]
    pub properties: BTreeMap<String, f32>,

    /// 完成后接着播放的 Tween
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<TweenConfig>>,
}

fn default_transition() -> String {
    "linear".to_string()
}

fn default_repeat_count() -> u32 {
    1
}

impl Default for TweenConfig {
    fn default() -> Self {
        Self {
            time: 0.0,
            transition: default_transition(),
            delay: 0.0,
            repeat_count: default_repeat_count(),
            repeat_delay: 0.0,
            reverse: false,
            round_to_int: false,
            properties: BTreeMap::new(),
            next: None,
        }
    }
}

impl TweenConfig {
    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> TweenResult<Self> {
        serde_json::from_str(json).map_err(|e| TweenError::Config {
            message: e.to_string(),
        })
    }

    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> TweenResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TweenError::Config {
            message: format!("无法读取 {}: {}", path.display(), e),
        })?;
        Self::from_json(&content)
    }

    /// 序列化为 JSON
    pub fn to_json(&self) -> TweenResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TweenError::Config {
            message: e.to_string(),
        })
    }

    /// 校验配置（含后续 Tween），返回所有问题
    pub fn validate(&self, registry: &TransitionRegistry) -> Vec<TweenError> {
        let mut errors = Vec::new();
        let mut current = Some(self);
        while let Some(config) = current {
            if !config.time.is_finite() || config.time < 0.0 {
                errors.push(TweenError::Config {
                    message: format!("无效的时长 {}", config.time),
                });
            }
            if let Err(e) = registry.resolve(&config.transition) {
                errors.push(e);
            }
            for name in config.properties.keys() {
                if let Err(e) = PropertyKind::parse(name) {
                    errors.push(e);
                }
            }
            current = config.next.as_deref();
        }
        errors
    }

    /// 按配置创建 Tween（含后续 Tween）
    pub fn build<T: TweenTarget>(
        &self,
        target: &Rc<T>,
        registry: &TransitionRegistry,
    ) -> TweenResult<Tween> {
        let mut tween = Tween::new(target, self.time)
            .with_delay(self.delay)
            .with_repeat(self.repeat_count, self.repeat_delay)
            .with_reverse(self.reverse)
            .with_round_to_int(self.round_to_int);
        tween.set_transition_from(registry, &self.transition)?;

        for (name, value) in &self.properties {
            tween.animate_property(name, *value)?;
        }

        if let Some(next) = &self.next {
            tween.set_next_tween(next.build(target, registry)?);
        }
        Ok(tween)
    }
}
