//! # Target 模块
//!
//! 动画目标接口：按名称读写 f32 属性。
//!
//! Tween 不知道目标的具体类型，只通过 [`TweenTarget`] 访问属性。
//! 目标以 `Rc<T>` 共享，内部可变性由目标自己负责（通常是 `RefCell`）。
//!
//! 提供两种现成实现：
//! - [`PropertyBag`]：名称 → 值的动态表
//! - [`Reflected`]：为普通结构体附加一张 [`PropertyTable`] 反射表

use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;

/// 可被 Tween 驱动的目标对象
///
/// ## 实现示例
///
/// ```rust,ignore
/// struct Sprite {
///     data: RefCell<SpriteData>,
/// }
///
/// impl TweenTarget for Sprite {
///     fn get_property(&self, property_id: &str) -> Option<f32> {
///         let data = self.data.borrow();
///         match property_id {
///             "x" => Some(data.x),
///             "alpha" => Some(data.alpha),
///             _ => None,
///         }
///     }
///
///     fn set_property(&self, property_id: &str, value: f32) -> bool {
///         let mut data = self.data.borrow_mut();
///         match property_id {
///             "x" => { data.x = value; true }
///             "alpha" => { data.alpha = value; true }
///             _ => false,
///         }
///     }
///
///     fn property_list(&self) -> Vec<String> {
///         vec!["x".into(), "alpha".into()]
///     }
/// }
/// ```
pub trait TweenTarget: 'static {
    /// 获取属性的当前值
    ///
    /// # 返回
    /// - `Some(value)`: 属性存在
    /// - `None`: 属性不存在
    fn get_property(&self, property_id: &str) -> Option<f32>;

    /// 设置属性的新值
    ///
    /// # 返回
    /// - `true`: 设置成功
    /// - `false`: 属性不存在或设置失败
    fn set_property(&self, property_id: &str, value: f32) -> bool;

    /// 所有可动画属性的列表（用于调试）
    fn property_list(&self) -> Vec<String>;
}

/// 动态属性表
///
/// 只接受已存在的属性名，写入未知属性会失败。
#[derive(Debug, Default)]
pub struct PropertyBag {
    values: RefCell<BTreeMap<String, f32>>,
}

impl PropertyBag {
    /// 创建空表
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加属性（构建器）
    pub fn with(self, property_id: impl Into<String>, value: f32) -> Self {
        self.insert(property_id, value);
        self
    }

    /// 添加或覆盖属性
    pub fn insert(&self, property_id: impl Into<String>, value: f32) {
        self.values.borrow_mut().insert(property_id.into(), value);
    }

    /// 移除属性
    pub fn remove(&self, property_id: &str) -> Option<f32> {
        self.values.borrow_mut().remove(property_id)
    }

    /// 读取属性（`get_property` 的简写）
    pub fn get(&self, property_id: &str) -> Option<f32> {
        self.values.borrow().get(property_id).copied()
    }

    /// 当前所有属性的快照
    pub fn snapshot(&self) -> BTreeMap<String, f32> {
        self.values.borrow().clone()
    }
}

impl TweenTarget for PropertyBag {
    fn get_property(&self, property_id: &str) -> Option<f32> {
        self.get(property_id)
    }

    fn set_property(&self, property_id: &str, value: f32) -> bool {
        match self.values.borrow_mut().get_mut(property_id) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    fn property_list(&self) -> Vec<String> {
        self.values.borrow().keys().cloned().collect()
    }
}

/// 属性 getter
pub type Getter<T> = fn(&T) -> f32;
/// 属性 setter
pub type Setter<T> = fn(&mut T, f32);

/// 反射表：属性名 → (getter, setter)
pub struct PropertyTable<T> {
    entries: Vec<(&'static str, Getter<T>, Setter<T>)>,
}

impl<T> PropertyTable<T> {
    /// 创建空表
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// 注册属性（构建器）；同名属性覆盖旧条目
    pub fn with(mut self, property_id: &'static str, get: Getter<T>, set: Setter<T>) -> Self {
        self.entries.retain(|(name, _, _)| *name != property_id);
        self.entries.push((property_id, get, set));
        self
    }

    fn find(&self, property_id: &str) -> Option<&(&'static str, Getter<T>, Setter<T>)> {
        self.entries.iter().find(|(name, _, _)| *name == property_id)
    }

    /// 已注册的属性名
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _, _)| *name)
    }
}

impl<T> Default for PropertyTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for PropertyTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// 通过反射表暴露属性的包装器
///
/// ```rust,ignore
/// let table = PropertyTable::<Sprite>::new()
///     .with("x", |s| s.x, |s, v| s.x = v)
///     .with("alpha", |s| s.alpha, |s, v| s.alpha = v);
/// let sprite = Rc::new(Reflected::new(Sprite::default(), table));
/// ```
#[derive(Debug)]
pub struct Reflected<T> {
    value: RefCell<T>,
    table: PropertyTable<T>,
}

impl<T> Reflected<T> {
    /// 创建包装器
    pub fn new(value: T, table: PropertyTable<T>) -> Self {
        Self {
            value: RefCell::new(value),
            table,
        }
    }

    /// 借用内部值
    pub fn borrow(&self) -> Ref<'_, T> {
        self.value.borrow()
    }

    /// 直接修改内部值（不经过动画）
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.value.borrow_mut());
    }

    /// 取出内部值
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: 'static> TweenTarget for Reflected<T> {
    fn get_property(&self, property_id: &str) -> Option<f32> {
        let (_, get, _) = self.table.find(property_id)?;
        Some(get(&self.value.borrow()))
    }

    fn set_property(&self, property_id: &str, value: f32) -> bool {
        match self.table.find(property_id) {
            Some((_, _, set)) => {
                set(&mut self.value.borrow_mut(), value);
                true
            }
            None => false,
        }
    }

    fn property_list(&self) -> Vec<String> {
        self.table.names().map(str::to_string).collect()
    }
}
