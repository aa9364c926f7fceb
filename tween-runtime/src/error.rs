//! # Error 模块
//!
//! 定义 tween-runtime 中使用的错误类型。

use thiserror::Error;

/// 属性绑定失败的原因
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingFailure {
    /// 目标对象已被释放
    #[error("目标对象已释放")]
    TargetDropped,

    /// 目标对象没有该属性
    #[error("目标对象不存在该属性")]
    MissingProperty,

    /// 目标对象拒绝写入
    #[error("目标对象拒绝写入")]
    Rejected,
}

/// tween-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// 过渡函数未注册
    #[error("未知的过渡函数 '{name}'")]
    UnknownTransition { name: String },

    /// 属性读写失败
    #[error("属性 '{property}' 绑定失败：{reason}")]
    Binding {
        property: String,
        reason: BindingFailure,
    },

    /// 查询未被动画的属性
    #[error("属性 '{property}' 未被动画")]
    NotAnimated { property: String },

    /// 属性名格式错误
    #[error("无效的属性名 '{name}'：{message}")]
    InvalidProperty { name: String, message: String },

    /// 配置解析或读取失败
    #[error("配置错误: {message}")]
    Config { message: String },
}

impl TweenError {
    pub(crate) fn binding(property: impl Into<String>, reason: BindingFailure) -> Self {
        Self::Binding {
            property: property.into(),
            reason,
        }
    }

    pub(crate) fn invalid_property(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidProperty {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Result 类型别名
pub type TweenResult<T> = Result<T, TweenError>;
