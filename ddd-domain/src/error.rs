//! 领域层统一错误定义
//!
//! 聚焦事件分发、工作单元、仓储与序列化等最小必要集合。
//! 事件总线本身不包装下游错误：处理器、发布器与工作单元返回的错误原样向上传播。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    // --- 事件系统 ---
    #[error("event bus error: {reason}")]
    EventBus { reason: String },
    #[error("event handler error: handler={handler}, reason={reason}")]
    EventHandler { handler: String, reason: String },

    // --- 取消 ---
    #[error("operation cancelled: {operation}")]
    Cancelled { operation: &'static str },

    // --- 仓储/持久化 ---
    #[error("repository error: {reason}")]
    Repository { reason: String },
    #[error("entity keys not configured: {entity}")]
    KeysNotConfigured { entity: &'static str },

    // --- 领域规则 ---
    #[error("invalid value: {reason}")]
    InvalidValue { reason: String },
    #[error("not found: {reason}")]
    NotFound { reason: String },
}

impl DomainError {
    pub fn event_bus(reason: impl Into<String>) -> Self {
        Self::EventBus {
            reason: reason.into(),
        }
    }

    pub fn cancelled(operation: &'static str) -> Self {
        Self::Cancelled { operation }
    }

    /// 是否为取消导致的错误
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
