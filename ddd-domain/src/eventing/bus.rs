//! 进程内事件总线（EventBus）协议
//!
//! 在调用流程内同步地把领域事件交给本地处理器。
//!
use super::DispatchContext;
use crate::domain_event::{AnyEvent, EventType};
use crate::error::DomainResult as Result;
use async_trait::async_trait;

/// 进程内事件总线：分发事件到本地处理器
#[async_trait]
pub trait EventBus: Send + Sync {
    /// 分发事件，可能对应零个或多个处理器
    async fn publish(&self, event: &dyn AnyEvent, ctx: &DispatchContext) -> Result<()>;

    /// 已注册处理器的事件类型
    fn registered_event_types(&self) -> Vec<EventType>;
}
