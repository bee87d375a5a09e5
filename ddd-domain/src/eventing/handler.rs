//! 事件处理器（EventHandler）
//!
//! 处理某一具体事件类型，工作单元等横切信息通过 `DispatchContext` 显式传入。
//!
use super::DispatchContext;
use crate::domain_event::Event;
use crate::error::DomainResult as Result;
use async_trait::async_trait;

/// 事件处理器：处理某一类型的事件
#[async_trait]
pub trait EventHandler<E>: Send + Sync
where
    E: Event,
{
    /// 处理器名称（用于日志与错误定位）
    fn handler_name(&self) -> &str;

    /// 处理事件
    async fn handle(&self, event: &E, ctx: &DispatchContext) -> Result<()>;
}
