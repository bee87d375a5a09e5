//! 内存版进程内事件总线（InMemoryEventBus）
//!
//! 以 `TypeId` 为键注册类型化处理器，满足 `EventBus` 协议：
//! - `publish`：按注册顺序依次调用该事件类型的全部处理器，首个错误原样返回；
//! - `registered_event_types`：返回已注册处理器的事件类型；
//! - 没有处理器的事件视为已处理。

use super::{DispatchContext, EventBus, EventHandler};
use crate::domain_event::{AnyEvent, Event, EventType};
use crate::error::{DomainError, DomainResult as Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::any::{TypeId, type_name};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::trace;

#[async_trait]
trait ErasedHandler: Send + Sync {
    fn handler_name(&self) -> &str;

    async fn handle(&self, event: &dyn AnyEvent, ctx: &DispatchContext) -> Result<()>;
}

struct TypedHandler<E, H> {
    inner: Arc<H>,
    _marker: PhantomData<fn(E)>,
}

#[async_trait]
impl<E, H> ErasedHandler for TypedHandler<E, H>
where
    E: Event,
    H: EventHandler<E> + 'static,
{
    fn handler_name(&self) -> &str {
        self.inner.handler_name()
    }

    async fn handle(&self, event: &dyn AnyEvent, ctx: &DispatchContext) -> Result<()> {
        // 键与处理器同一泛型 E，正常情况下 downcast 不会失败
        let Some(typed) = event.as_any().downcast_ref::<E>() else {
            return Err(DomainError::TypeMismatch {
                expected: type_name::<E>(),
                found: event.event_type().name(),
            });
        };
        self.inner.handle(typed, ctx).await
    }
}

#[derive(Clone)]
struct HandlerEntry {
    event_type: EventType,
    handlers: Vec<Arc<dyn ErasedHandler>>,
}

/// 基于内存的进程内事件总线
#[derive(Default)]
pub struct InMemoryEventBus {
    handlers: DashMap<TypeId, HandlerEntry>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册事件处理器，同一事件类型可注册多个处理器
    pub fn register<E, H>(&self, handler: Arc<H>)
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        let erased: Arc<dyn ErasedHandler> = Arc::new(TypedHandler::<E, H> {
            inner: handler,
            _marker: PhantomData,
        });

        self.handlers
            .entry(TypeId::of::<E>())
            .or_insert_with(|| HandlerEntry {
                event_type: EventType::of::<E>(),
                handlers: Vec::new(),
            })
            .handlers
            .push(erased);
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: &dyn AnyEvent, ctx: &DispatchContext) -> Result<()> {
        let event_type = event.event_type();
        // 先克隆处理器列表，避免跨 await 持有 DashMap 的读锁
        let Some(handlers) = self
            .handlers
            .get(&event_type.type_id())
            .map(|entry| entry.handlers.clone())
        else {
            trace!(event_type = %event_type, "no handler registered");
            return Ok(());
        };

        for handler in handlers {
            trace!(event_type = %event_type, handler = handler.handler_name(), "handling event");
            handler.handle(event, ctx).await?;
        }
        Ok(())
    }

    fn registered_event_types(&self) -> Vec<EventType> {
        self.handlers.iter().map(|e| e.value().event_type).collect()
    }
}
