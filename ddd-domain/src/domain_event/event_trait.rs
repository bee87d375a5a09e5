use super::descriptor::{EventDescriptor, EventType};
use crate::error::DomainResult;
use serde::Serialize;
use std::any::Any;
use std::fmt;

/// 事件值需要满足的能力边界
///
/// 事件是不可变的值对象，分类信息通过 [`Event::descriptor`] 静态声明，
/// 通常使用 `#[derive(Event)]` 生成：
///
/// ```
/// use ddd_domain::domain_event::{Event, EventCapabilities};
/// use serde::Serialize;
///
/// #[derive(Debug, Serialize, Event)]
/// #[event(domain, name = "order.placed")]
/// struct OrderPlaced {
///     order_id: u64,
/// }
///
/// let desc = OrderPlaced::descriptor();
/// assert_eq!(desc.name(), "order.placed");
/// assert!(desc.effective_capabilities().contains(EventCapabilities::DOMAIN_EVENT));
/// ```
pub trait Event: Serialize + fmt::Debug + Send + Sync + 'static {
    /// 事件类型的静态描述
    fn descriptor() -> EventDescriptor;
}

/// 类型擦除后的事件视图，用于待发布队列与下游接收端
pub trait AnyEvent: fmt::Debug + Send + Sync {
    fn event_descriptor(&self) -> EventDescriptor;

    fn event_type(&self) -> EventType;

    fn as_any(&self) -> &dyn Any;

    /// 序列化为 JSON 载荷（集成事件投递使用）
    fn to_payload(&self) -> DomainResult<serde_json::Value>;
}

impl<E: Event> AnyEvent for E {
    fn event_descriptor(&self) -> EventDescriptor {
        E::descriptor()
    }

    fn event_type(&self) -> EventType {
        EventType::of::<E>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_payload(&self) -> DomainResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}
