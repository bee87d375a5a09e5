use super::capabilities::EventCapabilities;
use super::descriptor::EventDescriptor;
use super::event_trait::Event;
use serde::Serialize;
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

/// 领域查询基类型
///
/// 读请求的泛型载体，`R` 为查询结果类型。它与领域事件共享 `DOMAIN_EVENT`
/// 能力，但由于携带 `DOMAIN_QUERY`，分发时不会关联工作单元。
/// 具体查询通过 `#[event(extends = DomainQuery<R>)]` 声明其为基类型：
///
/// ```
/// use ddd_domain::domain_event::{DomainQuery, Event, classify};
/// use serde::Serialize;
///
/// #[derive(Debug, Serialize)]
/// struct OrderDto;
///
/// #[derive(Debug, Serialize, Event)]
/// #[event(extends = DomainQuery<OrderDto>)]
/// struct GetOrderById {
///     order_id: u64,
/// }
///
/// let class = classify(&GetOrderById::descriptor());
/// assert!(class.domain_query);
/// assert!(!class.attaches_unit_of_work());
/// ```
#[derive(Serialize)]
#[serde(bound = "")]
pub struct DomainQuery<R> {
    #[serde(skip)]
    _result: PhantomData<fn() -> R>,
}

impl<R> DomainQuery<R> {
    pub fn new() -> Self {
        Self {
            _result: PhantomData,
        }
    }
}

impl<R> Default for DomainQuery<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for DomainQuery<R> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for DomainQuery<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DomainQuery<{}>", type_name::<R>())
    }
}

impl<R: 'static> Event for DomainQuery<R> {
    fn descriptor() -> EventDescriptor {
        EventDescriptor::new(type_name::<Self>())
            .with_capabilities(EventCapabilities::DOMAIN_EVENT | EventCapabilities::DOMAIN_QUERY)
            .parameterized()
    }
}
