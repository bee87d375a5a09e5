//! 领域事件（Domain Event）能力与分类
//!
//! 事件类型在编译期通过 [`EventDescriptor`] 声明能力（领域事件/集成事件/领域查询），
//! 分类器据此决定是否关联工作单元以及投递到哪条总线。

mod capabilities;
mod classifier;
mod descriptor;
mod domain_query;
mod event_trait;

pub use capabilities::EventCapabilities;
pub use classifier::{EventClass, Route, classify, is_domain_query};
pub use ddd_macros::Event;
pub use descriptor::{EventDescriptor, EventType};
pub use domain_query::DomainQuery;
pub use event_trait::{AnyEvent, Event};
