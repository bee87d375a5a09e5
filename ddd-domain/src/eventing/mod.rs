//! 事件子系统（eventing）
//!
//! 提供领域事件的分类、排队与提交协调：
//! - `DomainEventBus`：编排者，决定事件走进程内还是跨服务，并与工作单元协调投递时机；
//! - `EventBus` / `InMemoryEventBus`：进程内事件总线与类型化处理器；
//! - `IntegrationEventBus` / `Publisher`：集成事件序列化并交给消息代理客户端；
//! - `DispatchContext`：随事件显式传递的工作单元与取消信号。
//!
pub mod bus;
pub mod bus_inmemory;
pub mod context;
pub mod domain_bus;
pub mod handler;
pub mod integration;
mod pending;

pub use bus::EventBus;
pub use bus_inmemory::InMemoryEventBus;
pub use context::DispatchContext;
pub use domain_bus::{DomainEventBus, DomainEventBusOptions};
pub use handler::EventHandler;
pub use integration::{
    IntegrationEventBus, IntegrationMessage, Publisher, PublisherIntegrationEventBus,
};
