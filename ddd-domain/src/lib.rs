//! DDD 领域层基础库（ddd-domain）
//!
//! 核心是领域事件分发：应用代码发布“已发生的事实”，由总线判断它是进程内的领域事件
//! 还是跨服务的集成事件，并与事务性写入协调投递时机，使事件只在其源事务提交后可见。
//! - 领域事件能力与分类（`domain_event`）：静态能力描述、领域查询识别与路由；
//! - 工作单元（`unit_of_work`）：事务边界的提交/回滚协议；
//! - 事件系统（`eventing`）：领域事件总线、进程内与集成事件总线；
//! - 持久化（`persist`）：实体仓储协议与按类型注入的主键配置。
//!
//! 典型用法：
//! 1. 使用 `#[derive(Event)]` 为事件类型声明能力；
//! 2. 组装 `InMemoryEventBus`（或自定义 `EventBus`）与 `IntegrationEventBus`；
//! 3. 以请求作用域的 `UnitOfWork` 构造 `DomainEventBus`；
//! 4. 写入期间 `enqueue` 事件，最后 `commit` 提交事务并投递队列中的事件。
//!
pub mod domain_event;
pub mod entity;
pub mod error;
pub mod eventing;
pub mod persist;
pub mod unit_of_work;

// 允许在本 crate 内部通过 ::ddd_domain 进行自引用，
// 以便派生宏在本 crate 的单元测试中也能解析到 ::ddd_domain 路径。
extern crate self as ddd_domain;
