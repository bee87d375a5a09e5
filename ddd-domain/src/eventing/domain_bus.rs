//! 领域事件总线（DomainEventBus）
//!
//! 组合工作单元、分类器与两条下游总线：
//! - `publish`：分类事件，真正的领域事件携带工作单元；集成事件优先进入集成事件总线，
//!   其余进入进程内事件总线，二者互斥；
//! - `enqueue`：仅入队，不分类，分类在排空时进行；
//! - `publish_queue`：按 FIFO 排空待发布队列；
//! - `commit`：先提交工作单元，提交成功后再排空队列，使事件只在其描述的数据持久化后可见；
//! - `rollback`：回滚工作单元并丢弃待发布事件。
//!
//! 总线不重试、不包装下游错误；失败的事件留在队首等待下一次排空。
//!
use super::pending::{Drain, PendingQueue};
use super::{DispatchContext, EventBus, IntegrationEventBus};
use crate::domain_event::{AnyEvent, Event, EventClass, EventType, Route, classify};
use crate::error::{DomainError, DomainResult as Result};
use crate::unit_of_work::UnitOfWork;
use bon::Builder;
use dashmap::DashMap;
use std::any::TypeId;
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// 领域事件总线配置
#[derive(Builder, Clone, Debug, Default)]
pub struct DomainEventBusOptions {
    /// 静态配置的已知事件类型
    #[builder(default)]
    known_event_types: Vec<EventType>,
}

impl DomainEventBusOptions {
    pub fn known_event_types(&self) -> &[EventType] {
        &self.known_event_types
    }

    /// 追加一个已知事件类型
    pub fn with_event<E: Event>(mut self) -> Self {
        self.known_event_types.push(EventType::of::<E>());
        self
    }
}

/// 领域事件总线
pub struct DomainEventBus {
    event_bus: Arc<dyn EventBus>,
    integration_event_bus: Arc<dyn IntegrationEventBus>,
    unit_of_work: Arc<dyn UnitOfWork>,
    options: DomainEventBusOptions,
    queue: PendingQueue,
    classes: DashMap<TypeId, EventClass>,
    cancellation: CancellationToken,
}

impl DomainEventBus {
    pub fn new(
        event_bus: Arc<dyn EventBus>,
        integration_event_bus: Arc<dyn IntegrationEventBus>,
        unit_of_work: Arc<dyn UnitOfWork>,
        options: DomainEventBusOptions,
    ) -> Self {
        Self {
            event_bus,
            integration_event_bus,
            unit_of_work,
            options,
            queue: PendingQueue::new(),
            classes: DashMap::new(),
            cancellation: CancellationToken::new(),
        }
    }

    /// 绑定作用域的取消信号，用于投递、排空与提交
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn unit_of_work(&self) -> &Arc<dyn UnitOfWork> {
        &self.unit_of_work
    }

    pub fn options(&self) -> &DomainEventBusOptions {
        &self.options
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// 立即分发事件，返回时所选下游总线已完成投递
    pub async fn publish<E: Event>(&self, event: &E) -> Result<()> {
        self.dispatch(event).await
    }

    /// 将事件加入待发布队列，不做分类与投递
    pub fn enqueue<E: Event>(&self, event: E) -> Result<()> {
        self.queue.push(Box::new(event))?;
        trace!(event_type = E::descriptor().name(), "event enqueued");
        Ok(())
    }

    /// 待发布事件数量
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// 排空待发布队列，返回本次投递的事件数。
    ///
    /// 同一时刻只有一个排空者；若已有排空在进行，直接返回 0，
    /// 新入队的事件由正在进行的排空继续取出。
    pub async fn publish_queue(&self) -> Result<usize> {
        let Some(drain) = self.queue.try_drain() else {
            debug!("pending queue is already being drained");
            return Ok(0);
        };
        self.flush(drain).await
    }

    /// 提交工作单元，成功后排空待发布队列。
    ///
    /// 若另一排空正在进行，等待其结束后再排空，返回时本作用域入队的事件均已投递。
    /// 不能在事件处理器内调用：处理器运行时排空权被占用，等待将永不返回。
    pub async fn commit(&self) -> Result<()> {
        self.unit_of_work.commit(&self.cancellation).await?;
        debug!(pending = self.queue.len(), "unit of work committed, flushing events");
        let drain = self.queue.drain().await;
        self.flush(drain).await?;
        Ok(())
    }

    /// 回滚工作单元，并丢弃描述未提交状态的待发布事件
    pub async fn rollback(&self) -> Result<()> {
        self.unit_of_work.rollback(&self.cancellation).await?;
        match self.queue.try_drain() {
            Some(mut drain) => {
                let dropped = drain.clear();
                if dropped > 0 {
                    warn!(dropped, "discarded pending events after rollback");
                }
            }
            None => warn!(
                pending = self.queue.len(),
                "rollback during an active flush, pending events kept"
            ),
        }
        Ok(())
    }

    /// 已知事件类型：静态配置与进程内总线注册类型的去重并集
    pub fn all_event_types(&self) -> Vec<EventType> {
        let mut seen = HashSet::new();
        self.options
            .known_event_types()
            .iter()
            .copied()
            .chain(self.event_bus.registered_event_types())
            .filter(|t| seen.insert(*t))
            .collect()
    }

    /// 逐个投递队首事件，投递成功后才将其移出队列
    async fn flush(&self, mut drain: Drain<'_>) -> Result<usize> {
        let mut published = 0;
        while let Some(event) = drain.peek() {
            if self.cancellation.is_cancelled() {
                debug!(published, remaining = self.queue.len(), "flush cancelled");
                return Err(DomainError::cancelled("publish_queue"));
            }
            self.dispatch(event).await?;
            drain.ack();
            published += 1;
        }

        if published > 0 {
            debug!(published, "pending events flushed");
        }
        Ok(published)
    }

    fn classify(&self, event: &dyn AnyEvent) -> EventClass {
        let type_id = event.event_type().type_id();
        *self
            .classes
            .entry(type_id)
            .or_insert_with(|| classify(&event.event_descriptor()))
    }

    async fn dispatch(&self, event: &dyn AnyEvent) -> Result<()> {
        let class = self.classify(event);
        let route = class.route();
        let unit_of_work = class
            .attaches_unit_of_work()
            .then(|| self.unit_of_work.clone());

        trace!(
            event_type = event.event_descriptor().name(),
            ?route,
            attach_unit_of_work = unit_of_work.is_some(),
            transaction_has_begun = self.unit_of_work.transaction_has_begun(),
            "dispatching event"
        );

        let ctx = DispatchContext::new(unit_of_work, self.cancellation.clone());
        match route {
            Route::Integration => self.integration_event_bus.publish(event, &ctx).await,
            Route::InProcess => self.event_bus.publish(event, &ctx).await,
        }
    }
}
