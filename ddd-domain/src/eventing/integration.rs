//! 集成事件总线（IntegrationEventBus）
//!
//! 跨服务边界的事件由集成事件总线负责序列化，并交给消息代理客户端（`Publisher`）。
//! 传输实现不在本 crate 范围内，`Publisher` 由基础设施层提供。
//!
use super::DispatchContext;
use crate::domain_event::AnyEvent;
use crate::error::DomainResult as Result;
use async_trait::async_trait;
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

/// 集成事件总线：负责序列化并交给消息代理
#[async_trait]
pub trait IntegrationEventBus: Send + Sync {
    async fn publish(&self, event: &dyn AnyEvent, ctx: &DispatchContext) -> Result<()>;
}

/// 投递给消息代理的集成消息
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrationMessage {
    #[builder(default = Uuid::new_v4())]
    message_id: Uuid,
    /// 主题即事件描述名
    topic: String,
    payload: serde_json::Value,
    #[builder(default = Utc::now())]
    occurred_at: DateTime<Utc>,
}

impl IntegrationMessage {
    pub fn message_id(&self) -> Uuid {
        self.message_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    pub fn occurred_at(&self) -> &DateTime<Utc> {
        &self.occurred_at
    }
}

/// 消息代理客户端
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        message: &IntegrationMessage,
        cancel: &CancellationToken,
    ) -> Result<()>;

    async fn bulk_publish(
        &self,
        topic: &str,
        messages: &[IntegrationMessage],
        cancel: &CancellationToken,
    ) -> Result<()> {
        for message in messages {
            self.publish(topic, message, cancel).await?;
        }
        Ok(())
    }
}

/// 基于 `Publisher` 的集成事件总线：事件名即主题
pub struct PublisherIntegrationEventBus {
    publisher: Arc<dyn Publisher>,
}

impl PublisherIntegrationEventBus {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self { publisher }
    }

    fn to_message(event: &dyn AnyEvent) -> Result<IntegrationMessage> {
        Ok(IntegrationMessage::builder()
            .topic(event.event_descriptor().name().to_string())
            .payload(event.to_payload()?)
            .build())
    }
}

#[async_trait]
impl IntegrationEventBus for PublisherIntegrationEventBus {
    async fn publish(&self, event: &dyn AnyEvent, ctx: &DispatchContext) -> Result<()> {
        let message = Self::to_message(event)?;
        debug!(
            topic = message.topic(),
            message_id = %message.message_id(),
            "publishing integration event"
        );
        self.publisher
            .publish(message.topic(), &message, ctx.cancellation())
            .await
    }
}
