use async_trait::async_trait;
use ddd_domain::domain_event::{DomainQuery, Event};
use ddd_domain::entity::Entity;
use ddd_domain::error::DomainResult;
use ddd_domain::eventing::{
    DispatchContext, DomainEventBus, DomainEventBusOptions, EventHandler, InMemoryEventBus,
    IntegrationMessage, Publisher, PublisherIntegrationEventBus,
};
use ddd_domain::persist::{EntityKeys, InMemoryRepository, Pagination, Repository};
use ddd_domain::unit_of_work::{InMemoryUnitOfWork, UnitOfWork};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Serialize)]
struct Order {
    id: u64,
    customer: String,
    shipped: bool,
}

impl Entity for Order {
    type Id = u64;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[derive(Debug, Serialize)]
struct OrderDto {
    id: u64,
    shipped: bool,
}

#[derive(Debug, Serialize, Event)]
#[event(domain, name = "order.placed")]
struct OrderPlaced {
    order_id: u64,
    customer: String,
}

#[derive(Debug, Serialize, Event)]
#[event(domain, integration, name = "order.shipped")]
struct OrderShipped {
    order_id: u64,
}

#[derive(Debug, Serialize, Event)]
#[event(extends = DomainQuery<OrderDto>)]
struct GetOrderById {
    order_id: u64,
}

struct OrderPlacedHandler;

#[async_trait]
impl EventHandler<OrderPlaced> for OrderPlacedHandler {
    fn handler_name(&self) -> &str {
        "order-placed-audit"
    }

    async fn handle(&self, event: &OrderPlaced, ctx: &DispatchContext) -> DomainResult<()> {
        info!(
            order_id = event.order_id,
            customer = %event.customer,
            in_transaction = ctx.unit_of_work().is_some(),
            "order placed"
        );
        Ok(())
    }
}

struct GetOrderByIdHandler {
    orders: Arc<InMemoryRepository<Order>>,
}

#[async_trait]
impl EventHandler<GetOrderById> for GetOrderByIdHandler {
    fn handler_name(&self) -> &str {
        "get-order-by-id"
    }

    async fn handle(&self, query: &GetOrderById, ctx: &DispatchContext) -> DomainResult<()> {
        let dto = self.orders.find(&query.order_id).await?.map(|o| OrderDto {
            id: o.id,
            shipped: o.shipped,
        });
        info!(
            ?dto,
            in_transaction = ctx.unit_of_work().is_some(),
            "order query answered"
        );
        Ok(())
    }
}

/// 以日志代替真实消息代理
struct LoggingPublisher;

#[async_trait]
impl Publisher for LoggingPublisher {
    async fn publish(
        &self,
        topic: &str,
        message: &IntegrationMessage,
        _cancel: &CancellationToken,
    ) -> DomainResult<()> {
        info!(topic, payload = %message.payload(), "integration event handed to broker");
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let uow = Arc::new(InMemoryUnitOfWork::new());
    let keys = Arc::new(EntityKeys::new().register::<Order>(&["id"]));
    let orders = Arc::new(InMemoryRepository::<Order>::new(uow.clone(), keys));

    let event_bus = InMemoryEventBus::new();
    event_bus.register::<OrderPlaced, _>(Arc::new(OrderPlacedHandler));
    event_bus.register::<GetOrderById, _>(Arc::new(GetOrderByIdHandler {
        orders: orders.clone(),
    }));

    let bus = DomainEventBus::new(
        Arc::new(event_bus),
        Arc::new(PublisherIntegrationEventBus::new(Arc::new(LoggingPublisher))),
        uow.clone(),
        DomainEventBusOptions::default().with_event::<OrderShipped>(),
    );

    // 写入订单并在同一事务内登记事件，提交后才投递
    uow.transaction().await?;
    for (id, customer) in [(1, "alice"), (2, "bob")] {
        orders
            .add(Order {
                id,
                customer: customer.to_string(),
                shipped: false,
            })
            .await?;
        bus.enqueue(OrderPlaced {
            order_id: id,
            customer: customer.to_string(),
        })?;
    }
    info!(pending = bus.pending_len(), "orders staged");
    bus.commit().await?;

    uow.transaction().await?;
    orders
        .update(Order {
            id: 1,
            customer: "alice".into(),
            shipped: true,
        })
        .await?;
    bus.enqueue(OrderShipped { order_id: 1 })?;
    bus.commit().await?;

    bus.publish(&GetOrderById { order_id: 1 }).await?;

    let page = orders.paginated_list(&Pagination::new(0, 10).sorted("desc")).await?;
    info!(
        orders = ?page.iter().map(|o| o.id).collect::<Vec<_>>(),
        commits = uow.commits(),
        "done"
    );

    let known: Vec<_> = bus.all_event_types().iter().map(|t| t.name()).collect();
    info!(?known, "known event types");
    Ok(())
}
