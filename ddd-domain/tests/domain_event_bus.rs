use anyhow::Result as AnyResult;
use async_trait::async_trait;
use ddd_domain::domain_event::{AnyEvent, DomainQuery, Event, EventType};
use ddd_domain::error::{DomainError, DomainResult};
use ddd_domain::eventing::{
    DispatchContext, DomainEventBus, DomainEventBusOptions, EventHandler, InMemoryEventBus,
    IntegrationEventBus,
};
use ddd_domain::unit_of_work::{InMemoryUnitOfWork, UnitOfWork};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::task::JoinSet;

#[derive(Debug, Serialize)]
struct OrderDto;

#[derive(Debug, Clone, Serialize, Event)]
#[event(domain)]
struct OrderPlaced {
    order_id: u64,
}

#[derive(Debug, Clone, Serialize, Event)]
#[event(domain, integration, name = "order.shipped")]
struct OrderShipped {
    order_id: u64,
}

#[derive(Debug, Clone, Serialize, Event)]
#[event(extends = DomainQuery<OrderDto>)]
struct GetOrderById {
    order_id: u64,
}

#[derive(Debug, Clone, Serialize, Event)]
#[event(domain)]
struct Numbered {
    producer: usize,
    seq: usize,
}

/// 记录收到的事件以及随事件传入的工作单元
#[derive(Default)]
struct Deliveries {
    entries: Mutex<Vec<(String, Option<Arc<dyn UnitOfWork>>)>>,
}

impl Deliveries {
    fn record(&self, name: &str, ctx: &DispatchContext) {
        self.entries
            .lock()
            .unwrap()
            .push((name.to_string(), ctx.unit_of_work().cloned()));
    }

    fn names(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|(n, _)| n.clone())
            .collect()
    }

    fn unit_of_work_of(&self, name: &str) -> Option<Arc<dyn UnitOfWork>> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, uow)| uow.clone())
    }
}

struct Recorder {
    deliveries: Arc<Deliveries>,
}

#[async_trait]
impl EventHandler<OrderPlaced> for Recorder {
    fn handler_name(&self) -> &str {
        "recorder"
    }

    async fn handle(&self, event: &OrderPlaced, ctx: &DispatchContext) -> DomainResult<()> {
        self.deliveries
            .record(&format!("OrderPlaced#{}", event.order_id), ctx);
        Ok(())
    }
}

#[async_trait]
impl EventHandler<OrderShipped> for Recorder {
    fn handler_name(&self) -> &str {
        "recorder"
    }

    async fn handle(&self, event: &OrderShipped, ctx: &DispatchContext) -> DomainResult<()> {
        self.deliveries
            .record(&format!("OrderShipped#{}", event.order_id), ctx);
        Ok(())
    }
}

#[async_trait]
impl EventHandler<GetOrderById> for Recorder {
    fn handler_name(&self) -> &str {
        "recorder"
    }

    async fn handle(&self, event: &GetOrderById, ctx: &DispatchContext) -> DomainResult<()> {
        self.deliveries
            .record(&format!("GetOrderById#{}", event.order_id), ctx);
        Ok(())
    }
}

#[async_trait]
impl EventHandler<Numbered> for Recorder {
    fn handler_name(&self) -> &str {
        "recorder"
    }

    async fn handle(&self, event: &Numbered, ctx: &DispatchContext) -> DomainResult<()> {
        self.deliveries
            .record(&format!("{}-{}", event.producer, event.seq), ctx);
        Ok(())
    }
}

struct RecordingIntegrationBus {
    deliveries: Arc<Deliveries>,
}

#[async_trait]
impl IntegrationEventBus for RecordingIntegrationBus {
    async fn publish(&self, event: &dyn AnyEvent, ctx: &DispatchContext) -> DomainResult<()> {
        let name = match event.as_any().downcast_ref::<OrderShipped>() {
            Some(shipped) => format!("OrderShipped#{}", shipped.order_id),
            None => event.event_descriptor().name().to_string(),
        };
        self.deliveries.record(&name, ctx);
        Ok(())
    }
}

struct Fixture {
    bus: Arc<DomainEventBus>,
    uow: Arc<dyn UnitOfWork>,
    local: Arc<Deliveries>,
    integration: Arc<Deliveries>,
}

fn fixture(options: DomainEventBusOptions) -> Fixture {
    let local = Arc::new(Deliveries::default());
    let integration = Arc::new(Deliveries::default());

    let event_bus = InMemoryEventBus::new();
    let recorder = Arc::new(Recorder {
        deliveries: local.clone(),
    });
    event_bus.register::<OrderPlaced, _>(recorder.clone());
    event_bus.register::<OrderShipped, _>(recorder.clone());
    event_bus.register::<GetOrderById, _>(recorder.clone());
    event_bus.register::<Numbered, _>(recorder);

    let uow: Arc<dyn UnitOfWork> = Arc::new(InMemoryUnitOfWork::new());
    let bus = DomainEventBus::new(
        Arc::new(event_bus),
        Arc::new(RecordingIntegrationBus {
            deliveries: integration.clone(),
        }),
        uow.clone(),
        options,
    );

    Fixture {
        bus: Arc::new(bus),
        uow,
        local,
        integration,
    }
}

#[tokio::test]
async fn domain_event_goes_in_process_with_unit_of_work() -> AnyResult<()> {
    let f = fixture(DomainEventBusOptions::default());

    f.bus.publish(&OrderPlaced { order_id: 1 }).await?;

    assert_eq!(f.local.names(), vec!["OrderPlaced#1"]);
    assert!(f.integration.names().is_empty());
    let attached = f.local.unit_of_work_of("OrderPlaced#1").expect("unit of work attached");
    assert!(Arc::ptr_eq(&attached, &f.uow));
    Ok(())
}

#[tokio::test]
async fn domain_and_integration_event_goes_only_to_integration_bus() -> AnyResult<()> {
    let f = fixture(DomainEventBusOptions::default());

    f.bus.publish(&OrderShipped { order_id: 2 }).await?;

    assert!(f.local.names().is_empty());
    assert_eq!(f.integration.names(), vec!["OrderShipped#2"]);
    let attached = f
        .integration
        .unit_of_work_of("OrderShipped#2")
        .expect("unit of work attached before routing");
    assert!(Arc::ptr_eq(&attached, &f.uow));
    Ok(())
}

#[tokio::test]
async fn domain_query_never_receives_unit_of_work() -> AnyResult<()> {
    let f = fixture(DomainEventBusOptions::default());

    f.bus.publish(&GetOrderById { order_id: 3 }).await?;

    assert_eq!(f.local.names(), vec!["GetOrderById#3"]);
    assert!(f.local.unit_of_work_of("GetOrderById#3").is_none());
    Ok(())
}

#[tokio::test]
async fn enqueue_defers_until_flush_and_preserves_order() -> AnyResult<()> {
    let f = fixture(DomainEventBusOptions::default());

    f.bus.enqueue(OrderPlaced { order_id: 1 })?;
    f.bus.enqueue(OrderShipped { order_id: 2 })?;
    f.bus.enqueue(OrderPlaced { order_id: 3 })?;
    assert!(f.local.names().is_empty());
    assert_eq!(f.bus.pending_len(), 3);

    assert_eq!(f.bus.publish_queue().await?, 3);

    assert_eq!(f.local.names(), vec!["OrderPlaced#1", "OrderPlaced#3"]);
    assert_eq!(f.integration.names(), vec!["OrderShipped#2"]);

    // 第二次排空不再投递任何事件
    assert_eq!(f.bus.publish_queue().await?, 0);
    assert_eq!(f.local.names().len(), 2);
    Ok(())
}

#[tokio::test]
async fn commit_flushes_after_unit_of_work_commit() -> AnyResult<()> {
    let f = fixture(DomainEventBusOptions::default());
    f.uow.transaction().await?;

    f.bus.enqueue(OrderPlaced { order_id: 9 })?;
    f.bus.commit().await?;

    assert!(!f.uow.transaction_has_begun());
    assert_eq!(f.local.names(), vec!["OrderPlaced#9"]);
    assert_eq!(f.bus.pending_len(), 0);
    Ok(())
}

#[tokio::test]
async fn all_event_types_is_deduplicated_union() -> AnyResult<()> {
    #[derive(Debug, Serialize, Event)]
    #[event(domain)]
    struct ConfiguredOnly;

    let options = DomainEventBusOptions::builder()
        .known_event_types(vec![
            EventType::of::<OrderPlaced>(),
            EventType::of::<ConfiguredOnly>(),
            EventType::of::<OrderPlaced>(),
        ])
        .build();
    let f = fixture(options);

    let types = f.bus.all_event_types();
    let unique: HashSet<_> = types.iter().copied().collect();
    assert_eq!(types.len(), unique.len());
    assert_eq!(types.len(), 5);
    assert!(unique.contains(&EventType::of::<ConfiguredOnly>()));
    assert!(unique.contains(&EventType::of::<GetOrderById>()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_producers_lose_and_duplicate_nothing() -> AnyResult<()> {
    let f = fixture(DomainEventBusOptions::default());

    let mut set = JoinSet::new();
    for producer in 0..10 {
        let bus = f.bus.clone();
        set.spawn(async move {
            for seq in 0..100 {
                bus.enqueue(Numbered { producer, seq })?;
                tokio::task::yield_now().await;
            }
            Ok::<_, DomainError>(())
        });
    }
    while let Some(res) = set.join_next().await {
        res??;
    }

    assert_eq!(f.bus.publish_queue().await?, 1000);

    let names = f.local.names();
    assert_eq!(names.len(), 1000);
    let unique: HashSet<_> = names.iter().collect();
    assert_eq!(unique.len(), 1000);

    // 同一生产者内保持入队顺序
    for producer in 0..10 {
        let seqs: Vec<usize> = names
            .iter()
            .filter_map(|n| n.split_once('-'))
            .filter(|(p, _)| *p == producer.to_string())
            .map(|(_, s)| s.parse().unwrap())
            .collect();
        assert_eq!(seqs, (0..100).collect::<Vec<_>>());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn enqueue_during_flush_is_not_lost() -> AnyResult<()> {
    let f = fixture(DomainEventBusOptions::default());
    for seq in 0..200 {
        f.bus.enqueue(Numbered { producer: 0, seq })?;
    }

    let producer = {
        let bus = f.bus.clone();
        tokio::spawn(async move {
            for seq in 0..200 {
                bus.enqueue(Numbered { producer: 1, seq })?;
                tokio::task::yield_now().await;
            }
            Ok::<_, DomainError>(())
        })
    };

    let mut delivered = f.bus.publish_queue().await?;
    producer.await??;
    delivered += f.bus.publish_queue().await?;

    assert_eq!(delivered, 400);
    assert_eq!(f.local.names().len(), 400);
    assert_eq!(f.bus.pending_len(), 0);
    Ok(())
}
