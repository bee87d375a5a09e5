use ddd_domain::domain_event::{DomainQuery, Event, EventCapabilities, is_domain_query};
use serde::Serialize;

#[derive(Debug, Serialize, Event)]
#[event(domain, integration, name = "order.shipped")]
struct OrderShipped {
    order_id: u64,
}

#[derive(Debug, Serialize, Event)]
#[event(domain, query)]
struct Page<T: Serialize + std::fmt::Debug + Send + Sync + 'static> {
    items: Vec<T>,
}

#[derive(Debug, Serialize, Event)]
#[event(extends = DomainQuery<u64>)]
struct CountOrders;

fn main() {
    let shipped = OrderShipped::descriptor();
    assert_eq!(shipped.name(), "order.shipped");
    assert!(shipped.declared_capabilities().contains(EventCapabilities::INTEGRATION_EVENT));

    assert!(is_domain_query(&Page::<u64>::descriptor()));
    assert!(is_domain_query(&CountOrders::descriptor()));

    let _ = (OrderShipped { order_id: 1 }, Page::<u64> { items: vec![] }, CountOrders);
}
