use ddd_domain::domain_event::Event;
use serde::Serialize;

#[derive(Debug, Serialize, Event)]
#[event(query)]
struct FindAll;

fn main() {
    let _ = FindAll;
}
