use ddd_domain::domain_event::Event;
use serde::Serialize;

#[derive(Debug, Serialize, Event)]
#[event(domain, command)]
struct Unknown;

fn main() {
    let _ = Unknown;
}
