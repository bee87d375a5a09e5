use ddd_domain::domain_event::Event;
use serde::Serialize;

#[derive(Debug, Serialize, Event)]
#[event(name = "a", name = "b")]
struct Renamed;

fn main() {
    let _ = Renamed;
}
