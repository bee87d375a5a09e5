use proc_macro::TokenStream;

mod domain_event;

/// 事件派生宏
///
/// 为结构体/枚举实现 `::ddd_domain::domain_event::Event`，在编译期声明事件能力：
/// - `#[event(domain)]`：领域事件，进程内分发并关联工作单元
/// - `#[event(integration)]`：集成事件，交由集成事件总线投递
/// - `#[event(query)]`：领域查询能力（仅限泛型类型）
/// - `#[event(extends = Type)]`：声明基类型，能力沿基类型链继承
/// - `#[event(name = "...")]`：覆写事件名（默认为类型名）
#[proc_macro_derive(Event, attributes(event))]
pub fn derive_event(input: TokenStream) -> TokenStream {
    domain_event::expand(input)
}
