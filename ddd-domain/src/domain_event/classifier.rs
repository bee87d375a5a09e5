//! 事件分类器
//!
//! 对事件的静态描述做纯函数判断：是否为领域事件、集成事件或领域查询。
//!
use super::capabilities::EventCapabilities;
use super::descriptor::EventDescriptor;

/// 基类型链的最大深度，超过即视为畸形描述
pub(crate) const MAX_BASE_DEPTH: usize = 64;

/// 判断事件类型是否为领域查询。
///
/// 从具体类型出发：若自身不是泛型实例化类型，则沿基类型向上查找；
/// 找到第一个泛型祖先后检查其（含继承的）能力是否包含 `DOMAIN_QUERY`。
/// 基类型链终止或过深时返回 `false`。
pub fn is_domain_query(descriptor: &EventDescriptor) -> bool {
    let mut current = *descriptor;
    for _ in 0..=MAX_BASE_DEPTH {
        if current.is_parameterized() {
            return current
                .effective_capabilities()
                .contains(EventCapabilities::DOMAIN_QUERY);
        }
        match current.base() {
            Some(base) => current = base,
            None => return false,
        }
    }
    false
}

/// 分发路由
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// 进程内事件总线
    InProcess,
    /// 集成事件总线（跨服务）
    Integration,
}

/// 事件分类结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventClass {
    pub domain_event: bool,
    pub integration_event: bool,
    pub domain_query: bool,
}

impl EventClass {
    /// 仅真正的领域事件（非领域查询）关联工作单元
    pub fn attaches_unit_of_work(&self) -> bool {
        self.domain_event && !self.domain_query
    }

    /// 集成事件优先；同时具备两种能力的事件只会进入集成事件总线
    pub fn route(&self) -> Route {
        if self.integration_event {
            Route::Integration
        } else {
            Route::InProcess
        }
    }
}

/// 对事件描述进行完整分类
pub fn classify(descriptor: &EventDescriptor) -> EventClass {
    let caps = descriptor.effective_capabilities();
    EventClass {
        domain_event: caps.contains(EventCapabilities::DOMAIN_EVENT),
        integration_event: caps.contains(EventCapabilities::INTEGRATION_EVENT),
        domain_query: is_domain_query(descriptor),
    }
}
