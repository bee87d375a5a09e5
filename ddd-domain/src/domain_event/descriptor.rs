use super::capabilities::EventCapabilities;
use super::event_trait::Event;
use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 事件类型的静态描述
///
/// 在编译期（通常由 `#[derive(Event)]` 生成）为每个事件类型声明能力标记，
/// 并通过 `base` 记录其“基类型”，以便分类器沿基类型链向上查找泛型祖先。
#[derive(Clone, Copy)]
pub struct EventDescriptor {
    name: &'static str,
    capabilities: EventCapabilities,
    parameterized: bool,
    base: Option<fn() -> EventDescriptor>,
}

impl EventDescriptor {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            capabilities: EventCapabilities::NONE,
            parameterized: false,
            base: None,
        }
    }

    /// 声明本类型自身携带的能力（与基类型能力合并生效）
    pub const fn with_capabilities(mut self, capabilities: EventCapabilities) -> Self {
        self.capabilities = self.capabilities.union(capabilities);
        self
    }

    /// 标记为泛型实例化类型
    pub const fn parameterized(mut self) -> Self {
        self.parameterized = true;
        self
    }

    /// 声明基类型
    pub const fn extends(mut self, base: fn() -> EventDescriptor) -> Self {
        self.base = Some(base);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 本类型自身声明的能力（不含基类型）
    pub fn declared_capabilities(&self) -> EventCapabilities {
        self.capabilities
    }

    pub fn is_parameterized(&self) -> bool {
        self.parameterized
    }

    pub fn base(&self) -> Option<EventDescriptor> {
        self.base.map(|f| f())
    }

    /// 沿基类型链合并后的全部能力
    pub fn effective_capabilities(&self) -> EventCapabilities {
        let mut caps = self.capabilities;
        let mut next = self.base();
        let mut depth = 0;
        while let Some(desc) = next {
            depth += 1;
            if depth > super::classifier::MAX_BASE_DEPTH {
                break;
            }
            caps |= desc.capabilities;
            next = desc.base();
        }
        caps
    }
}

impl fmt::Debug for EventDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventDescriptor")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities)
            .field("parameterized", &self.parameterized)
            .field("has_base", &self.base.is_some())
            .finish()
    }
}

/// 事件类型标识，按 `TypeId` 判等
#[derive(Clone, Copy, Debug)]
pub struct EventType {
    id: TypeId,
    name: &'static str,
}

impl EventType {
    pub fn of<E: Event>() -> Self {
        Self {
            id: TypeId::of::<E>(),
            name: E::descriptor().name(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for EventType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for EventType {}

impl Hash for EventType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}
