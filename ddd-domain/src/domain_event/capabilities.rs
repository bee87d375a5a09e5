use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// 事件能力标记集合
///
/// 同一个事件值可以同时具备多种能力，例如既是领域事件又是集成事件。
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EventCapabilities(u8);

impl EventCapabilities {
    /// 无任何能力
    pub const NONE: Self = Self(0);
    /// 领域事件：进程内事实，分发时携带工作单元
    pub const DOMAIN_EVENT: Self = Self(1);
    /// 集成事件：跨服务边界，交由消息代理投递
    pub const INTEGRATION_EVENT: Self = Self(1 << 1);
    /// 领域查询：结构上类似领域事件，但不得关联工作单元
    pub const DOMAIN_QUERY: Self = Self(1 << 2);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for EventCapabilities {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for EventCapabilities {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl fmt::Debug for EventCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        if self.contains(Self::DOMAIN_EVENT) {
            set.entry(&"DomainEvent");
        }
        if self.contains(Self::INTEGRATION_EVENT) {
            set.entry(&"IntegrationEvent");
        }
        if self.contains(Self::DOMAIN_QUERY) {
            set.entry(&"DomainQuery");
        }
        set.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_and_contains() {
        let caps = EventCapabilities::DOMAIN_EVENT | EventCapabilities::INTEGRATION_EVENT;
        assert!(caps.contains(EventCapabilities::DOMAIN_EVENT));
        assert!(caps.contains(EventCapabilities::INTEGRATION_EVENT));
        assert!(!caps.contains(EventCapabilities::DOMAIN_QUERY));
        assert!(EventCapabilities::NONE.is_empty());
        assert!(caps.contains(EventCapabilities::NONE));
    }
}
