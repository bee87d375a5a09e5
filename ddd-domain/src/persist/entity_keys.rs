use crate::entity::Entity;
use crate::error::{DomainError, DomainResult as Result};
use std::any::{TypeId, type_name};
use std::collections::HashMap;

/// 实体主键字段配置
///
/// 按实体类型显式登记用于排序分页的主键字段，并在构造仓储时注入，
/// 不依赖进程级全局状态。
#[derive(Clone, Debug, Default)]
pub struct EntityKeys {
    by_type: HashMap<TypeId, Vec<String>>,
}

impl EntityKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记实体类型的主键字段（按顺序参与排序）
    pub fn register<E: Entity>(mut self, keys: &[&str]) -> Self {
        self.by_type.insert(
            TypeId::of::<E>(),
            keys.iter().map(|k| k.to_string()).collect(),
        );
        self
    }

    pub fn keys_of<E: Entity>(&self) -> Result<&[String]> {
        self.by_type
            .get(&TypeId::of::<E>())
            .filter(|keys| !keys.is_empty())
            .map(Vec::as_slice)
            .ok_or(DomainError::KeysNotConfigured {
                entity: type_name::<E>(),
            })
    }
}
