//! 持久化（persist）
//!
//! 定义实体仓储协议、分页参数与按实体类型登记的主键配置，
//! 并提供内存版仓储实现。具体存储后端由上层提供实现并注入。
//!
mod entity_keys;
mod pagination;
mod repository;
mod repository_inmemory;

pub use entity_keys::EntityKeys;
pub use pagination::{Pagination, SortDirection};
pub use repository::{Predicate, Repository};
pub use repository_inmemory::InMemoryRepository;
