//! 仓储（Repository）协议
//!
//! 面向实体存储的增删改查与分页，事务相关操作委托给注入的工作单元。
//!
use super::Pagination;
use crate::entity::Entity;
use crate::error::DomainResult as Result;
use crate::unit_of_work::{TransactionHandle, UnitOfWork};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 实体筛选条件
pub type Predicate<'a, E> = dyn for<'x> Fn(&'x E) -> bool + Send + Sync + 'a;

#[async_trait]
pub trait Repository<E>: Send + Sync
where
    E: Entity,
{
    /// 仓储所属的工作单元
    fn unit_of_work(&self) -> &Arc<dyn UnitOfWork>;

    fn transaction_has_begun(&self) -> bool {
        self.unit_of_work().transaction_has_begun()
    }

    /// 当前事务句柄，若无活动事务则开启
    async fn transaction(&self) -> Result<TransactionHandle> {
        self.unit_of_work().transaction().await
    }

    async fn add(&self, entity: E) -> Result<E>;

    async fn add_range(&self, entities: Vec<E>) -> Result<()>;

    async fn find(&self, id: &E::Id) -> Result<Option<E>>;

    async fn find_by(&self, predicate: &Predicate<'_, E>) -> Result<Option<E>>;

    async fn count(&self) -> Result<u64>;

    async fn count_by(&self, predicate: &Predicate<'_, E>) -> Result<u64>;

    async fn list(&self) -> Result<Vec<E>>;

    async fn list_by(&self, predicate: &Predicate<'_, E>) -> Result<Vec<E>>;

    /// 按配置的主键字段排序后分页
    async fn paginated_list(&self, page: &Pagination) -> Result<Vec<E>>;

    async fn paginated_list_by(
        &self,
        predicate: &Predicate<'_, E>,
        page: &Pagination,
    ) -> Result<Vec<E>>;

    async fn remove(&self, entity: &E) -> Result<E>;

    /// 删除满足条件的实体，返回删除数量
    async fn remove_by(&self, predicate: &Predicate<'_, E>) -> Result<usize>;

    async fn remove_range(&self, entities: &[E]) -> Result<()>;

    async fn update(&self, entity: E) -> Result<E>;

    async fn update_range(&self, entities: Vec<E>) -> Result<()>;

    async fn save_changes(&self, cancel: &CancellationToken) -> Result<()> {
        self.unit_of_work().save_changes(cancel).await
    }

    async fn commit(&self, cancel: &CancellationToken) -> Result<()> {
        self.unit_of_work().commit(cancel).await
    }

    async fn rollback(&self, cancel: &CancellationToken) -> Result<()> {
        self.unit_of_work().rollback(cancel).await
    }
}
