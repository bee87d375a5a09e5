//! 工作单元（Unit of Work）
//!
//! 表示一次逻辑事务边界，由外层请求/事务作用域持有；
//! 事件总线只借用其引用，读取“事务是否已开始”并调用提交/回滚。
//!
use crate::error::{DomainError, DomainResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

/// 底层事务句柄
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TransactionHandle {
    id: Uuid,
    began_at: DateTime<Utc>,
}

impl TransactionHandle {
    pub fn begin() -> Self {
        Self {
            id: Uuid::new_v4(),
            began_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn began_at(&self) -> DateTime<Utc> {
        self.began_at
    }
}

/// 工作单元：一次逻辑事务的提交/回滚生命周期
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// 当前是否存在活动事务
    fn transaction_has_begun(&self) -> bool;

    /// 返回当前事务句柄；若尚无活动事务则开启一个
    async fn transaction(&self) -> DomainResult<TransactionHandle>;

    /// 持久化已跟踪的变更（不结束事务）
    async fn save_changes(&self, cancel: &CancellationToken) -> DomainResult<()>;

    async fn commit(&self, cancel: &CancellationToken) -> DomainResult<()>;

    async fn rollback(&self, cancel: &CancellationToken) -> DomainResult<()>;
}

#[derive(Debug, Default)]
struct UnitOfWorkState {
    transaction: Option<TransactionHandle>,
    saves: usize,
    commits: usize,
    rollbacks: usize,
}

/// 内存版工作单元：记录事务与提交/回滚次数，适用于测试与示例
#[derive(Debug, Default)]
pub struct InMemoryUnitOfWork {
    state: Mutex<UnitOfWorkState>,
}

impl InMemoryUnitOfWork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commits(&self) -> usize {
        self.state().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.state().rollbacks
    }

    pub fn saves(&self) -> usize {
        self.state().saves
    }

    fn state(&self) -> MutexGuard<'_, UnitOfWorkState> {
        // 状态只包含计数与句柄，锁中毒时继续使用内部数据
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn ensure_active(cancel: &CancellationToken, operation: &'static str) -> DomainResult<()> {
        if cancel.is_cancelled() {
            return Err(DomainError::cancelled(operation));
        }
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn transaction_has_begun(&self) -> bool {
        self.state().transaction.is_some()
    }

    async fn transaction(&self) -> DomainResult<TransactionHandle> {
        let mut state = self.state();
        let handle = *state.transaction.get_or_insert_with(TransactionHandle::begin);
        Ok(handle)
    }

    async fn save_changes(&self, cancel: &CancellationToken) -> DomainResult<()> {
        Self::ensure_active(cancel, "save_changes")?;
        self.state().saves += 1;
        Ok(())
    }

    async fn commit(&self, cancel: &CancellationToken) -> DomainResult<()> {
        Self::ensure_active(cancel, "commit")?;
        let mut state = self.state();
        let transaction = state.transaction.take();
        state.commits += 1;
        debug!(transaction = ?transaction.map(|t| t.id()), "unit of work committed");
        Ok(())
    }

    async fn rollback(&self, cancel: &CancellationToken) -> DomainResult<()> {
        Self::ensure_active(cancel, "rollback")?;
        let mut state = self.state();
        let transaction = state.transaction.take();
        state.rollbacks += 1;
        debug!(transaction = ?transaction.map(|t| t.id()), "unit of work rolled back");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn transaction_begins_lazily_and_is_reused() {
        let uow = InMemoryUnitOfWork::new();
        assert!(!uow.transaction_has_begun());

        let first = uow.transaction().await.unwrap();
        assert!(uow.transaction_has_begun());
        let second = uow.transaction().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn commit_and_rollback_end_the_transaction() {
        let uow = InMemoryUnitOfWork::new();
        let cancel = CancellationToken::new();

        uow.transaction().await.unwrap();
        uow.commit(&cancel).await.unwrap();
        assert!(!uow.transaction_has_begun());
        assert_eq!(uow.commits(), 1);

        uow.transaction().await.unwrap();
        uow.rollback(&cancel).await.unwrap();
        assert!(!uow.transaction_has_begun());
        assert_eq!(uow.rollbacks(), 1);
    }

    #[tokio::test]
    async fn cancelled_commit_keeps_transaction_open() {
        let uow = InMemoryUnitOfWork::new();
        let cancel = CancellationToken::new();
        uow.transaction().await.unwrap();
        cancel.cancel();

        let err = uow.commit(&cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(uow.transaction_has_begun());
        assert_eq!(uow.commits(), 0);
    }
}
