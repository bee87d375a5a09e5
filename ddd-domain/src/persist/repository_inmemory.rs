//! 内存版仓储（InMemoryRepository）
//!
//! 以 `DashMap` 保存实体，分页时按 `EntityKeys` 中登记的主键字段排序。
//! 排序键从实体的 JSON 表示中按字段名提取。
//!
use super::{EntityKeys, Pagination, Predicate, Repository, SortDirection};
use crate::entity::Entity;
use crate::error::{DomainError, DomainResult as Result};
use crate::unit_of_work::UnitOfWork;
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;
use std::any::type_name;
use std::cmp::Ordering;
use std::sync::Arc;

pub struct InMemoryRepository<E>
where
    E: Entity,
{
    unit_of_work: Arc<dyn UnitOfWork>,
    keys: Arc<EntityKeys>,
    rows: DashMap<E::Id, E>,
}

impl<E> InMemoryRepository<E>
where
    E: Entity,
{
    pub fn new(unit_of_work: Arc<dyn UnitOfWork>, keys: Arc<EntityKeys>) -> Self {
        Self {
            unit_of_work,
            keys,
            rows: DashMap::new(),
        }
    }

    fn filtered(&self, predicate: &Predicate<'_, E>) -> Vec<E> {
        self.rows
            .iter()
            .filter(|r| predicate(r.value()))
            .map(|r| r.value().clone())
            .collect()
    }

    fn paginate(&self, rows: Vec<E>, page: &Pagination) -> Result<Vec<E>> {
        let keys = self.keys.keys_of::<E>()?;
        let mut keyed = rows
            .into_iter()
            .map(|e| Ok((key_values(&e, keys)?, e)))
            .collect::<Result<Vec<_>>>()?;

        let direction = page.direction();
        keyed.sort_by(|(a, _), (b, _)| {
            let ord = compare_keys(a, b);
            match direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });

        Ok(keyed
            .into_iter()
            .skip(page.skip)
            .take(page.take)
            .map(|(_, e)| e)
            .collect())
    }
}

fn key_values<E: Entity>(entity: &E, keys: &[String]) -> Result<Vec<Value>> {
    let value = serde_json::to_value(entity)?;
    keys.iter()
        .map(|k| {
            value.get(k).cloned().ok_or_else(|| DomainError::InvalidValue {
                reason: format!("key field `{k}` not found on {}", type_name::<E>()),
            })
        })
        .collect()
}

fn compare_keys(a: &[Value], b: &[Value]) -> Ordering {
    a.iter()
        .zip(b)
        .map(|(x, y)| compare_value(x, y))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn compare_value(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = x.as_f64().unwrap_or_default();
                let y = y.as_f64().unwrap_or_default();
                x.total_cmp(&y)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

#[async_trait]
impl<E> Repository<E> for InMemoryRepository<E>
where
    E: Entity,
{
    fn unit_of_work(&self) -> &Arc<dyn UnitOfWork> {
        &self.unit_of_work
    }

    async fn add(&self, entity: E) -> Result<E> {
        match self.rows.entry(entity.id().clone()) {
            Entry::Occupied(occupied) => Err(DomainError::Repository {
                reason: format!("duplicate key {} for {}", occupied.key(), type_name::<E>()),
            }),
            Entry::Vacant(vacant) => {
                vacant.insert(entity.clone());
                Ok(entity)
            }
        }
    }

    async fn add_range(&self, entities: Vec<E>) -> Result<()> {
        for entity in entities {
            self.add(entity).await?;
        }
        Ok(())
    }

    async fn find(&self, id: &E::Id) -> Result<Option<E>> {
        Ok(self.rows.get(id).map(|r| r.value().clone()))
    }

    async fn find_by(&self, predicate: &Predicate<'_, E>) -> Result<Option<E>> {
        Ok(self
            .rows
            .iter()
            .find(|r| predicate(r.value()))
            .map(|r| r.value().clone()))
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.rows.len() as u64)
    }

    async fn count_by(&self, predicate: &Predicate<'_, E>) -> Result<u64> {
        Ok(self.rows.iter().filter(|r| predicate(r.value())).count() as u64)
    }

    async fn list(&self) -> Result<Vec<E>> {
        Ok(self.rows.iter().map(|r| r.value().clone()).collect())
    }

    async fn list_by(&self, predicate: &Predicate<'_, E>) -> Result<Vec<E>> {
        Ok(self.filtered(predicate))
    }

    async fn paginated_list(&self, page: &Pagination) -> Result<Vec<E>> {
        self.paginate(self.filtered(&|_: &E| true), page)
    }

    async fn paginated_list_by(
        &self,
        predicate: &Predicate<'_, E>,
        page: &Pagination,
    ) -> Result<Vec<E>> {
        self.paginate(self.filtered(predicate), page)
    }

    async fn remove(&self, entity: &E) -> Result<E> {
        self.rows
            .remove(entity.id())
            .map(|(_, removed)| removed)
            .ok_or_else(|| DomainError::NotFound {
                reason: format!("{} {}", type_name::<E>(), entity.id()),
            })
    }

    async fn remove_by(&self, predicate: &Predicate<'_, E>) -> Result<usize> {
        let mut removed = 0;
        self.rows.retain(|_, e| {
            let matched = predicate(&*e);
            if matched {
                removed += 1;
            }
            !matched
        });
        Ok(removed)
    }

    async fn remove_range(&self, entities: &[E]) -> Result<()> {
        for entity in entities {
            self.rows.remove(entity.id());
        }
        Ok(())
    }

    async fn update(&self, entity: E) -> Result<E> {
        self.rows.insert(entity.id().clone(), entity.clone());
        Ok(entity)
    }

    async fn update_range(&self, entities: Vec<E>) -> Result<()> {
        for entity in entities {
            self.rows.insert(entity.id().clone(), entity);
        }
        Ok(())
    }
}
