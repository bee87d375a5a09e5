//! 实体（Entity）基础抽象
//!
//! 为仓储提供统一的标识（Id）能力。
//!
use serde::Serialize;
use std::fmt::Display;
use std::hash::Hash;

/// 具备唯一标识的实体抽象
pub trait Entity: Serialize + Clone + Send + Sync + 'static {
    /// 实体标识类型，要求可哈希、可显示与可克隆
    type Id: Clone + Eq + Hash + Display + Send + Sync;

    /// 获取实体标识
    fn id(&self) -> &Self::Id;
}
