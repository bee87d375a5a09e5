use crate::unit_of_work::UnitOfWork;
use std::fmt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// 分发上下文
///
/// 与事件一同显式传递给下游总线与处理器：
/// - `unit_of_work`：仅当事件是真正的领域事件（非领域查询）时存在；
/// - `cancellation`：当前作用域的取消信号。
#[derive(Clone, Default)]
pub struct DispatchContext {
    unit_of_work: Option<Arc<dyn UnitOfWork>>,
    cancellation: CancellationToken,
}

impl DispatchContext {
    pub fn new(unit_of_work: Option<Arc<dyn UnitOfWork>>, cancellation: CancellationToken) -> Self {
        Self {
            unit_of_work,
            cancellation,
        }
    }

    pub fn unit_of_work(&self) -> Option<&Arc<dyn UnitOfWork>> {
        self.unit_of_work.as_ref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }
}

impl fmt::Debug for DispatchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchContext")
            .field("unit_of_work", &self.unit_of_work.is_some())
            .field("cancelled", &self.cancellation.is_cancelled())
            .finish()
    }
}
