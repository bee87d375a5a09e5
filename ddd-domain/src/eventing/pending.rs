//! 待发布事件队列
//!
//! 多生产者无锁入队（无界 MPSC 通道），单一排空者通过异步互斥锁取出。
//! 正在投递的事件停留在队首，确认成功后才移除；投递失败或排空 future 被丢弃时，
//! 下一次排空从同一事件继续，保证 FIFO 且不丢失。
//!
use crate::domain_event::AnyEvent;
use crate::error::{DomainError, DomainResult as Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, MutexGuard, mpsc};

pub(crate) type PendingEvent = Box<dyn AnyEvent>;

pub(crate) struct PendingQueue {
    tx: mpsc::UnboundedSender<PendingEvent>,
    drain: Mutex<DrainState>,
    len: AtomicUsize,
}

pub(crate) struct DrainState {
    rx: mpsc::UnboundedReceiver<PendingEvent>,
    head: Option<PendingEvent>,
}

impl PendingQueue {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            drain: Mutex::new(DrainState { rx, head: None }),
            len: AtomicUsize::new(0),
        }
    }

    pub(crate) fn push(&self, event: PendingEvent) -> Result<()> {
        // 先计数再发送，保证排空者看到事件时计数已包含它
        self.len.fetch_add(1, Ordering::SeqCst);
        if self.tx.send(event).is_err() {
            self.len.fetch_sub(1, Ordering::SeqCst);
            return Err(DomainError::event_bus("pending queue closed"));
        }
        Ok(())
    }

    pub(crate) fn len(&self) -> usize {
        self.len.load(Ordering::SeqCst)
    }

    /// 获取排空权；已有排空者时返回 `None`
    pub(crate) fn try_drain(&self) -> Option<Drain<'_>> {
        self.drain.try_lock().ok().map(|guard| Drain { queue: self, guard })
    }

    /// 等待当前排空者结束后获取排空权
    pub(crate) async fn drain(&self) -> Drain<'_> {
        Drain {
            queue: self,
            guard: self.drain.lock().await,
        }
    }
}

/// 排空会话：持有期间其他排空者无法取出事件
pub(crate) struct Drain<'a> {
    queue: &'a PendingQueue,
    guard: MutexGuard<'a, DrainState>,
}

impl Drain<'_> {
    /// 查看队首事件，必要时从通道补位；事件在 `ack` 之前不会离开队列
    pub(crate) fn peek(&mut self) -> Option<&dyn AnyEvent> {
        let state = &mut *self.guard;
        if state.head.is_none() {
            state.head = state.rx.try_recv().ok();
        }
        state.head.as_deref()
    }

    /// 确认队首事件已投递，将其移出队列
    pub(crate) fn ack(&mut self) {
        if self.guard.head.take().is_some() {
            self.queue.len.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// 丢弃全部待发布事件，返回丢弃数量
    pub(crate) fn clear(&mut self) -> usize {
        let mut dropped = 0;
        while self.peek().is_some() {
            self.ack();
            dropped += 1;
        }
        dropped
    }
}
