//! 状态变更通知
//!
//! 序列器只负责发出事件，渲染层完全由事件推导展示，不反向读取。
use std::time::Duration;

use crate::types::{Cursor, ItemStatus};

/// 序列器发出的通知
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerEvent {
    StatusChanged { index: usize, status: ItemStatus },
    CursorChanged(Cursor),
    /// 比对失败闪烁，持续 `duration` 后会收到对应的 `MismatchCleared`
    MismatchFlash { index: usize, duration: Duration },
    MismatchCleared { index: usize },
    /// 当前被跳过条目的完整有序列表
    SkippedListChanged(Vec<usize>),
}

/// 事件接收端
pub trait EventSink {
    fn emit(&mut self, event: SequencerEvent);
}

/// 记录全部事件（测试与回放）
impl EventSink for Vec<SequencerEvent> {
    fn emit(&mut self, event: SequencerEvent) {
        self.push(event);
    }
}

/// 丢弃全部事件
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: SequencerEvent) {}
}
