//! 定时任务队列（内部使用）
//!
//! 不依赖真实时钟：调用方传入 `now`，到期任务按截止时间升序取出。
use std::time::Instant;

/// 定时任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerKind {
    /// 清除比对失败闪烁
    ClearFlash,
    /// 宽限期结束后把撤销的条目退回 Skipped
    RevertSkip,
}

/// 单个定时任务；`generation` 用于识别已过期的任务
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Timer {
    pub(crate) deadline: Instant,
    pub(crate) index: usize,
    pub(crate) generation: u64,
    pub(crate) kind: TimerKind,
}

#[derive(Debug, Default)]
pub(crate) struct TimerQueue {
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub(crate) fn schedule(&mut self, timer: Timer) {
        // 保持按截止时间有序；同一时刻按插入顺序
        let pos = self.timers.partition_point(|t| t.deadline <= timer.deadline);
        self.timers.insert(pos, timer);
    }

    /// 取出最早一个已到期的任务
    pub(crate) fn pop_due(&mut self, now: Instant) -> Option<Timer> {
        match self.timers.first() {
            Some(t) if t.deadline <= now => Some(self.timers.remove(0)),
            _ => None,
        }
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.timers.first().map(|t| t.deadline)
    }

    pub(crate) fn len(&self) -> usize {
        self.timers.len()
    }
}
