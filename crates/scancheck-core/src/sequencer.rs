//! 扫描序列器：条目状态、游标与跳过队列
//!
//! 不变式：
//! - 每个下标恰好一个状态；Matched 为终态。
//! - `skipped_order` 恰好包含当前为 Skipped 的下标，各一次，按最近进入 Skipped 的先后排列。
//! - 推进游标永远不会停在 Matched 条目上。
//!
//! 所有操作同步执行；两个定时行为（闪烁清除、宽限期回退）由调用方传入 `now` 驱动，
//! 通过 `poll_timers` 触发。多线程环境下需整体加锁后再调用。
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::SequenceError;
use crate::events::{EventSink, SequencerEvent};
use crate::options::{AdvancePolicy, SequencerPolicy};
use crate::timers::{Timer, TimerKind, TimerQueue};
use crate::types::{Catalog, Cursor, Item, ItemStatus, Progress, ScanOutcome};

#[derive(Debug)]
pub struct Sequencer {
    catalog: Catalog,
    policy: SequencerPolicy,
    statuses: Vec<ItemStatus>,
    cursor: Cursor,
    skipped_order: Vec<usize>,
    /// 每个下标的撤销代数；回退任务只在代数一致时生效
    undo_generations: Vec<u64>,
    /// 每个下标的闪烁代数；新的闪烁使旧的清除任务失效
    flash_generations: Vec<u64>,
    timers: TimerQueue,
}

impl Sequencer {
    /// 初始化：全部 Pending，游标指向首项（空清单则越过末尾）
    pub fn new<S: EventSink + ?Sized>(catalog: Catalog, policy: SequencerPolicy, sink: &mut S) -> Self {
        let len = catalog.len();
        let cursor = if len == 0 { Cursor::PastEnd } else { Cursor::At(0) };
        let seq = Self {
            catalog,
            policy,
            statuses: vec![ItemStatus::Pending; len],
            cursor,
            skipped_order: Vec::new(),
            undo_generations: vec![0; len],
            flash_generations: vec![0; len],
            timers: TimerQueue::default(),
        };
        debug!(items = len, advance = seq.policy.advance.as_str(), "sequencer initialized");
        sink.emit(SequencerEvent::CursorChanged(cursor));
        seq
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn status(&self, index: usize) -> Option<ItemStatus> {
        self.statuses.get(index).copied()
    }

    pub fn statuses(&self) -> &[ItemStatus] {
        &self.statuses
    }

    pub fn skipped_order(&self) -> &[usize] {
        &self.skipped_order
    }

    /// 当前等待扫描的条目
    pub fn current_item(&self) -> Option<(usize, &Item)> {
        let index = self.cursor.index()?;
        self.catalog.get(index).map(|item| (index, item))
    }

    pub fn progress(&self) -> Progress {
        let mut p = Progress { total: self.statuses.len(), ..Progress::default() };
        for s in &self.statuses {
            match s {
                ItemStatus::Pending => p.pending += 1,
                ItemStatus::Matched => p.matched += 1,
                ItemStatus::Skipped => p.skipped += 1,
            }
        }
        p
    }

    /// 全部条目均已匹配
    pub fn is_complete(&self) -> bool {
        self.statuses.iter().all(|s| *s == ItemStatus::Matched)
    }

    /// 最早的待触发定时任务
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// 提交一次扫描/输入，按去空白后的精确相等比对当前条目
    pub fn submit_scan<S: EventSink + ?Sized>(&mut self, raw: &str, now: Instant, sink: &mut S) -> ScanOutcome {
        let Some(index) = self.cursor.index() else {
            debug!("scan submitted with no items left");
            return ScanOutcome::NoMoreItems;
        };
        let input = raw.trim();
        let expected = self.catalog.get(index).map(|item| item.identifier.as_str()).unwrap_or_default();

        if input == expected {
            info!(index, identifier = input, "scan matched");
            self.set_status(index, ItemStatus::Matched, sink);
            self.remove_skipped(index, sink);
            self.advance_from(index, sink);
            return ScanOutcome::Matched(index);
        }

        warn!(index, scanned = input, expected, "scan mismatch");
        let generation = bump(&mut self.flash_generations[index]);
        let duration = self.policy.mismatch_flash;
        // 时长超出时钟范围时不安排清除任务
        if let Some(deadline) = now.checked_add(duration) {
            self.timers.schedule(Timer { deadline, index, generation, kind: TimerKind::ClearFlash });
        }
        sink.emit(SequencerEvent::MismatchFlash { index, duration });
        ScanOutcome::Mismatch { index }
    }

    /// 跳过当前条目并推进游标
    pub fn skip_current<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> Result<(), SequenceError> {
        let index = self.cursor.index().ok_or(SequenceError::NothingToSkip)?;

        // 已匹配的条目只会经由撤销回到游标处；保持 Matched，仅推进
        if self.statuses[index] != ItemStatus::Matched {
            info!(index, identifier = %self.catalog_identifier(index), "item skipped");
            self.set_status(index, ItemStatus::Skipped, sink);
            self.push_skipped(index, sink);
        }
        self.advance_from(index, sink);
        Ok(())
    }

    /// 撤销跳过：条目重新可扫描，游标移回该条目
    pub fn undo_skip<S: EventSink + ?Sized>(&mut self, index: usize, now: Instant, sink: &mut S) -> Result<(), SequenceError> {
        let len = self.statuses.len();
        if index >= len {
            return Err(SequenceError::InvalidIndex { index, len });
        }

        let previous = self.statuses[index];
        if previous != ItemStatus::Matched {
            self.set_status(index, ItemStatus::Pending, sink);
        }
        self.remove_skipped(index, sink);
        self.set_cursor(Cursor::At(index), sink);
        info!(index, identifier = %self.catalog_identifier(index), "skip undone");

        if previous == ItemStatus::Skipped {
            if let Some(grace) = self.policy.undo_grace {
                let generation = bump(&mut self.undo_generations[index]);
                match now.checked_add(grace) {
                    Some(deadline) => {
                        self.timers.schedule(Timer { deadline, index, generation, kind: TimerKind::RevertSkip });
                        debug!(index, ?grace, "undo grace period started");
                    }
                    None => debug!(index, ?grace, "grace period beyond clock range, undo is permanent"),
                }
            }
        }
        Ok(())
    }

    /// 触发所有到期定时任务，返回触发数量（含已失效的任务）
    pub fn poll_timers<S: EventSink + ?Sized>(&mut self, now: Instant, sink: &mut S) -> usize {
        let mut fired = 0;
        while let Some(timer) = self.timers.pop_due(now) {
            fired += 1;
            match timer.kind {
                TimerKind::ClearFlash => {
                    if self.flash_generations[timer.index] == timer.generation {
                        sink.emit(SequencerEvent::MismatchCleared { index: timer.index });
                    }
                }
                TimerKind::RevertSkip => self.revert_if_untouched(timer, sink),
            }
        }
        fired
    }

    /// 宽限期结束：代数一致且仍为 Pending 时退回 Skipped
    fn revert_if_untouched<S: EventSink + ?Sized>(&mut self, timer: Timer, sink: &mut S) {
        let index = timer.index;
        if self.undo_generations[index] != timer.generation {
            debug!(index, "stale grace timer ignored");
            return;
        }
        if self.statuses[index] != ItemStatus::Pending {
            return;
        }
        info!(index, identifier = %self.catalog_identifier(index), "grace period lapsed, item skipped again");
        self.set_status(index, ItemStatus::Skipped, sink);
        self.push_skipped(index, sink);
        if self.policy.advance == AdvancePolicy::PassSkipped && self.cursor == Cursor::At(index) {
            self.advance_from(index, sink);
        }
    }

    /// 从 `from` 之后查找第一个可停留的条目；没有则越过末尾
    fn advance_from<S: EventSink + ?Sized>(&mut self, from: usize, sink: &mut S) {
        let next = (from + 1..self.statuses.len()).find(|&i| self.policy.stops_at(self.statuses[i]));
        self.set_cursor(next.map_or(Cursor::PastEnd, Cursor::At), sink);
    }

    fn set_cursor<S: EventSink + ?Sized>(&mut self, cursor: Cursor, sink: &mut S) {
        if self.cursor != cursor {
            self.cursor = cursor;
            sink.emit(SequencerEvent::CursorChanged(cursor));
        }
    }

    fn set_status<S: EventSink + ?Sized>(&mut self, index: usize, status: ItemStatus, sink: &mut S) {
        if self.statuses[index] != status {
            self.statuses[index] = status;
            sink.emit(SequencerEvent::StatusChanged { index, status });
        }
    }

    fn push_skipped<S: EventSink + ?Sized>(&mut self, index: usize, sink: &mut S) {
        if !self.skipped_order.contains(&index) {
            self.skipped_order.push(index);
            sink.emit(SequencerEvent::SkippedListChanged(self.skipped_order.clone()));
        }
    }

    fn remove_skipped<S: EventSink + ?Sized>(&mut self, index: usize, sink: &mut S) {
        let before = self.skipped_order.len();
        self.skipped_order.retain(|&i| i != index);
        if self.skipped_order.len() != before {
            sink.emit(SequencerEvent::SkippedListChanged(self.skipped_order.clone()));
        }
    }

    fn catalog_identifier(&self, index: usize) -> &str {
        self.catalog.get(index).map(|item| item.identifier.as_str()).unwrap_or_default()
    }
}

fn bump(counter: &mut u64) -> u64 {
    *counter += 1;
    *counter
}
