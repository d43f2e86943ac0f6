//! 会话：清单加载与命令分发
//!
//! 加载新清单会整体替换旧的进度；加载失败则保持原状。
use std::time::Instant;
use tracing::{info, warn};

use crate::catalog::{load_catalog_with_summary, LoadSummary};
use crate::errors::SessionError;
use crate::events::EventSink;
use crate::options::SequencerPolicy;
use crate::sequencer::Sequencer;
use crate::types::{Catalog, ScanOutcome};

#[derive(Debug)]
pub struct Session<S: EventSink> {
    policy: SequencerPolicy,
    sink: S,
    sequencer: Option<Sequencer>,
}

impl<S: EventSink> Session<S> {
    pub fn new(policy: SequencerPolicy, sink: S) -> Self {
        Self { policy, sink, sequencer: None }
    }

    pub fn sequencer(&self) -> Option<&Sequencer> {
        self.sequencer.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// 解析清单文本并重新初始化序列器
    pub fn load_catalog(&mut self, raw_text: &str) -> Result<LoadSummary, SessionError> {
        let (catalog, summary) = load_catalog_with_summary(raw_text).map_err(|e| {
            warn!(error = %e, "list rejected, keeping current list");
            e
        })?;
        self.install(catalog);
        Ok(summary)
    }

    /// 安装已解析的清单，丢弃之前的全部进度
    pub fn install(&mut self, catalog: Catalog) {
        if self.sequencer.is_some() {
            info!(items = catalog.len(), "replacing loaded list");
        }
        self.sequencer = Some(Sequencer::new(catalog, self.policy.clone(), &mut self.sink));
    }

    pub fn submit_scan(&mut self, raw: &str, now: Instant) -> Result<ScanOutcome, SessionError> {
        let seq = self.sequencer.as_mut().ok_or(SessionError::NoCatalog)?;
        Ok(seq.submit_scan(raw, now, &mut self.sink))
    }

    pub fn skip_current(&mut self) -> Result<(), SessionError> {
        let seq = self.sequencer.as_mut().ok_or(SessionError::NoCatalog)?;
        seq.skip_current(&mut self.sink)?;
        Ok(())
    }

    pub fn undo_skip(&mut self, index: usize, now: Instant) -> Result<(), SessionError> {
        let seq = self.sequencer.as_mut().ok_or(SessionError::NoCatalog)?;
        seq.undo_skip(index, now, &mut self.sink)?;
        Ok(())
    }

    /// 未加载清单时无任务可触发
    pub fn poll_timers(&mut self, now: Instant) -> usize {
        match self.sequencer.as_mut() {
            Some(seq) => seq.poll_timers(now, &mut self.sink),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{LoadError, SequenceError};
    use crate::events::SequencerEvent;
    use crate::types::{Cursor, ItemStatus};

    fn session() -> Session<Vec<SequencerEvent>> {
        Session::new(SequencerPolicy::default(), Vec::new())
    }

    #[test]
    fn commands_before_load_fail() {
        let mut s = session();
        let t0 = Instant::now();
        assert_eq!(s.submit_scan("A1", t0), Err(SessionError::NoCatalog));
        assert_eq!(s.skip_current(), Err(SessionError::NoCatalog));
        assert_eq!(s.undo_skip(0, t0), Err(SessionError::NoCatalog));
        assert_eq!(s.poll_timers(t0), 0);
    }

    #[test]
    fn failed_reload_keeps_previous_progress() {
        let mut s = session();
        let t0 = Instant::now();
        s.load_catalog("Order,ESN\n1,A1\n2,B2\n").unwrap();
        s.submit_scan("A1", t0).unwrap();

        let err = s.load_catalog("Order,Model\n1,X\n").unwrap_err();
        assert_eq!(err, SessionError::Load(LoadError::MissingRequiredColumns { missing: vec!["esn"] }));

        let seq = s.sequencer().unwrap();
        assert_eq!(seq.catalog().len(), 2);
        assert_eq!(seq.status(0), Some(ItemStatus::Matched));
        assert_eq!(seq.cursor(), Cursor::At(1));
    }

    #[test]
    fn reload_discards_progress() {
        let mut s = session();
        let t0 = Instant::now();
        s.load_catalog("Order,ESN\n1,A1\n2,B2\n").unwrap();
        s.submit_scan("A1", t0).unwrap();
        s.skip_current().unwrap();

        s.sink_mut().clear();
        let summary = s.load_catalog("Order,ESN\n9,Z9\n").unwrap();
        assert_eq!(summary.items, 1);
        let seq = s.sequencer().unwrap();
        assert_eq!(seq.statuses(), &[ItemStatus::Pending]);
        assert!(seq.skipped_order().is_empty());
        assert_eq!(s.sink(), &vec![SequencerEvent::CursorChanged(Cursor::At(0))]);
    }

    #[test]
    fn sequence_errors_are_forwarded() {
        let mut s = session();
        s.load_catalog("Order,ESN\n1,A1\n").unwrap();
        assert_eq!(
            s.undo_skip(5, Instant::now()),
            Err(SessionError::Sequence(SequenceError::InvalidIndex { index: 5, len: 1 }))
        );
    }
}
