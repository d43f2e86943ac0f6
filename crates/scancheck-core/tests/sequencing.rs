//! 序列器整体行为：长操作序列下的不变式
use scancheck_core::{
    load_catalog, AdvancePolicy, Cursor, ItemStatus, NullSink, ScanOutcome, SequencerEvent,
    Sequencer, SequencerPolicy,
};
use std::time::{Duration, Instant};

/// 简单的线性同余发生器，保证序列可复现
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }
}

fn catalog_csv(n: usize) -> String {
    let mut csv = String::from("Order,ESN\n");
    for i in 0..n {
        csv.push_str(&format!("{},ID{:03}\n", i, i));
    }
    csv
}

fn check_invariants(seq: &Sequencer, matched_ever: &[bool]) {
    let statuses = seq.statuses();
    let skipped: Vec<usize> = (0..statuses.len()).filter(|&i| statuses[i] == ItemStatus::Skipped).collect();
    let mut order = seq.skipped_order().to_vec();
    order.sort_unstable();
    assert_eq!(order, skipped);
    assert_eq!(order.len(), seq.skipped_order().len());

    for (i, was_matched) in matched_ever.iter().enumerate() {
        if *was_matched {
            assert_eq!(statuses[i], ItemStatus::Matched, "matched item {i} changed status");
        }
    }
    let p = seq.progress();
    assert_eq!(p.matched + p.skipped + p.pending, p.total);
}

fn run_random_walk(policy: SequencerPolicy, seed: u64) {
    let n = 12;
    let csv = catalog_csv(n);
    let mut seq = Sequencer::new(load_catalog(&csv).unwrap(), policy, &mut NullSink);
    let mut rng = Lcg(seed);
    let mut now = Instant::now();
    let mut matched_ever = vec![false; n];

    for _ in 0..2000 {
        now += Duration::from_millis(rng.next(3000) as u64);
        seq.poll_timers(now, &mut NullSink);
        let mut events: Vec<SequencerEvent> = Vec::new();

        match rng.next(4) {
            0 | 1 => {
                let before = seq.cursor();
                let guess = match (rng.next(2), before) {
                    (0, Cursor::At(i)) => format!("ID{:03}", i),
                    _ => format!("ID{:03}", rng.next(n)),
                };
                match seq.submit_scan(&guess, now, &mut events) {
                    ScanOutcome::Matched(i) => {
                        matched_ever[i] = true;
                        if let Cursor::At(c) = seq.cursor() {
                            assert!(c > i);
                            assert_ne!(seq.status(c), Some(ItemStatus::Matched));
                        }
                    }
                    ScanOutcome::Mismatch { index } => {
                        assert_eq!(before, Cursor::At(index));
                        assert_eq!(seq.cursor(), before);
                    }
                    ScanOutcome::NoMoreItems => assert_eq!(before, Cursor::PastEnd),
                }
            }
            2 => {
                let _ = seq.skip_current(&mut events);
                if let Cursor::At(c) = seq.cursor() {
                    assert_ne!(seq.status(c), Some(ItemStatus::Matched));
                }
            }
            _ => {
                let target = rng.next(n + 1);
                let res = seq.undo_skip(target, now, &mut events);
                if target < n {
                    assert!(res.is_ok());
                    assert_eq!(seq.cursor(), Cursor::At(target));
                    assert!(!seq.skipped_order().contains(&target));
                } else {
                    assert!(res.is_err());
                }
            }
        }

        // 最后一次 SkippedListChanged 必须与当前列表一致
        if let Some(list) = events.iter().rev().find_map(|e| match e {
            SequencerEvent::SkippedListChanged(list) => Some(list),
            _ => None,
        }) {
            assert_eq!(list.as_slice(), seq.skipped_order());
        }
        check_invariants(&seq, &matched_ever);
    }
}

#[test]
fn invariants_hold_under_stop_at_skipped() {
    for seed in [1, 7, 42, 1234] {
        run_random_walk(SequencerPolicy::default(), seed);
    }
}

#[test]
fn invariants_hold_under_pass_skipped_without_grace() {
    let policy = SequencerPolicy { advance: AdvancePolicy::PassSkipped, undo_grace: None, ..SequencerPolicy::default() };
    for seed in [3, 99] {
        run_random_walk(policy.clone(), seed);
    }
}

#[test]
fn skip_then_undo_round_trip() {
    let mut seq = Sequencer::new(load_catalog(&catalog_csv(3)).unwrap(), SequencerPolicy::default(), &mut NullSink);
    let t0 = Instant::now();
    seq.skip_current(&mut NullSink).unwrap();
    seq.undo_skip(0, t0, &mut NullSink).unwrap();
    assert_eq!(seq.status(0), Some(ItemStatus::Pending));
    assert!(seq.skipped_order().is_empty());
}
