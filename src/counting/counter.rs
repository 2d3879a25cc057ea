use super::CountResult;
use crate::error::Result;
use crate::sequence_processor::{ProcessingStats, Sequence, SequenceProcessor, SequenceReader};
use memchr::memmem::Finder;
use std::sync::Arc;

/// Counts the reads that contain one target as an exact, case-sensitive
/// substring. A read counts once however many times the target occurs in it.
#[derive(Clone, Debug)]
pub struct SequenceCounter {
    finder: Finder<'static>,
    count: u64,
}

impl SequenceCounter {
    pub fn new(target: &str) -> Self {
        Self {
            finder: Finder::new(target.as_bytes()).into_owned(),
            count: 0,
        }
    }

    pub fn matches(&self, read: &[u8]) -> bool {
        self.finder.find(read).is_some()
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl SequenceProcessor for SequenceCounter {
    fn process_sequence(&mut self, sequence: &Sequence) {
        if self.matches(&sequence.data) {
            self.count += 1;
        }
    }

    fn merge_processor(&mut self, other: &Self) {
        self.count += other.count;
    }
}

/// Scan `source` once and count the reads containing `target`.
pub fn count<R: SequenceReader>(target: &str, source: &R) -> Result<(u64, ProcessingStats)> {
    let mut counter = SequenceCounter::new(target);
    let stats = source.read_sequences(&mut counter)?;
    Ok((counter.count(), stats))
}

/// Counts every target in one pass over the reads. Each worker clone keeps
/// its own counters; the matchers are shared.
#[derive(Clone, Debug)]
pub struct TargetSetCounter {
    finders: Arc<[Finder<'static>]>,
    counts: Vec<u64>,
}

impl TargetSetCounter {
    pub fn new(targets: &[&str]) -> Self {
        let finders: Vec<Finder<'static>> = targets
            .iter()
            .map(|t| Finder::new(t.as_bytes()).into_owned())
            .collect();
        Self {
            counts: vec![0; finders.len()],
            finders: finders.into(),
        }
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Pair the counters back up with the targets they were built from.
    pub fn into_results(self, targets: &[&str]) -> Vec<CountResult> {
        targets
            .iter()
            .zip(self.counts)
            .map(|(target, count)| CountResult {
                sequence: target.to_string(),
                count,
            })
            .collect()
    }
}

impl SequenceProcessor for TargetSetCounter {
    fn process_sequence(&mut self, sequence: &Sequence) {
        for (finder, count) in self.finders.iter().zip(self.counts.iter_mut()) {
            if finder.find(&sequence.data).is_some() {
                *count += 1;
            }
        }
    }

    fn merge_processor(&mut self, other: &Self) {
        for (count, other) in self.counts.iter_mut().zip(&other.counts) {
            *count += other;
        }
    }
}
