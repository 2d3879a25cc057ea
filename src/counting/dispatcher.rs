use super::counter::{self, TargetSetCounter};
use super::{CountResult, Strategy};
use crate::error::{Error, Result};
use crate::sequence_processor::{FastqReader, ProcessingStats, SequenceReader};
use crate::utils::progress_bar_builder::ProgressBarBuilder;
use crossbeam_channel::unbounded;
use indicatif::ProgressBar;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_POOL_SIZE: usize = 10;

/// Counts every target of a library against one read file using a bounded
/// pool of worker threads.
#[derive(Debug, Clone)]
pub struct CountDispatcher {
    pool_size: usize,
    strategy: Strategy,
    show_progress: bool,
}

impl Default for CountDispatcher {
    fn default() -> Self {
        Self {
            pool_size: DEFAULT_POOL_SIZE,
            strategy: Strategy::default(),
            show_progress: true,
        }
    }
}

impl CountDispatcher {
    pub fn new(pool_size: usize) -> Result<Self> {
        if pool_size == 0 {
            return Err(Error::InvalidInput(
                "worker pool size must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            pool_size,
            ..Self::default()
        })
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Count `targets` in `file`. Results come back in no particular order.
    /// The first failing work item fails the whole file.
    pub fn run(&self, file: &Path, targets: &[&str]) -> Result<Vec<CountResult>> {
        let source = FastqReader::open(file)?;
        let label = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        let start = Instant::now();

        let (results, stats) = match self.strategy {
            Strategy::PerTarget => {
                let progress = ProgressBarBuilder::new(format!("Processing {}", label))
                    .with_template(
                        "{spinner:.green} [{elapsed_precise}] {msg} [{wide_bar}] {pos}/{len} targets ({per_sec})",
                    )
                    .with_progress_bar(targets.len() as u64)
                    .visible(self.show_progress)
                    .build();
                let outcome = self.run_per_target(&source, targets, &progress);
                progress.finish_and_clear();
                outcome?
            }
            Strategy::SinglePass => {
                let progress = ProgressBarBuilder::new(format!("Processing {}", label))
                    .with_template("{spinner:.green} [{elapsed_precise}] {msg} {pos} reads ({per_sec})")
                    .with_tick()
                    .visible(self.show_progress)
                    .build();
                let outcome = self.run_single_pass(&source, targets, &progress);
                progress.finish_and_clear();
                outcome?
            }
        };

        if stats.skipped > 0 {
            warn!(
                "Skipped {} malformed records in {}",
                stats.skipped,
                file.display()
            );
        }
        info!(
            "Counted {} targets over {} reads of {} in {:.1}s",
            results.len(),
            stats.processed,
            label,
            start.elapsed().as_secs_f64()
        );

        Ok(results)
    }

    /// One work item per target; each item decodes the whole file on its own.
    fn run_per_target(
        &self,
        source: &FastqReader,
        targets: &[&str],
        progress: &ProgressBar,
    ) -> Result<(Vec<CountResult>, ProcessingStats)> {
        let workers = self.pool_size.min(targets.len()).max(1);
        let (job_tx, job_rx) = unbounded::<&str>();
        let (result_tx, result_rx) = unbounded::<Result<(CountResult, ProcessingStats)>>();
        let aborted = AtomicBool::new(false);

        for &target in targets {
            // The receiver is alive in this scope.
            let _ = job_tx.send(target);
        }
        drop(job_tx);

        thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            for worker in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                let aborted = &aborted;
                handles.push(scope.spawn(move || {
                    while let Ok(target) = job_rx.recv() {
                        if aborted.load(Ordering::Relaxed) {
                            break;
                        }
                        let start = Instant::now();
                        let outcome = counter::count(target, source).map(|(count, stats)| {
                            let result = CountResult {
                                sequence: target.to_string(),
                                count,
                            };
                            (result, stats)
                        });
                        debug!(
                            "Worker {} counted {} in {:.2}s",
                            worker,
                            target,
                            start.elapsed().as_secs_f64()
                        );
                        if outcome.is_err() {
                            aborted.store(true, Ordering::Relaxed);
                        }
                        if result_tx.send(outcome).is_err() {
                            break;
                        }
                    }
                }));
            }
            drop(result_tx);

            let mut results = Vec::with_capacity(targets.len());
            let mut stats = ProcessingStats::default();
            let mut failure = None;

            for outcome in result_rx.iter() {
                match outcome {
                    Ok((result, scan_stats)) => {
                        // Every scan reads the same file, so the tallies agree.
                        stats = scan_stats;
                        results.push(result);
                        progress.inc(1);
                    }
                    Err(e) => {
                        failure.get_or_insert(e);
                    }
                }
            }

            for handle in handles {
                if handle.join().is_err() {
                    failure.get_or_insert(Error::WorkerPanicked {
                        path: source.path().to_path_buf(),
                    });
                }
            }

            match failure {
                Some(e) => Err(e),
                None => Ok((results, stats)),
            }
        })
    }

    /// Decode the file once and test every read against all targets. The
    /// decoding thread counts toward `pool_size`.
    fn run_single_pass(
        &self,
        source: &FastqReader,
        targets: &[&str],
        progress: &ProgressBar,
    ) -> Result<(Vec<CountResult>, ProcessingStats)> {
        let mut counter = TargetSetCounter::new(targets);
        let stats = source.read_sequences_with_threads(&mut counter, progress, self.pool_size)?;
        Ok((counter.into_results(targets), stats))
    }
}
