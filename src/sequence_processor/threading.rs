use super::core::*;
use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Sender};
use std::path::{Path, PathBuf};
use std::thread;
use tracing::debug;

/// Fixed set of worker threads, each owning a clone of the processor and
/// pulling batches of reads from a shared bounded queue.
pub struct ThreadPool<P: SequenceProcessor> {
    handles: Vec<thread::JoinHandle<(P, u64)>>,
    tx: Sender<Vec<Sequence>>,
    source: PathBuf,
}

impl<P: SequenceProcessor> ThreadPool<P> {
    pub fn new(processor: &P, num_threads: usize, source: &Path) -> Self {
        let num_threads = num_threads.max(1);
        let (tx, rx) = bounded::<Vec<Sequence>>(num_threads * 2);
        let mut handles = Vec::with_capacity(num_threads);

        for _ in 0..num_threads {
            let rx = rx.clone();
            let mut worker_processor = processor.clone();
            let handle = thread::spawn(move || {
                let mut processed = 0u64;
                while let Ok(batch) = rx.recv() {
                    for sequence in &batch {
                        worker_processor.process_sequence(sequence);
                    }
                    processed += batch.len() as u64;
                }
                (worker_processor, processed)
            });
            handles.push(handle);
        }

        ThreadPool {
            handles,
            tx,
            source: source.to_path_buf(),
        }
    }

    pub fn send(&self, batch: Vec<Sequence>) -> Result<()> {
        // Every receiver is gone only when all workers have died.
        self.tx.send(batch).map_err(|_| Error::WorkerPanicked {
            path: self.source.clone(),
        })
    }

    /// Close the queue and wait for every worker to drain it.
    pub fn finish(self) -> Result<Vec<P>> {
        drop(self.tx);

        let mut processors = Vec::with_capacity(self.handles.len());
        for (idx, handle) in self.handles.into_iter().enumerate() {
            let (worker_processor, processed) =
                handle.join().map_err(|_| Error::WorkerPanicked {
                    path: self.source.clone(),
                })?;
            debug!("Worker {} processed {} reads", idx, processed);
            processors.push(worker_processor);
        }

        Ok(processors)
    }
}

pub fn merge_processors<P: SequenceProcessor>(processors: Vec<P>, main_processor: &mut P) {
    for worker_processor in &processors {
        main_processor.merge_processor(worker_processor);
    }
}
