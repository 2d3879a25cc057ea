use super::processor::SequenceProcessor;
use super::sequence::Sequence;
use super::stats::ProcessingStats;
use crate::error::Result;
use indicatif::ProgressBar;

pub trait SequenceReader {
    /// Re-open the underlying file and hand every well-formed read to `f`, in
    /// file order. Each call is an independent scan from the start.
    fn for_each_read<F: FnMut(&Sequence)>(&self, f: F) -> Result<ProcessingStats>;

    fn read_sequences<P: SequenceProcessor>(&self, processor: &mut P) -> Result<ProcessingStats> {
        self.for_each_read(|sequence| processor.process_sequence(sequence))
    }

    fn read_sequences_with_threads<P: SequenceProcessor>(
        &self,
        processor: &mut P,
        progress: &ProgressBar,
        num_threads: usize,
    ) -> Result<ProcessingStats>;
}
