use super::sequence::Sequence;

/// Per-read state machine. Processors are cloned once per worker thread and
/// the clones are folded back together with `merge_processor`.
pub trait SequenceProcessor: Send + Clone + 'static {
    fn process_sequence(&mut self, sequence: &Sequence);

    fn merge_processor(&mut self, other: &Self);
}
