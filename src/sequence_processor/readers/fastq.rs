use crate::error::{Error, Result};
use crate::sequence_processor::{core::*, threading::*};
use bio::io::fastq;
use indicatif::ProgressBar;
use niffler::get_reader;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

const BATCH_SIZE: usize = 1000;

/// A FASTQ file, optionally gzip compressed. Holds only the path: every scan
/// opens its own decoder, so concurrent scans never share decode state.
#[derive(Debug, Clone)]
pub struct FastqReader {
    path: PathBuf,
}

impl FastqReader {
    pub fn open(path: &Path) -> Result<Self> {
        File::open(path).map_err(|e| Error::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_stream(&self) -> Result<RecordFrames<BufReader<Box<dyn Read>>>> {
        let file = File::open(&self.path).map_err(|e| Error::io(&self.path, e))?;
        let inner: Box<dyn Read> = match get_reader(Box::new(file)) {
            Ok((reader, _compression)) => reader,
            // Fewer bytes than a compression magic number: nothing to read.
            Err(niffler::Error::FileTooShort) => Box::new(io::empty()),
            Err(e) => {
                return Err(Error::CorruptInput {
                    path: self.path.clone(),
                    source: io::Error::new(io::ErrorKind::InvalidData, e.to_string()),
                })
            }
        };
        Ok(RecordFrames::new(BufReader::new(inner)))
    }

    /// Drive one full pass over the file. Malformed records are skipped;
    /// decoder failures and errors returned by `f` end the pass.
    fn scan<F>(&self, mut f: F) -> Result<ProcessingStats>
    where
        F: FnMut(Sequence) -> Result<()>,
    {
        let mut frames = self.open_stream()?;
        let mut stats = ProcessingStats::default();

        loop {
            let frame = frames.next_frame().map_err(|e| Error::CorruptInput {
                path: self.path.clone(),
                source: e,
            })?;
            match frame {
                None => break,
                Some(Frame::Record { header, seq, qual }) => {
                    if let Err(reason) = validate(&header, &seq, &qual) {
                        debug!(
                            "Skipping record {} in {}: {}",
                            String::from_utf8_lossy(&header),
                            self.path.display(),
                            reason
                        );
                        stats.skipped += 1;
                        continue;
                    }
                    f(Sequence::new(seq))?;
                    stats.processed += 1;
                }
                Some(Frame::Malformed { first_line }) => {
                    debug!(
                        "Skipping malformed record starting {:?} in {}",
                        first_line,
                        self.path.display()
                    );
                    stats.skipped += 1;
                }
            }
        }

        Ok(stats)
    }
}

impl SequenceReader for FastqReader {
    fn for_each_read<F: FnMut(&Sequence)>(&self, mut f: F) -> Result<ProcessingStats> {
        self.scan(|sequence| {
            f(&sequence);
            Ok(())
        })
    }

    /// Decode on the calling thread and fan batches out to `num_threads - 1`
    /// clones of `processor`, so the pass never runs more than `num_threads`
    /// threads. The clones are merged back into `processor` at the end.
    /// `processor` should be freshly constructed: each clone starts from its state.
    fn read_sequences_with_threads<P: SequenceProcessor>(
        &self,
        processor: &mut P,
        progress: &ProgressBar,
        num_threads: usize,
    ) -> Result<ProcessingStats> {
        if num_threads <= 1 {
            let stats = self.read_sequences(processor)?;
            progress.inc(stats.processed);
            return Ok(stats);
        }

        let pool = ThreadPool::new(processor, num_threads - 1, &self.path);
        let mut batch = Vec::with_capacity(BATCH_SIZE);

        let scanned = self.scan(|sequence| {
            batch.push(sequence);
            if batch.len() >= BATCH_SIZE {
                progress.inc(batch.len() as u64);
                pool.send(std::mem::replace(
                    &mut batch,
                    Vec::with_capacity(BATCH_SIZE),
                ))?;
            }
            Ok(())
        });

        let stats = match scanned {
            Ok(stats) => stats,
            Err(e) => {
                // Workers still have to drain before the error goes up.
                let _ = pool.finish();
                return Err(e);
            }
        };

        if !batch.is_empty() {
            progress.inc(batch.len() as u64);
            pool.send(batch)?;
        }

        let processors = pool.finish()?;
        merge_processors(processors, processor);

        Ok(stats)
    }
}

/// Header, sequence and quality of a framed record must still pass bio's
/// record checks (non-empty id, ASCII sequence, matching lengths).
fn validate(header: &[u8], seq: &[u8], qual: &[u8]) -> std::result::Result<(), String> {
    let header = std::str::from_utf8(&header[1..]).map_err(|e| e.to_string())?;
    let mut fields = header.splitn(2, char::is_whitespace);
    let id = fields.next().unwrap_or_default();
    let desc = fields.next();
    fastq::Record::with_attrs(id, desc, seq, qual)
        .check()
        .map_err(str::to_string)
}

enum Frame {
    Record {
        header: Vec<u8>,
        seq: Vec<u8>,
        qual: Vec<u8>,
    },
    /// A stretch of lines that does not start a well-formed record.
    Malformed { first_line: String },
}

/// Splits a line stream into four-line records. A window that is not framed
/// like a record is dropped a line at a time until the next framed record,
/// so damage to one record never spills into the records after it.
struct RecordFrames<R> {
    reader: R,
    lines: VecDeque<Vec<u8>>,
    eof: bool,
}

impl<R: BufRead> RecordFrames<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            lines: VecDeque::with_capacity(4),
            eof: false,
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        while self.lines.len() < 4 && !self.eof {
            let mut line = Vec::new();
            if self.reader.read_until(b'\n', &mut line)? == 0 {
                self.eof = true;
                break;
            }
            while matches!(line.last(), Some(b'\n' | b'\r')) {
                line.pop();
            }
            // Blank lines between records are ignored.
            if line.is_empty() && self.lines.is_empty() {
                continue;
            }
            self.lines.push_back(line);
        }
        Ok(())
    }

    fn is_framed(&self) -> bool {
        self.lines.len() == 4
            && self.lines[0].first() == Some(&b'@')
            && self.lines[2].first() == Some(&b'+')
            && self.lines[1].len() == self.lines[3].len()
    }

    fn take_line(&mut self) -> Vec<u8> {
        self.lines.pop_front().unwrap_or_default()
    }

    fn next_frame(&mut self) -> io::Result<Option<Frame>> {
        self.fill()?;
        if self.lines.is_empty() {
            return Ok(None);
        }

        if self.is_framed() {
            let header = self.take_line();
            let seq = self.take_line();
            self.take_line();
            let qual = self.take_line();
            return Ok(Some(Frame::Record { header, seq, qual }));
        }

        let first_line = String::from_utf8_lossy(&self.take_line()).into_owned();
        loop {
            self.fill()?;
            if self.lines.is_empty() || self.is_framed() {
                break;
            }
            self.lines.pop_front();
        }
        Ok(Some(Frame::Malformed { first_line }))
    }
}
