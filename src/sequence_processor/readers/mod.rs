mod fastq;

pub use fastq::FastqReader;
