use crate::counting::Strategy;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Count sgRNA library sequences in FASTQ files", long_about = None)]
pub struct Args {
    /// Comma-separated list of FASTQ files (gzip or plain)
    #[arg(short = 'f', long = "fastq", value_delimiter = ',', required = true)]
    pub fastq: Vec<PathBuf>,

    /// sgRNA library CSV file with id, gRNA.sequence and Gene columns
    #[arg(short = 'l', long = "library")]
    pub library: PathBuf,

    /// Comma-separated sample names, one per FASTQ file
    #[arg(short = 'n', long = "names", value_delimiter = ',')]
    pub names: Option<Vec<String>>,

    /// Number of worker threads (default: 10)
    #[arg(short = 'c', long = "ncpu")]
    pub ncpu: Option<usize>,

    /// Output prefix (default: sgRNA_counts)
    #[arg(short = 'o', long = "output")]
    pub output: Option<String>,

    /// How counting work is split across workers (default: per-target)
    #[arg(short = 's', long = "strategy", value_enum)]
    pub strategy: Option<Strategy>,

    /// Configuration file to use instead of the default location
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Hide progress bars and informational messages
    #[arg(short = 'q', long = "quiet", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print debug messages
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
