pub mod counts;

use std::path::PathBuf;

pub const DEFAULT_OUTPUT_PREFIX: &str = "sgRNA_counts";

/// Suffix of the merged table; no sample may take it as its name.
pub const MERGED_TABLE_NAME: &str = "merged_all_samples";

/// `<prefix>_<sample>.csv`
pub fn sample_output_path(prefix: &str, sample_name: &str) -> PathBuf {
    PathBuf::from(format!("{}_{}.csv", prefix, sample_name))
}

/// `<prefix>_merged_all_samples.csv`
pub fn merged_output_path(prefix: &str) -> PathBuf {
    PathBuf::from(format!("{}_{}.csv", prefix, MERGED_TABLE_NAME))
}
