//! The counting engine: matching target sequences against reads and
//! spreading that work over a pool of threads.

pub mod counter;
pub mod dispatcher;

use serde::{Deserialize, Serialize};

pub use counter::{SequenceCounter, TargetSetCounter};
pub use dispatcher::{CountDispatcher, DEFAULT_POOL_SIZE};

/// Number of reads in one sample that contain `sequence`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountResult {
    pub sequence: String,
    pub count: u64,
}

/// How a sample's counting work is split across the worker pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// One work item per target, each re-reading the whole file.
    #[default]
    PerTarget,
    /// A single decode pass per file, reads fanned out to the workers.
    SinglePass,
}
