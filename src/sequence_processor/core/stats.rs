#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    /// Reads handed to the caller.
    pub processed: u64,
    /// Malformed records that were skipped.
    pub skipped: u64,
}

