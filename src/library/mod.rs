//! The guide-RNA library: one row per guide, loaded once and shared read-only.

use crate::error::{Error, Result};
use csv::StringRecord;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

pub const ID_COLUMN: &str = "id";
pub const SEQUENCE_COLUMN: &str = "gRNA.sequence";
pub const GENE_COLUMN: &str = "Gene";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub id: String,
    pub sequence: String,
    pub gene: String,
}

/// Library rows in file order. The raw records are kept so that merged output
/// can reproduce every column of the source file, not just the three required ones.
#[derive(Debug, Clone)]
pub struct LibraryTable {
    headers: StringRecord,
    records: Vec<StringRecord>,
    entries: Vec<LibraryEntry>,
}

impl LibraryTable {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        Self::from_reader(file, path)
    }

    /// Parse a library from any CSV source. `origin` is only used in error messages.
    pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| Error::malformed_library(origin, e.to_string()))?
            .clone();

        let column = |name: &str| {
            headers.iter().position(|h| h == name).ok_or_else(|| {
                Error::malformed_library(origin, format!("missing required column `{}`", name))
            })
        };
        let id_idx = column(ID_COLUMN)?;
        let sequence_idx = column(SEQUENCE_COLUMN)?;
        let gene_idx = column(GENE_COLUMN)?;

        let mut records = Vec::new();
        let mut entries = Vec::new();

        for result in reader.records() {
            let record = result.map_err(|e| Error::malformed_library(origin, e.to_string()))?;
            let line = record.position().map_or(0, |p| p.line());
            let field = |idx: usize| record.get(idx).unwrap_or_default().to_string();

            let sequence = field(sequence_idx);
            if sequence.is_empty() {
                return Err(Error::malformed_library(
                    origin,
                    format!("line {}: empty `{}`", line, SEQUENCE_COLUMN),
                ));
            }
            if !is_nucleotide_sequence(&sequence) {
                warn!(
                    "Library line {} has characters outside ACGTN in {}; matching stays exact",
                    line, sequence
                );
            }

            entries.push(LibraryEntry {
                id: field(id_idx),
                sequence,
                gene: field(gene_idx),
            });
            records.push(record);
        }

        if entries.is_empty() {
            return Err(Error::malformed_library(origin, "library contains no rows"));
        }

        let table = Self {
            headers,
            records,
            entries,
        };
        debug!(
            "Loaded {} library rows ({} distinct sequences) from {}",
            table.len(),
            table.unique_targets().len(),
            origin.display()
        );
        Ok(table)
    }

    pub fn entries(&self) -> &[LibraryEntry] {
        &self.entries
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// Raw source rows, aligned with `entries()`.
    pub fn records(&self) -> &[StringRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct target sequences in first-seen order. Rows sharing a sequence
    /// are counted once and receive the same count on output.
    pub fn unique_targets(&self) -> Vec<&str> {
        let mut seen = HashSet::with_capacity(self.entries.len());
        self.entries
            .iter()
            .map(|e| e.sequence.as_str())
            .filter(|s| seen.insert(*s))
            .collect()
    }
}

fn is_nucleotide_sequence(sequence: &str) -> bool {
    sequence
        .bytes()
        .all(|b| matches!(b, b'A' | b'C' | b'G' | b'T' | b'N'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(csv: &str) -> Result<LibraryTable> {
        LibraryTable::from_reader(Cursor::new(csv.to_string()), Path::new("library.csv"))
    }

    #[test]
    fn test_load_keeps_row_order_and_extra_columns() {
        let table = parse(
            "id,gRNA.sequence,Gene,Notes\n\
             1,ACGT,g1,first\n\
             2,TTGA,g2,second\n",
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(
            table.entries()[0],
            LibraryEntry {
                id: "1".into(),
                sequence: "ACGT".into(),
                gene: "g1".into()
            }
        );
        assert_eq!(table.entries()[1].gene, "g2");
        assert_eq!(table.headers().len(), 4);
        assert_eq!(table.records()[1].get(3), Some("second"));
    }

    #[test]
    fn test_columns_found_by_name_not_position() {
        let table = parse("Gene,id,gRNA.sequence\ng1,7,GGCC\n").unwrap();
        assert_eq!(table.entries()[0].id, "7");
        assert_eq!(table.entries()[0].sequence, "GGCC");
    }

    #[test]
    fn test_unique_targets_collapses_duplicates() {
        let table = parse(
            "id,gRNA.sequence,Gene\n\
             1,ACGT,g1\n\
             2,TTGA,g2\n\
             3,ACGT,g3\n",
        )
        .unwrap();

        assert_eq!(table.unique_targets(), vec!["ACGT", "TTGA"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_missing_column_is_malformed() {
        let err = parse("id,sequence,Gene\n1,ACGT,g1\n").unwrap_err();
        match err {
            Error::MalformedLibrary { reason, .. } => assert!(reason.contains("gRNA.sequence")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_empty_library_is_malformed() {
        let err = parse("id,gRNA.sequence,Gene\n").unwrap_err();
        assert!(matches!(err, Error::MalformedLibrary { .. }));
    }

    #[test]
    fn test_empty_sequence_is_malformed() {
        let err = parse("id,gRNA.sequence,Gene\n1,,g1\n").unwrap_err();
        assert!(matches!(err, Error::MalformedLibrary { .. }));
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let err = parse("id,gRNA.sequence,Gene\n1,ACGT\n").unwrap_err();
        assert!(matches!(err, Error::MalformedLibrary { .. }));
    }
}
