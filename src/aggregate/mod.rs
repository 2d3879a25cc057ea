//! Folding per-sample count results back onto the library.
//!
//! Tables never store their own copy of the library rows; they hold one count
//! per library row, in library order, plus a borrow of the library. Row identity
//! is therefore fixed by construction and zero-filling is the default state.

use crate::counting::CountResult;
use crate::error::{Error, Result};
use crate::library::LibraryTable;
use std::collections::HashMap;

/// Library rows joined with one sample's counts.
#[derive(Debug, Clone)]
pub struct SampleCountTable<'a> {
    library: &'a LibraryTable,
    counts: Vec<u64>,
}

impl<'a> SampleCountTable<'a> {
    pub fn library(&self) -> &'a LibraryTable {
        self.library
    }

    /// One count per library row, aligned with `LibraryTable::entries`.
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }
}

/// Library rows plus one named count column per folded sample, in fold order.
#[derive(Debug, Clone)]
pub struct MergedCountTable<'a> {
    library: &'a LibraryTable,
    columns: Vec<(String, Vec<u64>)>,
}

impl<'a> MergedCountTable<'a> {
    /// The zero-sample table: every library row, no count columns.
    pub fn new(library: &'a LibraryTable) -> Self {
        Self {
            library,
            columns: Vec::new(),
        }
    }

    pub fn library(&self) -> &'a LibraryTable {
        self.library
    }

    pub fn sample_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn columns(&self) -> &[(String, Vec<u64>)] {
        &self.columns
    }

    /// Counts of every sample for library row `row`, in sample order.
    pub fn row_counts(&self, row: usize) -> impl Iterator<Item = u64> + '_ {
        self.columns.iter().map(move |(_, counts)| counts[row])
    }
}

/// Left-join `results` onto every library row by sequence. Rows whose
/// sequence has no result get 0; rows sharing a sequence share its count.
pub fn fold_sample<'a>(
    library: &'a LibraryTable,
    results: impl IntoIterator<Item = CountResult>,
) -> Result<SampleCountTable<'a>> {
    let mut by_sequence: HashMap<&str, Option<u64>> = library
        .entries()
        .iter()
        .map(|e| (e.sequence.as_str(), None))
        .collect();

    for result in results {
        match by_sequence.get_mut(result.sequence.as_str()) {
            None => {
                return Err(Error::Aggregation(format!(
                    "counted sequence {} is not in the library",
                    result.sequence
                )))
            }
            Some(Some(_)) => {
                return Err(Error::Aggregation(format!(
                    "sequence {} was counted more than once",
                    result.sequence
                )))
            }
            Some(slot) => *slot = Some(result.count),
        }
    }

    let counts = library
        .entries()
        .iter()
        .map(|e| by_sequence[e.sequence.as_str()].unwrap_or(0))
        .collect();

    Ok(SampleCountTable { library, counts })
}

/// Append `sample` to `running` as a count column called `name`.
pub fn fold_merged<'a>(
    mut running: MergedCountTable<'a>,
    sample: &SampleCountTable<'a>,
    name: &str,
) -> Result<MergedCountTable<'a>> {
    if !std::ptr::eq(running.library, sample.library) || sample.counts.len() != running.library.len() {
        return Err(Error::Aggregation(format!(
            "sample {} was counted against a different library",
            name
        )));
    }
    if running.columns.iter().any(|(existing, _)| existing == name) {
        return Err(Error::Aggregation(format!(
            "sample {} is already in the merged table",
            name
        )));
    }

    running.columns.push((name.to_string(), sample.counts.clone()));
    Ok(running)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::Path;

    fn library(csv: &str) -> LibraryTable {
        LibraryTable::from_reader(Cursor::new(csv.to_string()), Path::new("lib.csv")).unwrap()
    }

    fn result(sequence: &str, count: u64) -> CountResult {
        CountResult {
            sequence: sequence.to_string(),
            count,
        }
    }

    const LIBRARY: &str = "id,gRNA.sequence,Gene\n\
                           1,ACGT,g1\n\
                           2,TTTT,g2\n\
                           3,ACGT,g3\n\
                           4,GGGG,g4\n";

    #[test]
    fn test_fold_sample_rekeys_by_sequence_and_zero_fills() {
        let lib = library(LIBRARY);
        // arrival order differs from library order, GGGG has no result
        let table = fold_sample(&lib, vec![result("TTTT", 2), result("ACGT", 5)]).unwrap();

        assert_eq!(table.counts(), &[5, 2, 5, 0]);
    }

    #[test]
    fn test_fold_sample_order_independent() {
        let lib = library(LIBRARY);
        let forward = fold_sample(
            &lib,
            vec![result("ACGT", 1), result("TTTT", 0), result("GGGG", 9)],
        )
        .unwrap();
        let reverse = fold_sample(
            &lib,
            vec![result("GGGG", 9), result("TTTT", 0), result("ACGT", 1)],
        )
        .unwrap();

        assert_eq!(forward.counts(), reverse.counts());
    }

    #[test]
    fn test_unknown_sequence_is_aggregation_error() {
        let lib = library(LIBRARY);
        let err = fold_sample(&lib, vec![result("CCCC", 1)]).unwrap_err();
        assert!(matches!(err, Error::Aggregation(_)));
    }

    #[test]
    fn test_duplicate_result_is_aggregation_error() {
        let lib = library(LIBRARY);
        let err = fold_sample(&lib, vec![result("ACGT", 1), result("ACGT", 1)]).unwrap_err();
        assert!(matches!(err, Error::Aggregation(_)));
    }

    #[test]
    fn test_merged_without_samples_has_every_row() {
        let lib = library(LIBRARY);
        let merged = MergedCountTable::new(&lib);

        assert_eq!(merged.library().len(), 4);
        assert_eq!(merged.sample_names().count(), 0);
        assert_eq!(merged.row_counts(0).count(), 0);
    }

    #[test]
    fn test_fold_merged_appends_columns_in_order() {
        let lib = library(LIBRARY);
        let first = fold_sample(&lib, vec![result("ACGT", 1)]).unwrap();
        let second = fold_sample(&lib, vec![result("GGGG", 3), result("TTTT", 4)]).unwrap();

        let merged = MergedCountTable::new(&lib);
        let merged = fold_merged(merged, &first, "day0").unwrap();
        let merged = fold_merged(merged, &second, "day14").unwrap();

        assert_eq!(merged.sample_names().collect::<Vec<_>>(), vec!["day0", "day14"]);
        assert_eq!(merged.row_counts(0).collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(merged.row_counts(1).collect::<Vec<_>>(), vec![0, 4]);
        assert_eq!(merged.row_counts(2).collect::<Vec<_>>(), vec![1, 0]);
        assert_eq!(merged.row_counts(3).collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_fold_merged_rejects_foreign_library() {
        let lib = library(LIBRARY);
        let other = library("id,gRNA.sequence,Gene\n1,ACGT,g1\n");
        let sample = fold_sample(&other, vec![result("ACGT", 1)]).unwrap();

        let err = fold_merged(MergedCountTable::new(&lib), &sample, "s1").unwrap_err();
        assert!(matches!(err, Error::Aggregation(_)));
    }

    #[test]
    fn test_fold_merged_rejects_repeated_name() {
        let lib = library(LIBRARY);
        let sample = fold_sample(&lib, vec![]).unwrap();
        let merged = fold_merged(MergedCountTable::new(&lib), &sample, "s1").unwrap();

        let err = fold_merged(merged, &sample, "s1").unwrap_err();
        assert!(matches!(err, Error::Aggregation(_)));
    }
}
