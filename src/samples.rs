use crate::error::{Error, Result};
use crate::export::MERGED_TABLE_NAME;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Suffixes stripped from a read file's name to derive a sample name, tried in order.
pub const DEFAULT_SAMPLE_SUFFIXES: &[&str] = &["_R1.fq.gz", ".fq.gz", "_R1.fastq.gz", ".fastq.gz"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    pub name: String,
    pub path: PathBuf,
}

/// File base name with the first matching suffix removed. A suffix that
/// would leave nothing behind is not stripped.
pub fn derive_sample_name<S: AsRef<str>>(path: &Path, suffixes: &[S]) -> String {
    let base = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let stem = suffixes
        .iter()
        .find_map(|suffix| {
            base.strip_suffix(suffix.as_ref())
                .filter(|stem| !stem.is_empty())
        })
        .map(str::to_string);
    stem.unwrap_or(base)
}

/// Pair read files with sample names, either the explicit ones (positionally)
/// or names derived from the file names.
pub fn resolve_samples<S: AsRef<str>>(
    files: &[PathBuf],
    names: Option<&[String]>,
    suffixes: &[S],
) -> Result<Vec<Sample>> {
    if files.is_empty() {
        return Err(Error::InvalidInput("no read files given".to_string()));
    }

    let names: Vec<String> = match names {
        Some(names) if names.len() != files.len() => {
            return Err(Error::InvalidInput(format!(
                "{} sample names given for {} read files",
                names.len(),
                files.len()
            )))
        }
        Some(names) => names.iter().map(|n| n.trim().to_string()).collect(),
        None => files
            .iter()
            .map(|f| derive_sample_name(f, suffixes))
            .collect(),
    };

    let mut seen = HashSet::new();
    for name in &names {
        if name.is_empty() {
            return Err(Error::InvalidInput("empty sample name".to_string()));
        }
        if name == MERGED_TABLE_NAME {
            return Err(Error::InvalidInput(format!(
                "sample name {} is reserved for the merged table",
                name
            )));
        }
        if name.contains(['/', '\\']) {
            return Err(Error::InvalidInput(format!(
                "sample name {} contains a path separator",
                name
            )));
        }
        if !seen.insert(name.as_str()) {
            return Err(Error::InvalidInput(format!(
                "sample name {} is used more than once",
                name
            )));
        }
    }

    Ok(names
        .into_iter()
        .zip(files)
        .map(|(name, path)| Sample {
            name,
            path: path.clone(),
        })
        .collect())
}
