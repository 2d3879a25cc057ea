//! CSV rendering of count tables.

use crate::aggregate::{MergedCountTable, SampleCountTable};
use crate::error::{Error, Result};
use crate::library::{GENE_COLUMN, ID_COLUMN, SEQUENCE_COLUMN};
use std::io::Write;
use std::path::Path;

/// Columns `id`, `gRNA.sequence`, `Gene`, then the count column named after the sample.
pub fn write_sample_table<W: Write>(
    writer: W,
    table: &SampleCountTable<'_>,
    sample_name: &str,
) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record([ID_COLUMN, SEQUENCE_COLUMN, GENE_COLUMN, sample_name])?;

    for (entry, count) in table.library().entries().iter().zip(table.counts()) {
        let count = count.to_string();
        writer.write_record([
            entry.id.as_str(),
            entry.sequence.as_str(),
            entry.gene.as_str(),
            count.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Every library column in its original order, then one count column per sample.
pub fn write_merged_table<W: Write>(writer: W, table: &MergedCountTable<'_>) -> csv::Result<()> {
    let library = table.library();
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = library.headers().clone();
    for name in table.sample_names() {
        header.push_field(name);
    }
    writer.write_record(&header)?;

    for (row, record) in library.records().iter().enumerate() {
        let mut fields = record.clone();
        for count in table.row_counts(row) {
            fields.push_field(&count.to_string());
        }
        writer.write_record(&fields)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn save_sample_table(path: &Path, table: &SampleCountTable<'_>, sample_name: &str) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
    write_sample_table(std::io::BufWriter::new(file), table, sample_name)
        .map_err(|e| Error::csv(path, e))
}

pub fn save_merged_table(path: &Path, table: &MergedCountTable<'_>) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| Error::io(path, e))?;
    write_merged_table(std::io::BufWriter::new(file), table).map_err(|e| Error::csv(path, e))
}
